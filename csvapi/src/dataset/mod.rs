// Dataset I/O - typed rows parsed from CSV under a validated schema

use crate::error::RowError;
use crate::schema::{ColumnType, Schema};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::io::Read;

/// A single typed cell
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Str(String),
}

impl Value {
    pub fn column_type(&self) -> ColumnType {
        match self {
            Value::Int(_) => ColumnType::Int,
            Value::Str(_) => ColumnType::String,
        }
    }
}

/// One parsed record. Its length and cell types always match the schema
/// of the dataset that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row(Vec<Value>);

impl Row {
    pub fn values(&self) -> &[Value] {
        &self.0
    }
}

/// A schema together with every row of its CSV file
#[derive(Debug, Clone)]
pub struct Dataset {
    schema: Schema,
    rows: Vec<Row>,
}

/// CSV reading options
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Field delimiter (default: b',')
    pub delimiter: u8,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions { delimiter: b',' }
    }
}

/// Convert one record's raw cells into a typed row
pub fn parse_row<S: AsRef<str>>(
    row_index: usize,
    cells: &[S],
    schema: &Schema,
) -> Result<Row, RowError> {
    if cells.len() != schema.len() {
        return Err(RowError::LengthMismatch {
            row_index,
            expected: schema.len(),
            actual: cells.len(),
        });
    }

    let values = cells
        .iter()
        .zip(schema.types())
        .enumerate()
        .map(|(column_index, (cell, column_type))| {
            let raw = cell.as_ref();
            match column_type {
                ColumnType::Int => raw.parse::<i64>().map(Value::Int).map_err(|_| {
                    RowError::CellType {
                        row_index,
                        column_index,
                        raw: raw.to_string(),
                    }
                }),
                ColumnType::String => Ok(Value::Str(raw.to_string())),
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Row(values))
}

/// Convert a sequence of records into rows, stopping at the first bad one
pub fn parse_rows<S: AsRef<str>>(
    records: &[Vec<S>],
    schema: &Schema,
) -> Result<Vec<Row>, RowError> {
    records
        .iter()
        .enumerate()
        .map(|(row_index, record)| parse_row(row_index, record, schema))
        .collect()
}

/// Read headerless CSV from `reader` and parse every record under `schema`
pub fn read_rows<R: Read>(
    reader: R,
    schema: &Schema,
    options: &LoadOptions,
) -> Result<Vec<Row>, RowError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(options.delimiter)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (row_index, record) in rdr.records().enumerate() {
        let record = record.map_err(|source| RowError::Decode { row_index, source })?;
        let cells: Vec<&str> = record.iter().collect();
        rows.push(parse_row(row_index, &cells, schema)?);
    }
    Ok(rows)
}

impl Dataset {
    /// Pair already-parsed rows with their schema. Every row must have one
    /// cell per column, each holding a value of the column's type.
    pub fn new(schema: Schema, rows: Vec<Row>) -> Result<Self, RowError> {
        for (row_index, row) in rows.iter().enumerate() {
            if row.0.len() != schema.len() {
                return Err(RowError::LengthMismatch {
                    row_index,
                    expected: schema.len(),
                    actual: row.0.len(),
                });
            }
            let mismatch = row
                .0
                .iter()
                .zip(schema.types())
                .position(|(value, column_type)| value.column_type() != *column_type);
            if let Some(column_index) = mismatch {
                return Err(RowError::TypeMismatch {
                    row_index,
                    column_index,
                    expected: schema.types()[column_index],
                });
            }
        }
        Ok(Dataset { schema, rows })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The row at `index` as a serializable JSON object
    pub fn object(&self, index: usize) -> Option<RowObject<'_>> {
        self.rows.get(index).map(|row| RowObject {
            schema: &self.schema,
            row,
        })
    }

    pub fn objects(&self) -> impl ExactSizeIterator<Item = RowObject<'_>> + '_ {
        self.rows.iter().map(|row| RowObject {
            schema: &self.schema,
            row,
        })
    }
}

/// A row viewed as a JSON object keyed by field name, in schema order
#[derive(Debug, Clone, Copy)]
pub struct RowObject<'a> {
    schema: &'a Schema,
    row: &'a Row,
}

impl Serialize for RowObject<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let columns = self.schema.output_columns();
        let mut map = serializer.serialize_map(Some(columns.len()))?;
        for &i in columns {
            map.serialize_entry(&self.schema.fields()[i], &self.row.0[i])?;
        }
        map.end()
    }
}

/// Serializes as a JSON array of row objects
pub struct AllRows<'a>(pub &'a Dataset);

impl Serialize for AllRows<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.objects())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::RawSchema;
    use pretty_assertions::assert_eq;

    fn schema(fields: &[&str], types: &[&str]) -> Schema {
        RawSchema {
            fields: fields.iter().map(|s| s.to_string()).collect(),
            types: types.iter().map(|s| s.to_string()).collect(),
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn test_parse_typed_row() {
        let schema = schema(&["name", "age"], &["string", "int"]);
        let row = parse_row(0, &["Ada", "-36"], &schema).unwrap();
        assert_eq!(
            row.values(),
            &[Value::Str("Ada".into()), Value::Int(-36)]
        );
    }

    #[test]
    fn test_strings_are_not_trimmed() {
        let schema = schema(&["s"], &["string"]);
        let row = parse_row(0, &["  padded "], &schema).unwrap();
        assert_eq!(row.values(), &[Value::Str("  padded ".into())]);
    }

    #[test]
    fn test_int_range_and_sign() {
        let schema = schema(&["n"], &["int"]);
        let max = i64::MAX.to_string();
        assert_eq!(
            parse_row(0, &[max.as_str()], &schema).unwrap().values(),
            &[Value::Int(i64::MAX)]
        );
        assert_eq!(
            parse_row(0, &["+7"], &schema).unwrap().values(),
            &[Value::Int(7)]
        );
        for bad in ["abc", "", " 1", "1.5", "9223372036854775808"] {
            let err = parse_row(4, &[bad], &schema).unwrap_err();
            assert!(
                matches!(&err, RowError::CellType { row_index: 4, column_index: 0, raw } if raw == bad),
                "{bad:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_row_length_mismatch() {
        let schema = schema(&["a", "b"], &["string", "string"]);
        let err = parse_rows(&[vec!["x", "y"], vec!["z"]], &schema).unwrap_err();
        assert!(matches!(
            err,
            RowError::LengthMismatch {
                row_index: 1,
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_first_error_wins() {
        let schema = schema(&["n"], &["int"]);
        let err = parse_rows(&[vec!["1"], vec!["x"], vec!["1", "2"]], &schema).unwrap_err();
        assert!(matches!(err, RowError::CellType { row_index: 1, .. }));
    }

    #[test]
    fn test_read_rows_unescapes_quotes() {
        let schema = schema(&["quote", "n"], &["string", "int"]);
        let csv = "\"Hello, \"\"world\"\"\",1\nplain,2\n";
        let rows = read_rows(csv.as_bytes(), &schema, &LoadOptions::default()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].values(),
            &[Value::Str("Hello, \"world\"".into()), Value::Int(1)]
        );
    }

    #[test]
    fn test_read_rows_custom_delimiter() {
        let schema = schema(&["a", "b"], &["string", "int"]);
        let options = LoadOptions { delimiter: b';' };
        let rows = read_rows("x;1\ny;2\n".as_bytes(), &schema, &options).unwrap();
        assert_eq!(rows[1].values(), &[Value::Str("y".into()), Value::Int(2)]);
    }

    #[test]
    fn test_read_rows_rejects_invalid_utf8() {
        let schema = schema(&["a"], &["string"]);
        let err = read_rows(&b"ok\n\xff\xfe\n"[..], &schema, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, RowError::Decode { row_index: 1, .. }));
    }

    #[test]
    fn test_serialize_in_schema_order() {
        let schema = schema(&["zeta", "alpha"], &["string", "int"]);
        let rows = parse_rows(&[vec!["z", "1"], vec!["y", "2"]], &schema).unwrap();
        let dataset = Dataset::new(schema, rows).unwrap();

        let one = serde_json::to_string(&dataset.object(0).unwrap()).unwrap();
        assert_eq!(one, r#"{"zeta":"z","alpha":1}"#);

        let all = serde_json::to_string(&AllRows(&dataset)).unwrap();
        assert_eq!(all, r#"[{"zeta":"z","alpha":1},{"zeta":"y","alpha":2}]"#);
        assert!(dataset.object(2).is_none());
    }

    #[test]
    fn test_duplicate_field_last_column_wins() {
        let schema = schema(&["v", "w", "v"], &["int", "string", "string"]);
        let rows = parse_rows(&[vec!["1", "a", "b"]], &schema).unwrap();
        let dataset = Dataset::new(schema, rows).unwrap();
        let json = serde_json::to_string(&dataset.object(0).unwrap()).unwrap();
        assert_eq!(json, r#"{"w":"a","v":"b"}"#);
    }

    #[test]
    fn test_dataset_rejects_rows_from_another_schema() {
        let narrow = schema(&["a"], &["string"]);
        let wide = schema(&["a", "b"], &["string", "string"]);
        let rows = parse_rows(&[vec!["x"]], &narrow).unwrap();

        let err = Dataset::new(wide, rows).unwrap_err();
        assert!(matches!(
            err,
            RowError::LengthMismatch {
                row_index: 0,
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_dataset_rejects_mistyped_cells() {
        let strings = schema(&["a", "b"], &["string", "string"]);
        let ints = schema(&["a", "b"], &["string", "int"]);
        let rows = parse_rows(&[vec!["x", "1"], vec!["y", "2"]], &strings).unwrap();

        let err = Dataset::new(ints, rows).unwrap_err();
        assert!(matches!(
            err,
            RowError::TypeMismatch {
                row_index: 0,
                column_index: 1,
                expected: ColumnType::Int
            }
        ));
        assert_eq!(err.to_string(), "row 0, column 1: expected int value");
    }

    #[test]
    fn test_empty_dataset_serializes_as_empty_array() {
        let dataset = Dataset::new(schema(&["a"], &["int"]), Vec::new()).unwrap();
        assert!(dataset.is_empty());
        assert_eq!(serde_json::to_string(&AllRows(&dataset)).unwrap(), "[]");
    }
}
