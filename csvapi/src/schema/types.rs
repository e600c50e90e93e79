use crate::error::SchemaError;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Schema document as written next to a CSV file, before validation.
/// `fields` and `types` may disagree in length here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RawSchema {
    pub fields: Vec<String>,
    pub types: Vec<String>,
}

impl<'de> Deserialize<'de> for RawSchema {
    /// Keys match case-insensitively, with an exact match taking precedence.
    /// A missing or null list decodes as empty and other keys are ignored.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let document = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
        Ok(RawSchema {
            fields: string_list(&document, "fields").map_err(D::Error::custom)?,
            types: string_list(&document, "types").map_err(D::Error::custom)?,
        })
    }
}

fn string_list(
    document: &serde_json::Map<String, serde_json::Value>,
    key: &str,
) -> Result<Vec<String>, String> {
    let value = document.get(key).or_else(|| {
        document
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    });

    match value {
        None | Some(serde_json::Value::Null) => Ok(Vec::new()),
        Some(value) => Vec::<String>::deserialize(value).map_err(|e| format!("`{key}`: {e}")),
    }
}

/// The value type of a single CSV column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Int,
    String,
}

impl ColumnType {
    /// Resolve a declared type name. Only the exact lowercase names are accepted.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "int" => Some(ColumnType::Int),
            "string" => Some(ColumnType::String),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Int => "int",
            ColumnType::String => "string",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated schema: one resolved type per field, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<String>,
    types: Vec<ColumnType>,
    /// Columns that appear in serialized rows. A field name declared more
    /// than once is only emitted for its last column.
    output_columns: Vec<usize>,
}

impl RawSchema {
    /// Check that the schema itself is well formed. This says nothing about
    /// whether it fits any particular CSV file.
    pub fn validate(self) -> Result<Schema, SchemaError> {
        if self.fields.len() != self.types.len() {
            return Err(SchemaError::LengthMismatch {
                fields: self.fields.len(),
                types: self.types.len(),
            });
        }

        let types = self
            .types
            .iter()
            .map(|name| {
                ColumnType::from_name(name).ok_or_else(|| SchemaError::UnknownType {
                    value: name.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Schema::new(self.fields, types))
    }
}

impl Schema {
    fn new(fields: Vec<String>, types: Vec<ColumnType>) -> Self {
        let mut output_columns: Vec<usize> = {
            let mut seen = HashSet::new();
            (0..fields.len())
                .rev()
                .filter(|&i| seen.insert(fields[i].as_str()))
                .collect()
        };
        output_columns.reverse();

        Schema {
            fields,
            types,
            output_columns,
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn types(&self) -> &[ColumnType] {
        &self.types
    }

    /// Number of columns every record must have
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn has_duplicate_fields(&self) -> bool {
        self.output_columns.len() != self.fields.len()
    }

    pub(crate) fn output_columns(&self) -> &[usize] {
        &self.output_columns
    }
}
