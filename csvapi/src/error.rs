use crate::schema::ColumnType;
use std::path::PathBuf;
use thiserror::Error;

/// A schema document that decoded but does not describe a usable column set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Mismatched fields and types lengths: {fields} {types}")]
    LengthMismatch { fields: usize, types: usize },

    #[error("Unrecognized schema type: {value}")]
    UnknownType { value: String },
}

/// A data record that does not fit its schema.
#[derive(Error, Debug)]
pub enum RowError {
    #[error("row {row_index}: bad record length, expected {expected}, got {actual}")]
    LengthMismatch {
        row_index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("row {row_index}, column {column_index}: cannot parse {raw:?} as int")]
    CellType {
        row_index: usize,
        column_index: usize,
        raw: String,
    },

    #[error("row {row_index}, column {column_index}: expected {expected} value")]
    TypeMismatch {
        row_index: usize,
        column_index: usize,
        expected: ColumnType,
    },

    #[error("row {row_index}: {source}")]
    Decode {
        row_index: usize,
        #[source]
        source: csv::Error,
    },
}

/// Load-time failure. Every variant is fatal to startup.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Cannot read directory {}: {source}", path.display())]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV file {file} has no corresponding {schema} schema")]
    SchemaMissing { file: String, schema: String },

    #[error("Cannot read {}: {source}", path.display())]
    FileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot decode schema {}: {source}", path.display())]
    SchemaDecode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Error validating {}: {source}", path.display())]
    InvalidSchema {
        path: PathBuf,
        #[source]
        source: SchemaError,
    },

    #[error("{}: {source}", path.display())]
    InvalidData {
        path: PathBuf,
        #[source]
        source: RowError,
    },
}

/// Request-time failure, answered with a 404.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Unknown route: {route}")]
    UnknownRoute { route: String },

    #[error("index {index} out of bounds")]
    IndexOutOfBounds {
        route: String,
        index: i64,
        count: usize,
    },
}

pub type Result<T> = std::result::Result<T, LoadError>;
