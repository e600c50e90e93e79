use crate::error::{LoadError, Result};
use super::types::{RawSchema, Schema};
use std::path::Path;

/// Read, decode and validate a schema.json file
pub fn parse_schema(path: &Path) -> Result<Schema> {
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::FileUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let raw = parse_schema_str(&content).map_err(|source| LoadError::SchemaDecode {
        path: path.to_path_buf(),
        source,
    })?;
    raw.validate().map_err(|source| LoadError::InvalidSchema {
        path: path.to_path_buf(),
        source,
    })
}

/// Decode a schema JSON string without validating it
pub fn parse_schema_str(content: &str) -> std::result::Result<RawSchema, serde_json::Error> {
    serde_json::from_str(content)
}
