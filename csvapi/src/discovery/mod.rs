use crate::error::{LoadError, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const DATA_EXTENSION: &str = ".csv";
pub const SCHEMA_EXTENSION: &str = ".json";

/// A CSV file and the schema that describes it, keyed by the route
/// they will be served under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePair {
    pub route: String,
    pub csv: PathBuf,
    pub schema: PathBuf,
}

/// List every regular file under `dir`, recursively, as a path relative to
/// `dir` using `/` separators.
pub fn list_entries(dir: &Path) -> Result<Vec<String>> {
    let unreadable = |source: std::io::Error| LoadError::DirectoryUnreadable {
        path: dir.to_path_buf(),
        source,
    };

    let metadata = std::fs::metadata(dir).map_err(unreadable)?;
    if !metadata.is_dir() {
        return Err(unreadable(std::io::Error::new(
            std::io::ErrorKind::Other,
            "not a directory",
        )));
    }

    let pattern = PathBuf::from(glob::Pattern::escape(&dir.to_string_lossy()))
        .join("**")
        .join("*");
    let paths = glob::glob(&pattern.to_string_lossy()).map_err(|e| {
        unreadable(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))
    })?;

    let mut entries = Vec::new();
    for entry in paths {
        let path = entry.map_err(|e| unreadable(std::io::Error::from(e)))?;
        if !path.is_file() {
            continue;
        }
        let rel_path = path
            .strip_prefix(dir)
            .unwrap_or(&path)
            .to_string_lossy()
            .replace('\\', "/");
        entries.push(rel_path);
    }

    Ok(entries)
}

/// Pair each CSV entry with the schema entry of the same base name.
///
/// Pairs come back in the order the CSV entries were listed. Fails on the
/// first CSV entry without a schema.
pub fn match_pairs(root: &Path, entries: &[String]) -> Result<Vec<RoutePair>> {
    let schemas: HashSet<&str> = entries
        .iter()
        .filter_map(|e| e.strip_suffix(SCHEMA_EXTENSION))
        .collect();

    let mut pairs = Vec::new();
    for base in entries.iter().filter_map(|e| e.strip_suffix(DATA_EXTENSION)) {
        if !schemas.contains(base) {
            return Err(LoadError::SchemaMissing {
                file: format!("{base}{DATA_EXTENSION}"),
                schema: format!("{base}{SCHEMA_EXTENSION}"),
            });
        }
        pairs.push(RoutePair {
            route: base.to_string(),
            csv: root.join(format!("{base}{DATA_EXTENSION}")),
            schema: root.join(format!("{base}{SCHEMA_EXTENSION}")),
        });
    }

    Ok(pairs)
}

/// List `dir` and pair up its CSV and schema files
pub fn discover(dir: &Path) -> Result<Vec<RoutePair>> {
    let entries = list_entries(dir)?;
    log::debug!("Found {} files under {}", entries.len(), dir.display());
    match_pairs(dir, &entries)
}
