use crate::dataset::{AllRows, Dataset};
use crate::error::QueryError;
use crate::store::DatasetStore;
use serde::Serialize;

/// What a request path asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Every row of a dataset
    All { route: String },
    /// One row by zero-based position
    One { route: String, index: i64 },
}

/// Decide whether `path` addresses a whole dataset or a single row.
///
/// A leading `/` is ignored. If the last segment is a base-10 integer the
/// rest of the path is the route and the integer is the index; otherwise
/// the whole path is the route.
pub fn parse_query(path: &str) -> Query {
    let path = path.strip_prefix('/').unwrap_or(path);
    let (route, last) = match path.rsplit_once('/') {
        Some((route, last)) => (route, last),
        None => ("", path),
    };

    match last.parse::<i64>() {
        Ok(index) => Query::One {
            route: route.to_string(),
            index,
        },
        Err(_) => Query::All {
            route: path.to_string(),
        },
    }
}

/// Answer `query` from `store` as JSON bytes
pub fn resolve(store: &DatasetStore, query: &Query) -> Result<Vec<u8>, QueryError> {
    match query {
        Query::All { route } => get_all(store, route),
        Query::One { route, index } => get_nth(store, route, *index),
    }
}

/// Parse and answer a request path.
///
/// This goes one step beyond [`parse_query`]. Taken on its own, `/2024`
/// parses as row 2024 of the root route `""`, which normally has no dataset, so the
/// request would fail with [`QueryError::UnknownRoute`]. Here, when the
/// parent route is missing but the whole path names a dataset, that dataset
/// is answered instead. Paths whose parent route exists are unaffected.
pub fn resolve_path(store: &DatasetStore, path: &str) -> Result<Vec<u8>, QueryError> {
    let query = parse_query(path);
    if let Query::One { route, .. } = &query {
        let whole = path.strip_prefix('/').unwrap_or(path);
        if !store.contains(route) && store.contains(whole) {
            return get_all(store, whole);
        }
    }
    resolve(store, &query)
}

/// All rows of `route` as a JSON array
pub fn get_all(store: &DatasetStore, route: &str) -> Result<Vec<u8>, QueryError> {
    let dataset = store.get(route)?;
    Ok(to_json(&AllRows(dataset)))
}

/// Row `index` of `route` as a JSON object
pub fn get_nth(store: &DatasetStore, route: &str, index: i64) -> Result<Vec<u8>, QueryError> {
    let dataset = store.get(route)?;
    let row = row_index(dataset, index)
        .and_then(|i| dataset.object(i))
        .ok_or_else(|| QueryError::IndexOutOfBounds {
            route: route.to_string(),
            index,
            count: dataset.len(),
        })?;
    Ok(to_json(&row))
}

fn row_index(dataset: &Dataset, index: i64) -> Option<usize> {
    usize::try_from(index).ok().filter(|&i| i < dataset.len())
}

fn to_json<T: Serialize>(value: &T) -> Vec<u8> {
    // Rows only hold strings and i64s under string keys, which always encode.
    // A failure here means the loader let a bad row through.
    serde_json::to_vec(value).expect("validated rows always serialize to JSON")
}
