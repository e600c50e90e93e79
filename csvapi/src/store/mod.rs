use crate::dataset::{self, Dataset, LoadOptions};
use crate::discovery::{self, RoutePair};
use crate::error::{LoadError, QueryError, Result};
use crate::schema::parse_schema;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Every dataset being served, keyed by route.
///
/// Built once by [`DatasetStore::open`] and never written to afterwards,
/// so it can be shared between request handlers without locking.
#[derive(Debug, Default)]
pub struct DatasetStore {
    routes: HashMap<String, Dataset>,
}

impl DatasetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every CSV file under `dir` with default options.
    pub fn open(dir: &Path) -> Result<Self> {
        Self::open_with(dir, &LoadOptions::default())
    }

    /// Discover, validate and parse every dataset under `dir`.
    /// Either all of them load or the first failure is returned.
    pub fn open_with(dir: &Path, options: &LoadOptions) -> Result<Self> {
        let pairs = discovery::discover(dir)?;
        log::debug!("Matched {} CSV files in {}", pairs.len(), dir.display());

        let mut store = DatasetStore::new();
        for pair in &pairs {
            let dataset = load_dataset(pair, options)?;
            log::info!(
                "Loaded /{}: {} rows, {} columns",
                pair.route,
                dataset.len(),
                dataset.schema().len()
            );
            store.insert(pair.route.clone(), dataset);
        }

        Ok(store)
    }

    /// Add or replace the dataset for `route`
    pub fn insert(&mut self, route: impl Into<String>, dataset: Dataset) {
        self.routes.insert(route.into(), dataset);
    }

    pub fn get(&self, route: &str) -> std::result::Result<&Dataset, QueryError> {
        self.routes.get(route).ok_or_else(|| QueryError::UnknownRoute {
            route: route.to_string(),
        })
    }

    pub fn contains(&self, route: &str) -> bool {
        self.routes.contains_key(route)
    }

    /// Route names in sorted order
    pub fn routes(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.routes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Every route with its dataset, in route order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Dataset)> {
        let mut entries: Vec<_> = self
            .routes
            .iter()
            .map(|(route, dataset)| (route.as_str(), dataset))
            .collect();
        entries.sort_unstable_by_key(|&(route, _)| route);
        entries.into_iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Read one schema + CSV pair into a dataset
pub fn load_dataset(pair: &RoutePair, options: &LoadOptions) -> Result<Dataset> {
    let schema = parse_schema(&pair.schema)?;
    if schema.has_duplicate_fields() {
        log::warn!(
            "{} declares a field more than once; the last column wins",
            pair.schema.display()
        );
    }

    let file = File::open(&pair.csv).map_err(|source| LoadError::FileUnreadable {
        path: pair.csv.clone(),
        source,
    })?;
    let rows = dataset::read_rows(BufReader::new(file), &schema, options).map_err(|source| {
        LoadError::InvalidData {
            path: pair.csv.clone(),
            source,
        }
    })?;

    Dataset::new(schema, rows).map_err(|source| LoadError::InvalidData {
        path: pair.csv.clone(),
        source,
    })
}
