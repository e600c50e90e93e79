pub mod schema;
pub mod discovery;
pub mod dataset;
pub mod store;
pub mod resolver;
pub mod error;

pub use dataset::{Dataset, LoadOptions, Row, Value};
pub use error::{LoadError, QueryError, Result};
pub use resolver::{parse_query, resolve_path, Query};
pub use schema::Schema;
pub use store::DatasetStore;
