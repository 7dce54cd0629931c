//! Search backends under test.
//!
//! Each backend turns a [`Dataset`] into an opaque [`SearchHandle`]; the
//! harness only ever asks a handle how many documents match a query.

pub mod columnar;
pub mod elastic;
pub mod row_tantivy;
mod text_index;

use crate::config::BenchConfig;
use crate::dataset::Dataset;
use crate::errors::{BenchError, BenchResult};

pub use columnar::ColumnarBackend;
pub use elastic::ElasticBackend;
pub use row_tantivy::RowTantivyBackend;

/// Name of the reference backend every run is compared against.
pub const REFERENCE_BACKEND: &str = "brt";

/// A search engine that can be benchmarked.
pub trait Backend {
    /// Name used on the command line and in operation identifiers.
    fn name(&self) -> &str;

    /// Build this backend's index from the dataset.
    ///
    /// Called at most once per run; must not depend on state left by earlier runs.
    fn prepare_index(&self, dataset: &Dataset) -> BenchResult<Box<dyn SearchHandle>>;
}

/// Index built by a [`Backend`], owned by the query step.
pub trait SearchHandle {
    /// Run one free-text query and return the number of matching documents.
    fn run_query(&mut self, query: &str) -> BenchResult<usize>;
}

/// The reference backend plus the optional backends, looked up by name.
pub struct BackendRegistry {
    reference: Box<dyn Backend>,
    optional: Vec<Box<dyn Backend>>,
}

impl BackendRegistry {
    pub fn new(reference: Box<dyn Backend>) -> Self {
        Self {
            reference,
            optional: Vec::new(),
        }
    }

    /// The built-in backends: `brt` as reference, then `tantivy` and `elastic`.
    pub fn from_config(config: &BenchConfig) -> Self {
        let mut registry = Self::new(Box::new(ColumnarBackend::new(
            config.tantivy.writer_memory_bytes,
        )));
        registry.register(Box::new(RowTantivyBackend::new(
            config.tantivy.writer_memory_bytes,
        )));
        registry.register(Box::new(ElasticBackend::new(config.elastic.clone())));
        registry
    }

    /// Add an optional backend. A backend with the same name is replaced in place.
    pub fn register(&mut self, backend: Box<dyn Backend>) {
        match self.optional.iter().position(|b| b.name() == backend.name()) {
            Some(idx) => self.optional[idx] = backend,
            None => self.optional.push(backend),
        }
    }

    pub fn reference(&self) -> &dyn Backend {
        self.reference.as_ref()
    }

    /// Look up an optional backend by name.
    pub fn optional(&self, name: &str) -> BenchResult<&dyn Backend> {
        self.optional
            .iter()
            .find(|b| b.name() == name)
            .map(|b| b.as_ref())
            .ok_or_else(|| BenchError::UnknownBackend {
                name: name.to_string(),
                known: self.optional_names().join(", "),
            })
    }

    /// Optional backend names in registration order.
    pub fn optional_names(&self) -> Vec<&str> {
        self.optional.iter().map(|b| b.name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    impl Backend for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn prepare_index(&self, _dataset: &Dataset) -> BenchResult<Box<dyn SearchHandle>> {
            Err(BenchError::backend(self.0, "not buildable"))
        }
    }

    #[test]
    fn test_default_registry() {
        let registry = BackendRegistry::from_config(&BenchConfig::default());
        assert_eq!(registry.reference().name(), REFERENCE_BACKEND);
        assert_eq!(registry.optional_names(), vec!["tantivy", "elastic"]);
        assert!(registry.optional("tantivy").is_ok());
    }

    #[test]
    fn test_unknown_backend_names_known_ones() {
        let registry = BackendRegistry::from_config(&BenchConfig::default());
        match registry.optional("nonexistent-backend") {
            Err(BenchError::UnknownBackend { name, known }) => {
                assert_eq!(name, "nonexistent-backend");
                assert_eq!(known, "tantivy, elastic");
            }
            _ => panic!("Expected UnknownBackend error"),
        }
    }

    #[test]
    fn test_reference_is_not_an_optional_backend() {
        let registry = BackendRegistry::from_config(&BenchConfig::default());
        assert!(registry.optional(REFERENCE_BACKEND).is_err());
    }

    #[test]
    fn test_register_replaces_same_name() {
        let mut registry = BackendRegistry::new(Box::new(Named("ref")));
        registry.register(Box::new(Named("a")));
        registry.register(Box::new(Named("b")));
        registry.register(Box::new(Named("a")));
        assert_eq!(registry.optional_names(), vec!["a", "b"]);
    }
}
