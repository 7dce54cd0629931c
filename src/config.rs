use crate::dataset::default_invalid_columns;
use crate::errors::{BenchError, BenchResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Benchmark settings, loadable from YAML. Every field has a default so an
/// empty file (or no file at all) is a valid configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BenchConfig {
    pub data_path: String,
    pub query: String,
    /// Optional backends to run after the reference backend, in order.
    pub backends: Vec<String>,
    pub invalid_columns: Vec<String>,
    pub tantivy: TantivyConfig,
    pub elastic: ElasticConfig,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            data_path: "data/search_example.csv".to_string(),
            query: "object detection".to_string(),
            backends: Vec::new(),
            invalid_columns: default_invalid_columns(),
            tantivy: TantivyConfig::default(),
            elastic: ElasticConfig::default(),
        }
    }
}

impl BenchConfig {
    pub fn from_path<P: AsRef<Path>>(path: P) -> BenchResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(yaml: &str) -> BenchResult<Self> {
        serde_yaml::from_str(yaml).map_err(BenchError::ConfigError)
    }
}

/// Settings shared by the tantivy-based backends.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TantivyConfig {
    /// Memory budget handed to the index writer.
    pub writer_memory_bytes: usize,
}

impl Default for TantivyConfig {
    fn default() -> Self {
        Self {
            writer_memory_bytes: 50_000_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ElasticConfig {
    pub url: String,
    /// Index name, replaced on every run.
    pub index: String,
    /// Documents per `_bulk` request.
    pub batch_size: usize,
}

impl Default for ElasticConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9200".to_string(),
            index: "benchmark".to_string(),
            batch_size: 1000,
        }
    }
}
