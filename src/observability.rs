use crate::dataset::Dataset;
use crate::errors::{BenchError, BenchResult};
use crate::report::Comparison;
use crate::timing::TimingRegistry;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use uuid::Uuid;

/// Everything one run measured, printable as JSON. Never written to disk.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub timestamp: DateTime<Utc>,
    pub query: String,
    pub dataset: DatasetStats,
    pub timings_s: BTreeMap<String, f64>,
    pub result_counts: BTreeMap<String, usize>,
    pub comparisons: Vec<Comparison>,
}

impl RunSummary {
    pub fn new(
        run_id: Uuid,
        query: &str,
        dataset: DatasetStats,
        timings: &TimingRegistry,
        result_counts: BTreeMap<String, usize>,
        comparisons: Vec<Comparison>,
    ) -> Self {
        Self {
            run_id: run_id.to_string(),
            timestamp: Utc::now(),
            query: query.to_string(),
            dataset,
            timings_s: timings.snapshot_secs(),
            result_counts,
            comparisons,
        }
    }

    pub fn to_json(&self) -> BenchResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| BenchError::Unknown(e.into()))
    }
}

#[derive(Debug, Serialize)]
pub struct DatasetStats {
    pub path: String,
    pub hash: String, // SHA256 hex
    pub rows: usize,
    pub columns: Vec<String>,
}

impl DatasetStats {
    pub fn collect<P: AsRef<Path>>(path: P, dataset: &Dataset) -> io::Result<Self> {
        Ok(Self {
            path: path.as_ref().display().to_string(),
            hash: compute_file_hash(&path)?,
            rows: dataset.height(),
            columns: dataset.column_names(),
        })
    }
}

pub fn compute_file_hash<P: AsRef<Path>>(path: P) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0; 8192]; // 8KB buffer

    loop {
        let count = file.read(&mut buffer)?;
        if count == 0 {
            break;
        }
        hasher.update(&buffer[..count]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
