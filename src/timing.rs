//! Timing registry and the measured-call wrapper used by every trial.
//!
//! Durations are single-shot wall-clock measurements keyed by operation
//! identifier. Re-measuring an identifier overwrites the previous duration.

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Kind of timed backend operation, used to build stable identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Index,
    Query,
}

impl OperationKind {
    fn prefix(self) -> &'static str {
        match self {
            OperationKind::Index => "index",
            OperationKind::Query => "query",
        }
    }
}

/// Identifier of a backend operation, e.g. `index_brt` or `query_tantivy`.
pub fn operation_id(kind: OperationKind, backend: &str) -> String {
    format!("{}_{}", kind.prefix(), backend)
}

/// Identifier under which the dataset load is timed.
pub const LOAD_OPERATION: &str = "load_dataset";

#[derive(Debug, Default)]
pub struct TimingRegistry {
    durations: HashMap<String, Duration>,
    /// Successful measurements printed so far, overwritten ones included.
    reported: usize,
}

impl TimingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, id: &str, elapsed: Duration) {
        self.durations.insert(id.to_string(), elapsed);
    }

    pub fn get(&self, id: &str) -> Option<Duration> {
        self.durations.get(id).copied()
    }

    pub fn seconds(&self, id: &str) -> Option<f64> {
        self.get(id).map(|d| d.as_secs_f64())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.durations.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.durations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }

    pub fn reported(&self) -> usize {
        self.reported
    }

    /// All recorded durations in seconds, sorted by identifier.
    pub fn snapshot_secs(&self) -> BTreeMap<String, f64> {
        self.durations
            .iter()
            .map(|(id, d)| (id.clone(), d.as_secs_f64()))
            .collect()
    }

    /// Run `op` exactly once, timing it under `id`.
    ///
    /// The value returned by `op` is passed through untouched. A failed
    /// operation leaves the registry unchanged: its partial duration is only
    /// logged, never recorded, and the error is propagated to the caller.
    pub fn measure<T, E, F>(&mut self, id: &str, op: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let start = Instant::now();
        let result = op();
        let elapsed = start.elapsed();

        match result {
            Ok(value) => {
                println!("{}", measurement_line(id, elapsed));
                self.reported += 1;
                debug!(operation = id, elapsed_s = elapsed.as_secs_f64(), "Recorded timing");
                self.record(id, elapsed);
                Ok(value)
            }
            Err(err) => {
                warn!(
                    operation = id,
                    elapsed_s = elapsed.as_secs_f64(),
                    "Operation failed, no timing recorded"
                );
                Err(err)
            }
        }
    }
}

/// Console line emitted for every successful measurement.
pub fn measurement_line(id: &str, elapsed: Duration) -> String {
    format!("Function '{}' executed in {:.4}s", id, elapsed.as_secs_f64())
}
