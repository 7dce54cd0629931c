//! Relative indexing comparisons against the reference backend.

use crate::errors::{BenchError, BenchResult};
use crate::timing::{operation_id, OperationKind, TimingRegistry};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub reference: String,
    pub candidate: String,
    /// Reference indexing duration divided by the candidate's.
    pub ratio: f64,
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} is {:.2}x faster than {}",
            self.reference, self.ratio, self.candidate
        )
    }
}

/// Compare every candidate with a recorded indexing time to the reference.
///
/// Candidates that never ran are left out. The reference must have been timed.
pub fn compare(
    timings: &TimingRegistry,
    reference: &str,
    candidates: &[&str],
) -> BenchResult<Vec<Comparison>> {
    let reference_id = operation_id(OperationKind::Index, reference);
    let reference_secs = timings
        .seconds(&reference_id)
        .ok_or(BenchError::MissingReferenceTiming(reference_id))?;

    Ok(candidates
        .iter()
        .filter_map(|candidate| {
            let candidate_secs = timings.seconds(&operation_id(OperationKind::Index, candidate))?;
            Some(Comparison {
                reference: reference.to_string(),
                candidate: candidate.to_string(),
                ratio: reference_secs / candidate_secs,
            })
        })
        .collect())
}

pub fn print_report(comparisons: &[Comparison]) {
    for comparison in comparisons {
        println!("{}", comparison);
    }
}
