use crate::backends::{Backend, BackendRegistry};
use crate::config::BenchConfig;
use crate::dataset::{self, Dataset};
use crate::errors::{BenchError, BenchResult};
use crate::observability::{DatasetStats, RunSummary};
use crate::report::{self, Comparison};
use crate::timing::{operation_id, OperationKind, TimingRegistry, LOAD_OPERATION};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, info_span};
use uuid::Uuid;

/// Result of one index + query cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialOutcome {
    pub backend: String,
    pub result_count: usize,
}

/// Trials and comparisons produced by [`Harness::run`].
#[derive(Debug, Clone)]
pub struct BenchmarkOutcome {
    pub trials: Vec<TrialOutcome>,
    pub comparisons: Vec<Comparison>,
}

/// Runs trials strictly one after another, recording every timing.
pub struct Harness {
    backends: BackendRegistry,
    timings: TimingRegistry,
}

impl Harness {
    pub fn new(backends: BackendRegistry) -> Self {
        Self {
            backends,
            timings: TimingRegistry::new(),
        }
    }

    pub fn timings(&self) -> &TimingRegistry {
        &self.timings
    }

    /// Load the dataset, timed under [`LOAD_OPERATION`].
    pub fn load_dataset<P: AsRef<Path>>(
        &mut self,
        path: P,
        invalid_columns: &[String],
    ) -> BenchResult<Dataset> {
        self.timings.measure(LOAD_OPERATION, || {
            dataset::load_dataset(path, invalid_columns)
        })
    }

    /// One index + query cycle for the named backend, reference or optional.
    pub fn run_trial(
        &mut self,
        name: &str,
        dataset: &Dataset,
        query: &str,
    ) -> BenchResult<TrialOutcome> {
        if name == self.backends.reference().name() {
            return self.run_reference(dataset, query);
        }
        self.run_optional(name, dataset, query)
    }

    pub fn run_reference(&mut self, dataset: &Dataset, query: &str) -> BenchResult<TrialOutcome> {
        trial(self.backends.reference(), &mut self.timings, dataset, query)
    }

    pub fn run_optional(
        &mut self,
        name: &str,
        dataset: &Dataset,
        query: &str,
    ) -> BenchResult<TrialOutcome> {
        let backend = self.backends.optional(name)?;
        trial(backend, &mut self.timings, dataset, query)
    }

    /// Reference trial, then the selected optional trials in order, then comparisons.
    ///
    /// Every selected name is resolved before the first optional trial starts,
    /// so an unknown name aborts the run with only the reference measured.
    pub fn run(
        &mut self,
        dataset: &Dataset,
        query: &str,
        selected: &[String],
    ) -> BenchResult<BenchmarkOutcome> {
        let mut trials = vec![self.run_reference(dataset, query)?];

        let optional = selected
            .iter()
            .map(|name| self.backends.optional(name))
            .collect::<BenchResult<Vec<&dyn Backend>>>()?;

        for backend in optional {
            trials.push(trial(backend, &mut self.timings, dataset, query)?);
        }

        let comparisons = report::compare(
            &self.timings,
            self.backends.reference().name(),
            &self.backends.optional_names(),
        )?;
        Ok(BenchmarkOutcome {
            trials,
            comparisons,
        })
    }
}

fn trial(
    backend: &dyn Backend,
    timings: &mut TimingRegistry,
    dataset: &Dataset,
    query: &str,
) -> BenchResult<TrialOutcome> {
    let name = backend.name();
    let _span = info_span!("trial", backend = name).entered();
    print_banner(name);

    let mut handle = timings.measure(&operation_id(OperationKind::Index, name), || {
        backend.prepare_index(dataset)
    })?;
    let result_count = timings.measure(&operation_id(OperationKind::Query, name), || {
        let count = handle.run_query(query)?;
        println!("Found {} results for query '{}'", count, query);
        Ok::<_, BenchError>(count)
    })?;
    println!();

    info!(result_count, "Trial finished");
    Ok(TrialOutcome {
        backend: name.to_string(),
        result_count,
    })
}

fn print_banner(name: &str) {
    let rule = "#".repeat(50);
    println!("{}", rule);
    println!("{}", name);
    println!("{}", rule);
}

/// Load the configured dataset, run every trial and print the comparison report.
pub fn execute_benchmark(config: &BenchConfig, run_id: Uuid) -> BenchResult<RunSummary> {
    info!(
        data_path = %config.data_path,
        query = %config.query,
        backends = ?config.backends,
        "Starting benchmark"
    );

    let mut harness = Harness::new(BackendRegistry::from_config(config));
    let dataset = harness.load_dataset(&config.data_path, &config.invalid_columns)?;
    let stats = DatasetStats::collect(&config.data_path, &dataset)?;

    let outcome = harness.run(&dataset, &config.query, &config.backends)?;
    report::print_report(&outcome.comparisons);

    let result_counts: BTreeMap<String, usize> = outcome
        .trials
        .into_iter()
        .map(|t| (t.backend, t.result_count))
        .collect();

    info!("Benchmark completed successfully.");
    Ok(RunSummary::new(
        run_id,
        &config.query,
        stats,
        harness.timings(),
        result_counts,
        outcome.comparisons,
    ))
}
