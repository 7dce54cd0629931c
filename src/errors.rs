use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum BenchError {
    #[error("Configuration error: {0}")]
    #[diagnostic(
        code("SEARCHBENCH-001"),
        help("Please check your benchmark YAML syntax and structure.")
    )]
    ConfigError(#[source] serde_yaml::Error),

    #[error("I/O error: {0}")]
    #[diagnostic(
        code("SEARCHBENCH-002"),
        help("Check file paths and permissions.")
    )]
    IoError(#[from] std::io::Error),

    #[error("Failed to load dataset {path}: {source}")]
    #[diagnostic(
        code("SEARCHBENCH-003"),
        help("The dataset must be a readable CSV file with a header row.")
    )]
    LoadError {
        path: String,
        #[source]
        source: polars::error::PolarsError,
    },

    #[error("Polars error: {0}")]
    #[diagnostic(
        code("SEARCHBENCH-004"),
        help("An error occurred within the data processing engine.")
    )]
    PolarsError(#[from] polars::error::PolarsError),

    #[error("Unknown backend '{name}'")]
    #[diagnostic(code("SEARCHBENCH-005"), help("Known backends: {known}"))]
    UnknownBackend { name: String, known: String },

    #[error("Backend '{backend}' is unavailable: {reason}")]
    #[diagnostic(
        code("SEARCHBENCH-006"),
        help("Start the service the backend depends on, or leave it out of the run.")
    )]
    BackendUnavailable { backend: String, reason: String },

    #[error("Backend '{backend}' failed: {message}")]
    #[diagnostic(code("SEARCHBENCH-007"))]
    BackendError { backend: String, message: String },

    #[error("No timing recorded for reference operation '{0}'")]
    #[diagnostic(
        code("SEARCHBENCH-008"),
        help("The reference trial must complete before comparisons are computed.")
    )]
    MissingReferenceTiming(String),

    #[error(transparent)]
    #[diagnostic(code("SEARCHBENCH-000"))]
    Unknown(#[from] anyhow::Error),
}

impl BenchError {
    pub fn backend(backend: &str, err: impl std::fmt::Display) -> Self {
        BenchError::BackendError {
            backend: backend.to_string(),
            message: err.to_string(),
        }
    }

    pub fn unavailable(backend: &str, err: impl std::fmt::Display) -> Self {
        BenchError::BackendUnavailable {
            backend: backend.to_string(),
            reason: err.to_string(),
        }
    }
}

pub type BenchResult<T> = Result<T, BenchError>;
