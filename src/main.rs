use clap::{Parser, ValueEnum};
use miette::Result;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use searchbench::config::BenchConfig;

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

#[derive(Clone, ValueEnum, Debug)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "searchbench")]
#[command(version = "0.1.0")]
#[command(about = "Compare indexing and query times of search backends", long_about = None)]
struct Cli {
    /// Comma-separated optional backends to run after the reference (e.g. "tantivy,elastic")
    #[arg(value_name = "BACKENDS", value_delimiter = ',')]
    backends: Vec<String>,

    /// Free-text query sent to every backend
    #[arg(long)]
    query: Option<String>,

    /// CSV dataset to index
    #[arg(long, value_name = "PATH")]
    data_path: Option<PathBuf>,

    /// YAML file with benchmark settings (CLI flags take precedence)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Column names dropped while loading the dataset (replaces the default list)
    #[arg(long = "invalid-column", value_name = "COL")]
    invalid_columns: Option<Vec<String>>,

    /// Elasticsearch base URL
    #[arg(long, value_name = "URL")]
    elastic_url: Option<String>,

    /// Print a JSON run summary after the report
    #[arg(long)]
    json: bool,

    /// Increase logging verbosity (Info -> Debug)
    #[arg(short, long)]
    verbose: bool,

    /// Silence all logs
    #[arg(short, long)]
    quiet: bool,

    /// Log format (text or json)
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

impl Cli {
    fn into_config(self) -> Result<BenchConfig> {
        let mut config = match &self.config {
            Some(path) => BenchConfig::from_path(path)?,
            None => BenchConfig::default(),
        };

        let backends: Vec<String> = self
            .backends
            .iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
        if !backends.is_empty() {
            config.backends = backends;
        }
        if let Some(query) = self.query {
            config.query = query;
        }
        if let Some(path) = self.data_path {
            config.data_path = path.display().to_string();
        }
        if let Some(columns) = self.invalid_columns {
            config.invalid_columns = columns;
        }
        if let Some(url) = self.elastic_url {
            config.elastic.url = url;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    // Parse CLI args first
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the timing report
    let default_level = if cli.quiet {
        Level::ERROR
    } else if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    // SEARCHBENCH_LOG > CLI args
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .with_env_var("SEARCHBENCH_LOG")
        .from_env_lossy();

    match cli.log_format {
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .json()
                .with_span_list(false)
                .with_current_span(false)
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }

    let run_id = Uuid::new_v4();
    let _span = tracing::info_span!("root", run_id = %run_id).entered();

    let print_json = cli.json;
    let config = cli.into_config()?;
    let summary = searchbench::runner::execute_benchmark(&config, run_id)?;

    if print_json {
        println!("{}", summary.to_json()?);
    }

    Ok(())
}
