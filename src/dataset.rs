use crate::errors::{BenchError, BenchResult};
use polars::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Column names dropped from every loaded dataset unless configured otherwise.
pub const DEFAULT_INVALID_COLUMNS: &[&str] = &["", "Unnamed: 0"];

/// A cleaned, in-memory table: no blocklisted columns and no row holding a null.
#[derive(Debug, Clone)]
pub struct Dataset {
    frame: DataFrame,
}

impl Dataset {
    /// Wrap an already loaded frame, cleaning it on the way in.
    pub fn from_frame(df: DataFrame, invalid_columns: &[String]) -> BenchResult<Self> {
        Ok(Self {
            frame: clean_frame(df, invalid_columns)?,
        })
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect()
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn width(&self) -> usize {
        self.frame.width()
    }

    /// Every column cast to text, so backends can treat all fields as opaque strings.
    pub fn text_columns(&self) -> BenchResult<TextColumns> {
        let mut names = Vec::with_capacity(self.width());
        let mut values = Vec::with_capacity(self.width());
        for column in self.frame.get_columns() {
            let as_text = column.cast(&DataType::String)?;
            names.push(column.name().to_string());
            values.push(as_text.str()?.clone());
        }
        Ok(TextColumns {
            names,
            values,
            height: self.height(),
        })
    }
}

/// Column-major text view over a [`Dataset`].
#[derive(Debug, Clone)]
pub struct TextColumns {
    names: Vec<String>,
    values: Vec<StringChunked>,
    height: usize,
}

impl TextColumns {
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn value(&self, column: usize, row: usize) -> &str {
        self.values[column].get(row).unwrap_or_default()
    }

    /// `(column name, value)` pairs of one row, in column order.
    pub fn row(&self, row: usize) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.names
            .iter()
            .enumerate()
            .map(move |(idx, name)| (name.as_str(), self.value(idx, row)))
    }
}

/// Read a CSV file and clean it into a [`Dataset`].
pub fn load_dataset<P: AsRef<Path>>(path: P, invalid_columns: &[String]) -> BenchResult<Dataset> {
    let path_ref = path.as_ref();
    let load_err = |source| BenchError::LoadError {
        path: path_ref.display().to_string(),
        source,
    };

    info!("Reading dataset: {:?}", path_ref);
    let df = LazyCsvReader::new(path_ref)
        .finish()
        .and_then(|lf| lf.collect())
        .map_err(load_err)?;

    let dataset = Dataset::from_frame(df, invalid_columns)?;
    info!(
        rows = dataset.height(),
        columns = dataset.width(),
        "Dataset loaded"
    );
    Ok(dataset)
}

/// Drop blocklisted columns, then every row containing a null.
///
/// Cleaning an already clean frame returns it unchanged.
pub fn clean_frame(df: DataFrame, invalid_columns: &[String]) -> BenchResult<DataFrame> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let keep: Vec<String> = names
        .iter()
        .filter(|name| !invalid_columns.contains(*name))
        .cloned()
        .collect();

    let df = if keep.len() == names.len() {
        df
    } else {
        debug!(
            dropped = names.len() - keep.len(),
            "Dropping blocklisted columns"
        );
        df.select(keep)?
    };

    if df.get_columns().iter().all(|c| c.null_count() == 0) {
        return Ok(df);
    }

    let mut mask = BooleanChunked::full("mask".into(), true, df.height());
    for column in df.get_columns() {
        mask = &mask & &column.as_materialized_series().is_not_null();
    }
    let cleaned = df.filter(&mask)?;
    debug!(
        dropped_rows = df.height() - cleaned.height(),
        "Dropped rows containing nulls"
    );
    Ok(cleaned)
}

/// The default blocklist as owned strings.
pub fn default_invalid_columns() -> Vec<String> {
    DEFAULT_INVALID_COLUMNS.iter().map(|s| s.to_string()).collect()
}
