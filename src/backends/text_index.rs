use super::SearchHandle;
use crate::errors::{BenchError, BenchResult};
use std::collections::HashSet;
use tantivy::collector::Count;
use tantivy::query::QueryParser;
use tantivy::schema::{is_valid_field_name, Field, Schema, TextOptions};
use tantivy::{Index, IndexReader, IndexWriter};
use tracing::debug;

/// One text field per column, in column order.
///
/// Column names tantivy rejects (empty, or starting with `-`) are indexed
/// under `col_<idx>` instead.
pub(crate) fn text_schema(columns: &[String], options: TextOptions) -> (Schema, Vec<Field>) {
    let mut builder = Schema::builder();
    let fields = field_names(columns)
        .iter()
        .map(|name| builder.add_text_field(name, options.clone()))
        .collect();
    (builder.build(), fields)
}

pub(crate) fn field_names(columns: &[String]) -> Vec<String> {
    let taken: HashSet<&str> = columns
        .iter()
        .map(String::as_str)
        .filter(|name| is_valid_field_name(name))
        .collect();
    let mut renamed = HashSet::new();
    columns
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            if is_valid_field_name(name) {
                return name.clone();
            }
            let mut candidate = format!("col_{}", idx);
            while taken.contains(candidate.as_str()) || renamed.contains(&candidate) {
                candidate.push('_');
            }
            renamed.insert(candidate.clone());
            candidate
        })
        .collect()
}

pub(crate) fn open_writer(
    backend: &str,
    index: &Index,
    memory_bytes: usize,
) -> BenchResult<IndexWriter> {
    index
        .writer(memory_bytes)
        .map_err(|e| BenchError::backend(backend, e))
}

/// Queryable in-memory tantivy index searched across every field.
pub(crate) struct TextIndexHandle {
    backend: String,
    index: Index,
    reader: IndexReader,
    fields: Vec<Field>,
}

impl TextIndexHandle {
    /// Commit pending documents and open a reader over them.
    pub(crate) fn commit(
        backend: &str,
        index: Index,
        mut writer: IndexWriter,
        fields: Vec<Field>,
    ) -> BenchResult<Self> {
        writer
            .commit()
            .map_err(|e| BenchError::backend(backend, e))?;
        let reader = index
            .reader()
            .map_err(|e| BenchError::backend(backend, e))?;
        let handle = Self {
            backend: backend.to_string(),
            index,
            reader,
            fields,
        };
        debug!(backend, documents = handle.num_docs(), "Index committed");
        Ok(handle)
    }

    pub(crate) fn num_docs(&self) -> u64 {
        self.reader.searcher().num_docs()
    }
}

impl SearchHandle for TextIndexHandle {
    fn run_query(&mut self, query: &str) -> BenchResult<usize> {
        let parser = QueryParser::for_index(&self.index, self.fields.clone());
        let parsed = parser
            .parse_query(query)
            .map_err(|e| BenchError::backend(&self.backend, e))?;
        self.reader
            .searcher()
            .search(&parsed, &Count)
            .map_err(|e| BenchError::backend(&self.backend, e))
    }
}
