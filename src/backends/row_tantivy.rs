use super::text_index::{open_writer, text_schema, TextIndexHandle};
use super::{Backend, SearchHandle};
use crate::dataset::Dataset;
use crate::errors::{BenchError, BenchResult};
use std::collections::HashMap;
use tantivy::schema::{Field, STORED, TEXT};
use tantivy::{Index, TantivyDocument};

pub const NAME: &str = "tantivy";

/// Plain tantivy usage: one document per row, built from a name -> value map,
/// every column stored as a text field.
pub struct RowTantivyBackend {
    writer_memory_bytes: usize,
}

impl RowTantivyBackend {
    pub fn new(writer_memory_bytes: usize) -> Self {
        Self {
            writer_memory_bytes,
        }
    }
}

impl Backend for RowTantivyBackend {
    fn name(&self) -> &str {
        NAME
    }

    fn prepare_index(&self, dataset: &Dataset) -> BenchResult<Box<dyn SearchHandle>> {
        let text = dataset.text_columns()?;
        let (schema, fields) = text_schema(text.names(), TEXT | STORED);
        let index = Index::create_in_ram(schema);
        let writer = open_writer(NAME, &index, self.writer_memory_bytes)?;
        let field_by_column: HashMap<&str, Field> = text
            .names()
            .iter()
            .map(String::as_str)
            .zip(fields.iter().copied())
            .collect();

        for row in 0..text.height() {
            let values: HashMap<&str, &str> = text.row(row).collect();
            let mut doc = TantivyDocument::default();
            for (name, value) in values {
                let field = *field_by_column.get(name).ok_or_else(|| {
                    BenchError::backend(NAME, format!("no field for column '{}'", name))
                })?;
                doc.add_text(field, value);
            }
            writer
                .add_document(doc)
                .map_err(|e| BenchError::backend(NAME, e))?;
        }

        let handle = TextIndexHandle::commit(NAME, index, writer, fields)?;
        Ok(Box::new(handle))
    }
}
