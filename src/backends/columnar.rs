use super::text_index::{open_writer, text_schema, TextIndexHandle};
use super::{Backend, SearchHandle, REFERENCE_BACKEND};
use crate::dataset::Dataset;
use crate::errors::{BenchError, BenchResult};
use rayon::prelude::*;
use tantivy::schema::TEXT;
use tantivy::{Index, TantivyDocument};
use tracing::debug;

/// Reference backend: tantivy fed column-wise from the polars frame.
///
/// Columns are cast to text once, documents are assembled in parallel and
/// written with a single commit.
pub struct ColumnarBackend {
    writer_memory_bytes: usize,
}

impl ColumnarBackend {
    pub fn new(writer_memory_bytes: usize) -> Self {
        Self {
            writer_memory_bytes,
        }
    }
}

impl Backend for ColumnarBackend {
    fn name(&self) -> &str {
        REFERENCE_BACKEND
    }

    fn prepare_index(&self, dataset: &Dataset) -> BenchResult<Box<dyn SearchHandle>> {
        let text = dataset.text_columns()?;
        let (schema, fields) = text_schema(text.names(), TEXT);
        let index = Index::create_in_ram(schema);
        let writer = open_writer(self.name(), &index, self.writer_memory_bytes)?;

        let documents: Vec<TantivyDocument> = (0..text.height())
            .into_par_iter()
            .map(|row| {
                let mut doc = TantivyDocument::default();
                for (column, field) in fields.iter().enumerate() {
                    doc.add_text(*field, text.value(column, row));
                }
                doc
            })
            .collect();

        debug!(documents = documents.len(), "Adding documents to reference index");
        for doc in documents {
            writer
                .add_document(doc)
                .map_err(|e| BenchError::backend(REFERENCE_BACKEND, e))?;
        }

        let handle = TextIndexHandle::commit(self.name(), index, writer, fields)?;
        Ok(Box::new(handle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn sample_dataset() -> Dataset {
        let df = df! {
            "title" => ["a", "b", "c"],
            "body" => ["a text", "another text", "something"],
        }
        .unwrap();
        Dataset::from_frame(df, &[]).unwrap()
    }

    #[test]
    fn test_index_and_query() {
        let backend = ColumnarBackend::new(50_000_000);
        let mut handle = backend.prepare_index(&sample_dataset()).unwrap();

        assert_eq!(handle.run_query("text").unwrap(), 2);
        assert_eq!(handle.run_query("something").unwrap(), 1);
        assert_eq!(handle.run_query("missing").unwrap(), 0);
    }

    #[test]
    fn test_columns_with_rejected_names() {
        let df = df! {
            "-score" => ["a"],
            "" => ["unnamed text"],
            "title" => ["b"],
        }
        .unwrap();
        let dataset = Dataset::from_frame(df, &[]).unwrap();

        let mut handle = ColumnarBackend::new(50_000_000)
            .prepare_index(&dataset)
            .unwrap();

        assert_eq!(handle.run_query("unnamed").unwrap(), 1);
        assert_eq!(handle.run_query("b").unwrap(), 1);
    }

    #[test]
    fn test_empty_dataset() {
        let df = df! {
            "title" => [Some("a"), None],
            "body" => [None, Some("text")],
        }
        .unwrap();
        // Both rows hold a null, so cleaning leaves nothing to index
        let dataset = Dataset::from_frame(df, &[]).unwrap();
        assert_eq!(dataset.height(), 0);

        let mut handle = ColumnarBackend::new(50_000_000)
            .prepare_index(&dataset)
            .unwrap();
        assert_eq!(handle.run_query("text").unwrap(), 0);
    }
}
