use super::{Backend, SearchHandle};
use crate::config::ElasticConfig;
use crate::dataset::{Dataset, TextColumns};
use crate::errors::{BenchError, BenchResult};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::{Client, Response};
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde_json::{json, Map, Value};
use std::ops::Range;
use tracing::{debug, info};

pub const NAME: &str = "elastic";

/// Elasticsearch reached over its REST API.
///
/// Every column is mapped as a `text` field. The target index is dropped and
/// recreated on each run.
pub struct ElasticBackend {
    config: ElasticConfig,
}

impl ElasticBackend {
    pub fn new(config: ElasticConfig) -> Self {
        Self { config }
    }

    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    fn index_url(&self) -> String {
        format!("{}/{}", self.base_url(), self.config.index)
    }

    /// Fails with `BackendUnavailable` when nothing answers at the configured URL.
    fn ping(&self, client: &Client) -> BenchResult<()> {
        let response = client
            .get(self.base_url())
            .send()
            .map_err(|e| BenchError::unavailable(NAME, e))?;
        json_body(response)?;
        Ok(())
    }

    fn replace_index(&self, client: &Client, columns: &[String]) -> BenchResult<()> {
        let response = client
            .delete(self.index_url())
            .send()
            .map_err(|e| BenchError::unavailable(NAME, e))?;
        if response.status() != StatusCode::NOT_FOUND {
            json_body(response)?;
        }

        let response = client
            .put(self.index_url())
            .json(&index_mapping(columns))
            .send()
            .map_err(|e| BenchError::unavailable(NAME, e))?;
        json_body(response)?;
        Ok(())
    }

    fn upload(&self, client: &Client, text: &TextColumns) -> BenchResult<()> {
        let batch_size = self.config.batch_size.max(1);
        let pb = ProgressBar::new(text.height() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
                .map_err(|e| BenchError::Unknown(e.into()))?
                .progress_chars("#>-"),
        );
        pb.set_message("Uploading documents...");

        let bulk_url = format!("{}/_bulk", self.index_url());
        let mut start = 0;
        while start < text.height() {
            let end = (start + batch_size).min(text.height());
            let response = client
                .post(&bulk_url)
                .header(CONTENT_TYPE, "application/x-ndjson")
                .body(bulk_body(&self.config.index, text, start..end))
                .send()
                .map_err(|e| BenchError::unavailable(NAME, e))?;
            check_bulk_response(&json_body(response)?)?;
            pb.inc((end - start) as u64);
            start = end;
        }
        pb.finish_and_clear();

        let response = client
            .post(format!("{}/_refresh", self.index_url()))
            .send()
            .map_err(|e| BenchError::unavailable(NAME, e))?;
        json_body(response)?;
        Ok(())
    }
}

impl Backend for ElasticBackend {
    fn name(&self) -> &str {
        NAME
    }

    fn prepare_index(&self, dataset: &Dataset) -> BenchResult<Box<dyn SearchHandle>> {
        let client = Client::builder()
            .build()
            .map_err(|e| BenchError::backend(NAME, e))?;
        self.ping(&client)?;

        let text = dataset.text_columns()?;
        info!(url = %self.index_url(), "Replacing Elasticsearch index");
        self.replace_index(&client, text.names())?;
        self.upload(&client, &text)?;
        debug!(documents = text.height(), "Elasticsearch index refreshed");

        Ok(Box::new(ElasticHandle {
            client,
            search_url: format!("{}/_search", self.index_url()),
            fields: text.names().to_vec(),
        }))
    }
}

struct ElasticHandle {
    client: Client,
    search_url: String,
    fields: Vec<String>,
}

impl SearchHandle for ElasticHandle {
    fn run_query(&mut self, query: &str) -> BenchResult<usize> {
        let response = self
            .client
            .post(&self.search_url)
            .json(&search_body(query, &self.fields))
            .send()
            .map_err(|e| BenchError::unavailable(NAME, e))?;
        total_hits(&json_body(response)?)
    }
}

fn json_body(response: Response) -> BenchResult<Value> {
    let status = response.status();
    let body: Value = response.json().map_err(|e| BenchError::backend(NAME, e))?;
    if !status.is_success() {
        return Err(BenchError::backend(
            NAME,
            format!("HTTP {}: {}", status, body),
        ));
    }
    Ok(body)
}

pub(crate) fn index_mapping(columns: &[String]) -> Value {
    let properties: Map<String, Value> = columns
        .iter()
        .map(|name| (name.clone(), json!({ "type": "text" })))
        .collect();
    json!({ "mappings": { "properties": properties } })
}

/// NDJSON `_bulk` payload for the given row range.
pub(crate) fn bulk_body(index: &str, text: &TextColumns, rows: Range<usize>) -> String {
    let action = json!({ "index": { "_index": index } }).to_string();
    let mut body = String::new();
    for row in rows {
        let doc: Map<String, Value> = text
            .row(row)
            .map(|(name, value)| (name.to_string(), Value::String(value.to_string())))
            .collect();
        body.push_str(&action);
        body.push('\n');
        body.push_str(&Value::Object(doc).to_string());
        body.push('\n');
    }
    body
}

pub(crate) fn search_body(query: &str, fields: &[String]) -> Value {
    json!({
        "size": 0,
        "track_total_hits": true,
        "query": {
            "multi_match": {
                "query": query,
                "fields": fields,
            }
        }
    })
}

fn check_bulk_response(body: &Value) -> BenchResult<()> {
    if body["errors"].as_bool() != Some(true) {
        return Ok(());
    }
    let reason = body["items"]
        .as_array()
        .and_then(|items| {
            items
                .iter()
                .find_map(|item| item["index"]["error"]["reason"].as_str())
        })
        .unwrap_or("unknown bulk error");
    Err(BenchError::backend(NAME, format!("bulk upload failed: {}", reason)))
}

/// `hits.total` is an object on Elasticsearch 7+ and a bare number before that.
pub(crate) fn total_hits(body: &Value) -> BenchResult<usize> {
    let total = &body["hits"]["total"];
    total["value"]
        .as_u64()
        .or_else(|| total.as_u64())
        .map(|n| n as usize)
        .ok_or_else(|| BenchError::backend(NAME, "search response has no hits.total"))
}
