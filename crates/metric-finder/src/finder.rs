/// Finder service: product idea → (cache | webhook) → normalized table.
use serde_json::Value;
use tracing::{debug, info};

use metric_common::normalize::{build_table, decode_body, ResultTable};
use metric_common::webhook::WebhookClient;

use crate::cache::ResponseCache;
use crate::error::AppError;

/// The outcome of one lookup. The raw payload is kept for the debug view.
#[derive(Debug, Clone)]
pub struct Lookup {
    pub query: String,
    pub raw: Value,
    pub table: ResultTable,
    pub cached: bool,
}

impl Lookup {
    pub fn message(&self) -> String {
        summary_message(&self.table)
    }
}

pub fn summary_message(table: &ResultTable) -> String {
    if table.is_empty() {
        "No ranked metrics were found in the response.".to_string()
    } else {
        format!("Found {} ranked metrics:", table.len())
    }
}

pub struct MetricFinder {
    client: WebhookClient,
    cache: ResponseCache,
}

impl MetricFinder {
    pub fn new(client: WebhookClient, cache: ResponseCache) -> Self {
        Self { client, cache }
    }

    /// Look up the ranked metrics for `query`.
    ///
    /// With `refresh` the cache is not read, but a fresh non-empty result is still
    /// written back.
    pub async fn find(&self, query: &str, refresh: bool) -> Result<Lookup, AppError> {
        if query.trim().is_empty() {
            return Err(AppError::EmptyQuery);
        }

        if !refresh {
            if let Some(body) = self.cache.get_response(query).await {
                debug!("webhook response served from cache");
                return Ok(lookup(query, &body, true));
            }
        }

        let response = self.client.submit(query).await?;
        let result = lookup(query, &response.body, false);
        if !result.table.is_empty() {
            self.cache.set_response(query, &response.body).await;
        }
        Ok(result)
    }
}

fn lookup(query: &str, body: &str, cached: bool) -> Lookup {
    let raw = decode_body(body);
    let table = build_table(&raw);
    info!(
        rows = table.len(),
        source = %table.source,
        cached,
        "metrics extracted"
    );
    Lookup {
        query: query.to_string(),
        raw,
        table,
        cached,
    }
}
