use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::normalize::{ResultRow, TableSource};

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct FindMetricsParams {
    /// Free-text product idea forwarded to the research webhook.
    pub query: String,
    /// Skip the response cache and call the webhook again (default: false).
    pub refresh: Option<bool>,
    /// Include the raw webhook payload in the response for debugging (default: false).
    pub include_raw: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FindMetricsResponse {
    pub query: String,
    /// Extraction strategy that produced the rows.
    pub source: TableSource,
    pub columns: Vec<String>,
    pub rows: Vec<ResultRow>,
    /// Whether the webhook body was served from the response cache.
    pub cached: bool,
    /// Human-readable summary, e.g. "Found 5 ranked metrics".
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<serde_json::Value>,
}
