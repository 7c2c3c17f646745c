/// MCP server exposing the metric finder.
///
/// Exposes one tool:
/// - `find_metrics`: research a product idea and return its ranked review metrics
use std::sync::Arc;

use rmcp::{
    Json, ServerHandler,
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::*,
    tool, tool_handler, tool_router,
};

use metric_common::mcp_api::{FindMetricsParams, FindMetricsResponse};

use crate::finder::MetricFinder;

#[derive(Clone)]
pub struct MetricFinderServer {
    finder: Arc<MetricFinder>,
    tool_router: ToolRouter<MetricFinderServer>,
}

impl MetricFinderServer {
    pub fn new(finder: Arc<MetricFinder>) -> Self {
        Self {
            finder,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl MetricFinderServer {
    #[tool(description = "Send a free-text product idea to the research webhook and return the metrics reviewers mention most, ranked by mention count.")]
    async fn find_metrics(
        &self,
        Parameters(params): Parameters<FindMetricsParams>,
    ) -> Result<Json<FindMetricsResponse>, String> {
        if params.query.trim().is_empty() {
            return Err("query must not be empty".to_string());
        }

        let lookup = self
            .finder
            .find(&params.query, params.refresh.unwrap_or(false))
            .await
            .map_err(|e| format!("find_metrics failed: {e}"))?;

        let message = lookup.message();
        let raw = params.include_raw.unwrap_or(false).then_some(lookup.raw);
        Ok(Json(FindMetricsResponse {
            query: lookup.query,
            source: lookup.table.source,
            columns: lookup.table.columns,
            rows: lookup.table.rows,
            cached: lookup.cached,
            message,
            raw,
        }))
    }
}

#[tool_handler]
impl ServerHandler for MetricFinderServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_06_18,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "metric-finder".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Product research MCP server. Call find_metrics with a product idea to get the \
metrics most mentioned in reviews, ranked by mention count. Set refresh to bypass the response \
cache and include_raw to see the webhook payload."
                    .to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metric_common::webhook::{WebhookClient, WebhookClientConfig};
    use serde_json::json;
    use wiremock::matchers::{body_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::cache::ResponseCache;

    fn params(query: &str) -> Parameters<FindMetricsParams> {
        Parameters(FindMetricsParams {
            query: query.to_string(),
            refresh: None,
            include_raw: Some(true),
        })
    }

    #[tokio::test]
    async fn tool_sends_the_query_as_given() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(json!({"query": "  standing desk "})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Stability": 4})))
            .expect(1)
            .mount(&server)
            .await;

        let client = WebhookClient::new(WebhookClientConfig::new(server.uri())).unwrap();
        let finder = Arc::new(MetricFinder::new(client, ResponseCache::in_memory()));
        let Json(resp) = MetricFinderServer::new(finder)
            .find_metrics(params("  standing desk "))
            .await
            .unwrap();
        assert_eq!(resp.query, "  standing desk ");
        assert_eq!(resp.message, "Found 1 ranked metrics:");
        assert_eq!(resp.raw, Some(json!({"Stability": 4})));
    }

    #[tokio::test]
    async fn tool_rejects_blank_queries() {
        let client = WebhookClient::new(WebhookClientConfig::new("http://127.0.0.1:9/unused")).unwrap();
        let finder = Arc::new(MetricFinder::new(client, ResponseCache::disabled()));
        let result = MetricFinderServer::new(finder)
            .find_metrics(params(" \t"))
            .await;
        assert!(matches!(result, Err(e) if e == "query must not be empty"));
    }

    #[test]
    fn tools_publish_output_schemas() {
        let tools = MetricFinderServer::tool_router().list_all();
        let tool = tools
            .iter()
            .find(|t| t.name == "find_metrics")
            .unwrap_or_else(|| panic!("missing tool: find_metrics"));
        assert!(
            tool.output_schema.is_some(),
            "tool find_metrics should publish output_schema"
        );
    }
}
