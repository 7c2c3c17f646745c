use std::time::Duration;

use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::CommonError;
use crate::normalize::decode_body;

#[derive(Clone, Debug)]
pub struct WebhookClientConfig {
    pub url: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub max_error_body_bytes: usize,
}

impl WebhookClientConfig {
    /// Defaults for everything but the endpoint: one attempt with a two minute timeout.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(120),
            max_retries: 0,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_millis(10_000),
            max_error_body_bytes: 8 * 1024,
        }
    }

    /// Required:
    /// - `WEBHOOK_URL`: automation webhook receiving `{"query": ...}`
    ///
    /// Optional:
    /// - `WEBHOOK_TIMEOUT_SECS` (120), `WEBHOOK_MAX_RETRIES` (0)
    /// - `WEBHOOK_RETRY_INITIAL_MS` (500), `WEBHOOK_RETRY_MAX_MS` (10000)
    /// - `WEBHOOK_MAX_ERROR_BODY_BYTES` (8192)
    pub fn from_env() -> Result<Self, CommonError> {
        let url = std::env::var("WEBHOOK_URL")
            .ok()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                CommonError::Config("WEBHOOK_URL environment variable is required".to_string())
            })?;

        let defaults = Self::new(url);

        let timeout = env_parse::<u64>("WEBHOOK_TIMEOUT_SECS")
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);
        let max_retries = env_parse::<u32>("WEBHOOK_MAX_RETRIES").unwrap_or(defaults.max_retries);
        let initial_backoff = env_parse::<u64>("WEBHOOK_RETRY_INITIAL_MS")
            .map(Duration::from_millis)
            .unwrap_or(defaults.initial_backoff);
        let max_backoff = env_parse::<u64>("WEBHOOK_RETRY_MAX_MS")
            .map(Duration::from_millis)
            .unwrap_or(defaults.max_backoff);
        let max_error_body_bytes = env_parse::<usize>("WEBHOOK_MAX_ERROR_BODY_BYTES")
            .unwrap_or(defaults.max_error_body_bytes);

        Ok(Self {
            timeout,
            max_retries,
            initial_backoff,
            max_backoff,
            max_error_body_bytes,
            ..defaults
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse::<T>().ok())
}

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("webhook returned error: status={status} body={body}")]
    Upstream { status: StatusCode, body: String },
}

#[derive(Debug, Serialize)]
struct WebhookRequest<'a> {
    query: &'a str,
}

/// A successful webhook reply, body kept verbatim.
#[derive(Debug, Clone)]
pub struct WebhookResponse {
    pub status: StatusCode,
    pub body: String,
}

impl WebhookResponse {
    /// The body decoded as JSON, or the verbatim text when it is not JSON.
    pub fn payload(&self) -> Value {
        decode_body(&self.body)
    }
}

#[derive(Clone)]
pub struct WebhookClient {
    config: WebhookClientConfig,
    http: reqwest::Client,
}

impl WebhookClient {
    pub fn new(config: WebhookClientConfig) -> Result<Self, WebhookError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("metric-finder/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { config, http })
    }

    /// POST `{"query": query}` to the webhook and return the raw body.
    ///
    /// Transient failures are retried up to `max_retries` times, doubling the
    /// delay between attempts up to `max_backoff`.
    pub async fn submit(&self, query: &str) -> Result<WebhookResponse, WebhookError> {
        let request = WebhookRequest { query };
        let mut delay = self.config.initial_backoff;
        let mut retries = 0;
        loop {
            match self.post(&request).await {
                Err(e) if retries < self.config.max_retries && e.is_transient() => {
                    retries += 1;
                    warn!(
                        retry = retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "webhook call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    delay = next_backoff(delay, self.config.max_backoff);
                }
                result => return result,
            }
        }
    }

    async fn post(&self, request: &WebhookRequest<'_>) -> Result<WebhookResponse, WebhookError> {
        let resp = self
            .http
            .post(&self.config.url)
            .timeout(self.config.timeout)
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let mut body = resp.text().await.unwrap_or_default();
            truncate_on_char_boundary(&mut body, self.config.max_error_body_bytes);
            return Err(WebhookError::Upstream { status, body });
        }

        let body = resp.text().await?;
        debug!(status = status.as_u16(), bytes = body.len(), "webhook responded");
        Ok(WebhookResponse { status, body })
    }
}

impl WebhookError {
    /// Timeouts, refused connections, 429 and 5xx.
    fn is_transient(&self) -> bool {
        match self {
            WebhookError::Request(e) => e.is_timeout() || e.is_connect(),
            WebhookError::Upstream { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
        }
    }
}

fn next_backoff(delay: Duration, max: Duration) -> Duration {
    delay.saturating_mul(2).min(max)
}

fn truncate_on_char_boundary(text: &mut String, max_bytes: usize) {
    if text.len() <= max_bytes {
        return;
    }
    let cut = (0..=max_bytes)
        .rev()
        .find(|&i| text.is_char_boundary(i))
        .unwrap_or(0);
    text.truncate(cut);
}
