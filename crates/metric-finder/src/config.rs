use metric_common::webhook::WebhookClientConfig;

use crate::error::AppError;

const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

/// Application configuration loaded explicitly from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Endpoint, timeout and retry policy for the research webhook.
    pub webhook: WebhookClientConfig,
    /// Redis connection URL (e.g. "redis://127.0.0.1:6379"). `None` disables caching.
    pub redis_url: Option<String>,
    /// Lifetime of a cached webhook body.
    pub cache_ttl_secs: u64,
}

impl Config {
    /// Required:
    /// - `WEBHOOK_URL`: automation webhook that researches a product idea
    ///
    /// Optional:
    /// - `WEBHOOK_*` tuning knobs (see [`WebhookClientConfig::from_env`])
    /// - `REDIS_URL`: Redis connection string (omit to disable caching)
    /// - `CACHE_TTL_SECS`: cached response lifetime, default 3600
    pub fn from_env() -> Result<Self, AppError> {
        let webhook = WebhookClientConfig::from_env()?;

        let cache_ttl_secs = match std::env::var("CACHE_TTL_SECS") {
            Ok(raw) => parse_ttl(&raw)?,
            Err(_) => DEFAULT_CACHE_TTL_SECS,
        };

        let redis_url = std::env::var("REDIS_URL")
            .ok()
            .filter(|u| !u.trim().is_empty());

        Ok(Self {
            webhook,
            redis_url,
            cache_ttl_secs,
        })
    }
}

fn parse_ttl(raw: &str) -> Result<u64, AppError> {
    match raw.trim().parse::<u64>() {
        Ok(0) | Err(_) => Err(AppError::Config(format!(
            "CACHE_TTL_SECS must be a positive integer, got '{raw}'"
        ))),
        Ok(ttl) => Ok(ttl),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_must_be_positive() {
        assert_eq!(parse_ttl(" 60 ").unwrap(), 60);
        assert!(matches!(parse_ttl("0"), Err(AppError::Config(_))));
        assert!(matches!(parse_ttl("soon"), Err(AppError::Config(_))));
    }
}
