/// Error types shared across the metric finder crates.
///
/// These cover infrastructure failures (Redis, configuration) that are not tied to a
/// single binary. Application-specific errors wrap `CommonError` via `#[from]`.

#[derive(Debug, thiserror::Error)]
pub enum CommonError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("config error: {0}")]
    Config(String),
}
