use metric_common::error::CommonError;
use metric_common::webhook::WebhookError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Common(#[from] CommonError),

    #[error(transparent)]
    Webhook(#[from] WebhookError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("please enter a query")]
    EmptyQuery,
}
