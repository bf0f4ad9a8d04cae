use thiserror::Error;

pub type Result<T, E = NonceError> = std::result::Result<T, E>;

/// Errors are reserved for misconfiguration. A nonce that does not verify is
/// `Verdict::Invalid`, never an error.
#[derive(Debug, Error)]
pub enum NonceError {
    #[error("nonce lifespan must be positive, got {lifespan} s for action {action}")]
    InvalidLifespan { lifespan: i64, action: String },

    #[error("config: {0}")]
    Config(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}
