use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Upstream returned {status}: {body}")]
    Upstream { status: StatusCode, body: String },

    #[error("Upstream request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AdminError {
    /// Text recorded against a device when an upstream call fails.
    ///
    /// Status failures keep only the upstream body so operators see what
    /// Leshan rejected; transport failures keep the full error chain.
    pub fn detail(&self) -> String {
        match self {
            AdminError::Upstream { body, .. } if !body.is_empty() => body.clone(),
            AdminError::Upstream { status, .. } => status.to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AdminError>;
