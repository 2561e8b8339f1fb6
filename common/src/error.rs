use config::ConfigError;
use thiserror::Error;
use tokio::task::JoinError;

// Core internal errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Vector store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Vector store error ({status}): {message}")]
    Store { status: u16, message: String },
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Extraction error: {0}")]
    Extraction(String),
    #[error("Embedding error: {0}")]
    Embedding(String),
    #[error("Task join error: {0}")]
    Join(#[from] JoinError),
    #[error("IoError: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
    #[error("Internal service error: {0}")]
    InternalError(String),
}

impl AppError {
    /// True for failures where the store could not be reached at all (connect
    /// refused, timeout). Read paths may degrade on these.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            return Self::StoreUnavailable(err.to_string());
        }
        match err.status() {
            Some(status) => Self::Store {
                status: status.as_u16(),
                message: err.to_string(),
            },
            None if err.is_decode() => Self::InternalError(format!(
                "Failed to decode vector store response: {err}"
            )),
            None => Self::StoreUnavailable(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_classification() {
        assert!(AppError::StoreUnavailable("refused".into()).is_unavailable());
        assert!(!AppError::NotFound("docs".into()).is_unavailable());
        assert!(!AppError::Store {
            status: 401,
            message: "bad key".into()
        }
        .is_unavailable());
    }

    #[test]
    fn test_error_messages() {
        let err = AppError::Store {
            status: 409,
            message: "already exists".into(),
        };
        assert_eq!(err.to_string(), "Vector store error (409): already exists");
        assert_eq!(
            AppError::Validation("bad".into()).to_string(),
            "Validation error: bad"
        );
    }
}
