//! SDK Error Types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SdkError>;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("rpc error ({code}): {message}")]
    Rpc { code: i32, message: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("other error: {0}")]
    Other(String),
}

impl SdkError {
    /// True for the RPC codes that mean "try again" rather than "this
    /// request was wrong": throttled (4003) and any 5xxx server error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SdkError::Rpc { code, .. } if *code == 4003 || *code >= 5000)
    }
}

impl From<jsonrpsee::core::ClientError> for SdkError {
    fn from(e: jsonrpsee::core::ClientError) -> Self {
        match e {
            jsonrpsee::core::ClientError::Call(call_err) => SdkError::Rpc {
                code: call_err.code(),
                message: call_err.message().to_string(),
            },
            jsonrpsee::core::ClientError::Transport(e) => {
                SdkError::Transport(format!("transport error: {e}"))
            }
            jsonrpsee::core::ClientError::RestartNeeded(_) => {
                SdkError::Connection("connection restart needed".to_string())
            }
            jsonrpsee::core::ClientError::ParseError(e) => SdkError::Other(format!("parse error: {e}")),
            other => SdkError::Other(other.to_string()),
        }
    }
}
