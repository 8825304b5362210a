use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The API rejected the token (or there was none to send).
    #[error("Unauthorized")]
    Unauthorized,

    /// The API answered with an error status or a non-success envelope.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Upload failed: {0}")]
    Upload(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

impl GatewayError {
    /// Maps an HTTP status and server message; 401 and 403 both mean the
    /// session is no longer valid.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        match status {
            401 | 403 => GatewayError::Unauthorized,
            _ => GatewayError::Api {
                status,
                message: message.into(),
            },
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, GatewayError::Unauthorized)
    }
}

#[cfg(feature = "server")]
impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout
        } else if let Some(status) = err.status() {
            GatewayError::from_status(status.as_u16(), err.to_string())
        } else if err.is_decode() {
            GatewayError::Decode(err.to_string())
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}
