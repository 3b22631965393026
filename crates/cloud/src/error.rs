use elecmate_core::bulk::RemoteError;

/// Errors raised while talking to the hosted backend.
#[derive(Debug, thiserror::Error)]
pub enum CloudError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-2xx response without a structured error body.
    #[error("Backend returned HTTP {0}")]
    HttpStatus(u16),

    /// Structured `{code, message, details, hint}` error body.
    #[error("{0}")]
    Remote(RemoteError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CloudError {
    /// Map a response body and status to an error, preferring the
    /// structured body when it parses.
    pub fn from_response_body(status: u16, body: &str) -> Self {
        match serde_json::from_str::<RemoteError>(body) {
            Ok(remote) if !remote.message.is_empty() => Self::Remote(remote),
            _ => Self::HttpStatus(status),
        }
    }
}

impl From<CloudError> for RemoteError {
    fn from(err: CloudError) -> Self {
        match err {
            CloudError::Remote(remote) => remote,
            CloudError::HttpStatus(status) => {
                RemoteError::new(format!("Backend returned HTTP {status}"))
                    .with_code(status.to_string())
            }
            CloudError::Request(e) if e.is_timeout() => {
                RemoteError::new("Request timed out").with_code("timeout")
            }
            CloudError::Request(e) => RemoteError::transport(e),
            CloudError::Config(msg) => RemoteError::new(msg).with_code("config"),
        }
    }
}
