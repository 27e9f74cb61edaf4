//! Transport errors of the Volcengine STS client.

use thiserror::Error;
use tollgate_core::ErrorKind;

/// Error type for the STS HTTP exchange.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),
    /// Response body could not be decoded.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl From<Error> for tollgate_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Reqwest(e) => {
                let kind = if e.is_timeout() {
                    ErrorKind::Timeout
                } else {
                    ErrorKind::NetworkError
                };
                let message = if e.is_connect() {
                    "Connection to STS endpoint failed".to_string()
                } else {
                    e.to_string()
                };
                tollgate_core::Error::new(kind)
                    .with_message(message)
                    .with_source(e)
            }
            Error::Serde(e) => tollgate_core::Error::new(ErrorKind::Serialization)
                .with_message(format!("Malformed STS response: {e}"))
                .with_source(e),
        }
    }
}
