//! Scripted outcomes for mock clients.

use std::time::Duration;

use tollgate_core::{Error, ErrorKind, Result};

/// How a mock client answers a request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MockBehavior {
    /// Answer successfully.
    #[default]
    Succeed,
    /// Fail with a provider error of the given kind and message.
    Fail(ErrorKind, String),
    /// Sleep for the given duration before answering successfully.
    Delay(Duration),
    /// Panic inside the client.
    Panic,
}

impl MockBehavior {
    /// Fails with an [`ErrorKind::Authorization`] error carrying `reason`.
    pub fn reject(reason: impl Into<String>) -> Self {
        Self::Fail(ErrorKind::Authorization, reason.into())
    }

    /// Fails with an [`ErrorKind::ExternalError`] error carrying `reason`.
    pub fn fail(reason: impl Into<String>) -> Self {
        Self::Fail(ErrorKind::ExternalError, reason.into())
    }

    pub(crate) async fn apply(&self) -> Result<()> {
        match self {
            Self::Succeed => Ok(()),
            Self::Fail(kind, message) => Err(Error::new(*kind).with_message(message.clone())),
            Self::Delay(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(())
            }
            Self::Panic => panic!("mock client panicked"),
        }
    }
}
