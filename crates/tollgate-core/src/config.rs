//! Broker policy configuration.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default presigned URL validity: 1 hour.
pub const DEFAULT_PRESIGN_EXPIRY: Duration = Duration::from_secs(3600);

/// Longest presigned URL validity accepted by the supported providers: 7 days.
pub const MAX_PRESIGN_EXPIRY: Duration = Duration::from_secs(7 * 24 * 3600);

/// Default lifetime requested for assumed-role credentials: 1 hour.
pub const DEFAULT_STS_DURATION: Duration = Duration::from_secs(3600);

/// Shortest assumed-role lifetime the supported providers accept: 15 minutes.
pub const MIN_STS_DURATION: Duration = Duration::from_secs(900);

/// Longest assumed-role lifetime the supported providers accept: 12 hours.
pub const MAX_STS_DURATION: Duration = Duration::from_secs(43200);

/// Default upper bound for a single signer or STS call: 30 seconds.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Default prefix of generated role session names.
pub const DEFAULT_SESSION_PREFIX: &str = "tollgate";

/// Clamps an assumed-role lifetime to the range providers accept.
#[must_use]
pub fn clamp_sts_duration(duration: Duration) -> Duration {
    duration.clamp(MIN_STS_DURATION, MAX_STS_DURATION)
}

/// Policy knobs shared by every backend adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct RemoteConfig {
    /// Presigned URL validity in seconds
    #[cfg_attr(
        feature = "config",
        arg(long = "presign-expiry", env = "TOLLGATE_PRESIGN_EXPIRY", default_value = "3600")
    )]
    #[serde(default = "default_presign_expiry_secs")]
    pub presign_expiry_secs: u64,

    /// Requested lifetime of assumed-role credentials in seconds
    #[cfg_attr(
        feature = "config",
        arg(long = "sts-duration", env = "TOLLGATE_STS_DURATION", default_value = "3600")
    )]
    #[serde(default = "default_sts_duration_secs")]
    pub sts_duration_secs: u64,

    /// Upper bound for a single signer or STS call in seconds
    #[cfg_attr(
        feature = "config",
        arg(long = "call-timeout", env = "TOLLGATE_CALL_TIMEOUT", default_value = "30")
    )]
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,

    /// Prefix of generated role session names
    #[cfg_attr(
        feature = "config",
        arg(long = "session-prefix", env = "TOLLGATE_SESSION_PREFIX", default_value = "tollgate")
    )]
    #[serde(default = "default_session_prefix")]
    pub session_prefix: String,
}

fn default_presign_expiry_secs() -> u64 {
    DEFAULT_PRESIGN_EXPIRY.as_secs()
}

fn default_sts_duration_secs() -> u64 {
    DEFAULT_STS_DURATION.as_secs()
}

fn default_call_timeout_secs() -> u64 {
    DEFAULT_CALL_TIMEOUT.as_secs()
}

fn default_session_prefix() -> String {
    DEFAULT_SESSION_PREFIX.to_string()
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            presign_expiry_secs: default_presign_expiry_secs(),
            sts_duration_secs: default_sts_duration_secs(),
            call_timeout_secs: default_call_timeout_secs(),
            session_prefix: default_session_prefix(),
        }
    }
}

impl RemoteConfig {
    /// Returns the presigned URL validity, capped at [`MAX_PRESIGN_EXPIRY`].
    pub fn presign_expiry(&self) -> Duration {
        Duration::from_secs(self.presign_expiry_secs).min(MAX_PRESIGN_EXPIRY)
    }

    /// Returns the assumed-role lifetime, clamped to the provider range.
    pub fn sts_duration(&self) -> Duration {
        clamp_sts_duration(Duration::from_secs(self.sts_duration_secs))
    }

    /// Returns the per-call timeout, falling back to the default when zero.
    pub fn call_timeout(&self) -> Duration {
        if self.call_timeout_secs == 0 {
            DEFAULT_CALL_TIMEOUT
        } else {
            Duration::from_secs(self.call_timeout_secs)
        }
    }

    /// Returns the session name prefix.
    pub fn session_prefix(&self) -> &str {
        &self.session_prefix
    }

    /// Set the presigned URL validity.
    #[must_use]
    pub fn with_presign_expiry(mut self, expiry: Duration) -> Self {
        self.presign_expiry_secs = expiry.as_secs();
        self
    }

    /// Set the assumed-role lifetime.
    #[must_use]
    pub fn with_sts_duration(mut self, duration: Duration) -> Self {
        self.sts_duration_secs = duration.as_secs();
        self
    }

    /// Set the per-call timeout.
    #[must_use]
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout_secs = timeout.as_secs();
        self
    }

    /// Set the session name prefix.
    #[must_use]
    pub fn with_session_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.session_prefix = prefix.into();
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the presign expiry is zero or the
    /// session prefix contains characters providers reject.
    pub fn validate(&self) -> Result<()> {
        if self.presign_expiry_secs == 0 {
            return Err(Error::configuration(
                "Presign expiry must be greater than zero",
            ));
        }

        if self.sts_duration_secs == 0 {
            return Err(Error::configuration(
                "STS duration must be greater than zero",
            ));
        }

        let valid_prefix = !self.session_prefix.is_empty()
            && self.session_prefix.len() <= 32
            && self
                .session_prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '@' | '='));
        if !valid_prefix {
            return Err(Error::configuration(format!(
                "Invalid session prefix '{}'",
                self.session_prefix
            )));
        }

        if Duration::from_secs(self.presign_expiry_secs) > MAX_PRESIGN_EXPIRY {
            tracing::warn!(
                target: crate::TRACING_TARGET_CONFIG,
                expiry_secs = self.presign_expiry_secs,
                "Presign expiry exceeds the provider maximum and will be capped"
            );
        }

        Ok(())
    }
}
