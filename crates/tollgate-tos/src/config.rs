//! Default TOS connector configuration.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use tollgate_core::{Error, Result};

/// Default Volcengine STS endpoint.
pub const DEFAULT_STS_ENDPOINT: &str = "https://sts.volcengineapi.com";

/// Region the Volcengine STS service signs requests for.
pub const DEFAULT_STS_REGION: &str = "cn-north-1";

/// STS API version implementing `AssumeRole`.
pub const DEFAULT_STS_VERSION: &str = "2018-01-01";

/// Default timeout for STS HTTP requests: 30 seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Configuration for [`TosConnector`](crate::TosConnector).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct TosConnectorConfig {
    /// Volcengine STS endpoint
    #[cfg_attr(
        feature = "config",
        arg(long = "tos-sts-endpoint", env = "TOS_STS_ENDPOINT", default_value = DEFAULT_STS_ENDPOINT)
    )]
    #[serde(default = "default_sts_endpoint")]
    pub sts_endpoint: String,

    /// Region used to sign STS requests
    #[cfg_attr(
        feature = "config",
        arg(long = "tos-sts-region", env = "TOS_STS_REGION", default_value = DEFAULT_STS_REGION)
    )]
    #[serde(default = "default_sts_region")]
    pub sts_region: String,

    /// STS API version
    #[cfg_attr(
        feature = "config",
        arg(long = "tos-sts-version", env = "TOS_STS_VERSION", default_value = DEFAULT_STS_VERSION)
    )]
    #[serde(default = "default_sts_version")]
    pub sts_version: String,

    /// Scheme of presigned URLs when the endpoint has none
    #[cfg_attr(
        feature = "config",
        arg(long = "tos-url-scheme", env = "TOS_URL_SCHEME", default_value = "https")
    )]
    #[serde(default = "default_url_scheme")]
    pub url_scheme: String,

    /// HTTP request timeout in seconds
    #[cfg_attr(
        feature = "config",
        arg(long = "tos-http-timeout", env = "TOS_HTTP_TIMEOUT", default_value = "30")
    )]
    #[serde(default = "default_http_timeout")]
    pub http_timeout: u64,

    /// User-Agent header to send with STS requests
    #[cfg_attr(feature = "config", arg(long = "tos-user-agent", env = "TOS_USER_AGENT"))]
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_sts_endpoint() -> String {
    DEFAULT_STS_ENDPOINT.to_string()
}

fn default_sts_region() -> String {
    DEFAULT_STS_REGION.to_string()
}

fn default_sts_version() -> String {
    DEFAULT_STS_VERSION.to_string()
}

fn default_url_scheme() -> String {
    "https".to_string()
}

fn default_http_timeout() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

impl Default for TosConnectorConfig {
    fn default() -> Self {
        Self {
            sts_endpoint: default_sts_endpoint(),
            sts_region: default_sts_region(),
            sts_version: default_sts_version(),
            url_scheme: default_url_scheme(),
            http_timeout: default_http_timeout(),
            user_agent: None,
        }
    }
}

impl TosConnectorConfig {
    /// Set the STS endpoint.
    #[must_use]
    pub fn with_sts_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.sts_endpoint = endpoint.into();
        self
    }

    /// Set the STS signing region.
    #[must_use]
    pub fn with_sts_region(mut self, region: impl Into<String>) -> Self {
        self.sts_region = region.into();
        self
    }

    /// Set the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Returns the effective timeout, using default if zero.
    pub fn effective_timeout(&self) -> Duration {
        if self.http_timeout == 0 {
            Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS)
        } else {
            Duration::from_secs(self.http_timeout)
        }
    }

    /// Returns the effective user agent, using default if not set.
    pub fn effective_user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("tollgate/{}", env!("CARGO_PKG_VERSION")))
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an unparsable STS endpoint, an empty
    /// region or version, or a URL scheme other than `http` or `https`.
    pub fn validate(&self) -> Result<()> {
        let endpoint = url::Url::parse(&self.sts_endpoint).map_err(|e| {
            Error::configuration(format!("Invalid STS endpoint '{}'", self.sts_endpoint))
                .with_source(e)
        })?;
        if endpoint.host_str().is_none() {
            return Err(Error::configuration(format!(
                "STS endpoint '{}' has no host",
                self.sts_endpoint
            )));
        }

        if self.sts_region.trim().is_empty() {
            return Err(Error::configuration("STS region cannot be empty"));
        }

        if self.sts_version.trim().is_empty() {
            return Err(Error::configuration("STS version cannot be empty"));
        }

        if !matches!(self.url_scheme.as_str(), "http" | "https") {
            return Err(Error::configuration(format!(
                "Unsupported URL scheme '{}'",
                self.url_scheme
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TosConnectorConfig::default();
        assert_eq!(config.sts_endpoint, "https://sts.volcengineapi.com");
        assert_eq!(config.sts_region, "cn-north-1");
        assert_eq!(config.effective_timeout(), Duration::from_secs(30));
        assert!(config.effective_user_agent().starts_with("tollgate/"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let bad_endpoint = TosConnectorConfig::default().with_sts_endpoint("not a url");
        assert!(bad_endpoint.validate().is_err());

        let empty_region = TosConnectorConfig::default().with_sts_region(" ");
        assert!(empty_region.validate().is_err());

        let bad_scheme = TosConnectorConfig {
            url_scheme: "ftp".into(),
            ..TosConnectorConfig::default()
        };
        assert!(bad_scheme.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_uses_default() {
        let config = TosConnectorConfig {
            http_timeout: 0,
            ..TosConnectorConfig::default()
        };
        assert_eq!(config.effective_timeout(), Duration::from_secs(30));
    }
}
