//! Default S3 connector configuration.

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use tollgate_core::{Error, Result};

/// Default number of STS attempts, including the first one.
pub const DEFAULT_STS_MAX_ATTEMPTS: u32 = 3;

/// Configuration for [`S3Connector`](crate::S3Connector).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct S3ConnectorConfig {
    /// Sign virtual-hosted-style URLs instead of path-style ones
    #[cfg_attr(
        feature = "config",
        arg(long = "s3-virtual-hosted-style", env = "S3_VIRTUAL_HOSTED_STYLE")
    )]
    #[serde(default)]
    pub virtual_hosted_style: bool,

    /// STS endpoint override, e.g. a regional or FIPS endpoint
    #[cfg_attr(feature = "config", arg(long = "s3-sts-endpoint", env = "S3_STS_ENDPOINT"))]
    #[serde(default)]
    pub sts_endpoint: Option<String>,

    /// STS region override; defaults to the storage target's region
    #[cfg_attr(feature = "config", arg(long = "s3-sts-region", env = "S3_STS_REGION"))]
    #[serde(default)]
    pub sts_region: Option<String>,

    /// Maximum STS attempts, including the first one
    #[cfg_attr(
        feature = "config",
        arg(long = "s3-sts-max-attempts", env = "S3_STS_MAX_ATTEMPTS", default_value = "3")
    )]
    #[serde(default = "default_sts_max_attempts")]
    pub sts_max_attempts: u32,
}

fn default_sts_max_attempts() -> u32 {
    DEFAULT_STS_MAX_ATTEMPTS
}

impl Default for S3ConnectorConfig {
    fn default() -> Self {
        Self {
            virtual_hosted_style: false,
            sts_endpoint: None,
            sts_region: None,
            sts_max_attempts: default_sts_max_attempts(),
        }
    }
}

impl S3ConnectorConfig {
    /// Set virtual-hosted-style signing.
    #[must_use]
    pub fn with_virtual_hosted_style(mut self, enabled: bool) -> Self {
        self.virtual_hosted_style = enabled;
        self
    }

    /// Set the STS endpoint override.
    #[must_use]
    pub fn with_sts_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.sts_endpoint = Some(endpoint.into());
        self
    }

    /// Set the STS region override.
    #[must_use]
    pub fn with_sts_region(mut self, region: impl Into<String>) -> Self {
        self.sts_region = Some(region.into());
        self
    }

    /// Returns the effective number of STS attempts, at least one.
    pub fn effective_sts_max_attempts(&self) -> u32 {
        match self.sts_max_attempts {
            0 => DEFAULT_STS_MAX_ATTEMPTS,
            n => n,
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an unparsable STS endpoint or an
    /// empty STS region override.
    pub fn validate(&self) -> Result<()> {
        if let Some(endpoint) = &self.sts_endpoint {
            url::Url::parse(endpoint).map_err(|e| {
                Error::configuration(format!("Invalid STS endpoint '{endpoint}'")).with_source(e)
            })?;
        }

        if self
            .sts_region
            .as_deref()
            .is_some_and(|region| region.trim().is_empty())
        {
            return Err(Error::configuration("STS region override cannot be empty"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = S3ConnectorConfig::default();
        assert!(!config.virtual_hosted_style);
        assert_eq!(config.effective_sts_max_attempts(), DEFAULT_STS_MAX_ATTEMPTS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let bad_endpoint = S3ConnectorConfig::default().with_sts_endpoint("sts.example.com");
        assert!(bad_endpoint.validate().is_err());

        let good_endpoint =
            S3ConnectorConfig::default().with_sts_endpoint("https://sts.us-west-2.amazonaws.com");
        assert!(good_endpoint.validate().is_ok());

        let empty_region = S3ConnectorConfig::default().with_sts_region("");
        assert!(empty_region.validate().is_err());
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: S3ConnectorConfig =
            serde_json::from_value(serde_json::json!({ "virtual_hosted_style": true })).unwrap();
        assert!(config.virtual_hosted_style);
        assert_eq!(config.sts_max_attempts, DEFAULT_STS_MAX_ATTEMPTS);
    }
}
