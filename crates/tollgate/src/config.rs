//! Complete broker configuration.

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use tollgate_core::{RemoteConfig, Result};
use tollgate_s3::S3ConnectorConfig;
use tollgate_tos::TosConnectorConfig;

/// Complete broker configuration.
///
/// Combines the policy shared by every remote with the settings of the
/// default connectors. This is the configuration passed to
/// [`RemoteFactory::from_config`](crate::RemoteFactory::from_config).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct TollgateConfig {
    /// Policy shared by every remote.
    #[cfg_attr(feature = "config", command(flatten))]
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Default TOS connector settings.
    #[cfg_attr(feature = "config", command(flatten))]
    #[serde(default)]
    pub tos: TosConnectorConfig,

    /// Default S3 connector settings.
    #[cfg_attr(feature = "config", command(flatten))]
    #[serde(default)]
    pub s3: S3ConnectorConfig,
}

impl TollgateConfig {
    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns the first configuration error found.
    pub fn validate(&self) -> Result<()> {
        self.remote.validate()?;
        self.tos.validate()?;
        self.s3.validate()
    }
}
