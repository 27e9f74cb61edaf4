//! Default S3 client factory.

use std::sync::Arc;

use tollgate_core::{ClientOptions, Connector, PresignSigner, Result, StsClient};

use crate::presign::S3Presigner;
use crate::sts::AwsStsClient;
use crate::{S3ConnectorConfig, TRACING_TARGET_CONNECTOR};

/// Builds `object_store` presigners and `aws-sdk-sts` clients.
///
/// Nothing is cached: every call constructs its own client from the keys in
/// its [`ClientOptions`].
#[derive(Debug, Clone, Default)]
pub struct S3Connector {
    config: Arc<S3ConnectorConfig>,
}

impl S3Connector {
    /// Creates a connector with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` is invalid.
    pub fn new(config: S3ConnectorConfig) -> Result<Self> {
        config.validate()?;

        tracing::debug!(
            target: TRACING_TARGET_CONNECTOR,
            virtual_hosted_style = config.virtual_hosted_style,
            sts_endpoint = ?config.sts_endpoint,
            "Creating S3 connector"
        );

        Ok(Self {
            config: Arc::new(config),
        })
    }

    /// Gets the connector configuration.
    pub fn config(&self) -> &S3ConnectorConfig {
        &self.config
    }
}

impl Connector for S3Connector {
    fn signer(&self, options: &ClientOptions) -> Result<Box<dyn PresignSigner>> {
        Ok(Box::new(S3Presigner::new(options.clone(), self.config.clone())))
    }

    fn sts(&self, options: &ClientOptions) -> Result<Box<dyn StsClient>> {
        Ok(Box::new(AwsStsClient::new(options, &self.config)))
    }
}
