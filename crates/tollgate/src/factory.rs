//! Backend selection.

use std::sync::Arc;

use tollgate_core::{BackendKind, Connector, ObjectInfo, RemoteConfig, Result};
use tollgate_s3::{S3Connector, S3Remote};
use tollgate_tos::{TosConnector, TosRemote};

use crate::{AnyRemote, TRACING_TARGET_FACTORY, TollgateConfig};

/// Creates remotes for storage targets of any supported backend.
///
/// Holds one [`Connector`] per backend and the [`RemoteConfig`] every remote
/// it creates is built with. The factory itself is immutable and can be
/// shared freely.
///
/// # Examples
///
/// ```rust,ignore
/// use tollgate::{RemoteFactory, RemoteConfig};
///
/// let factory = RemoteFactory::with_default_connectors(RemoteConfig::default())?;
/// let remote = factory.remote(info)?;
/// ```
#[derive(Clone)]
pub struct RemoteFactory {
    tos: Arc<dyn Connector>,
    s3: Arc<dyn Connector>,
    config: RemoteConfig,
}

impl std::fmt::Debug for RemoteFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteFactory")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RemoteFactory {
    /// Creates a factory using `connector` for every backend.
    pub fn new(connector: Arc<dyn Connector>, config: RemoteConfig) -> Self {
        Self {
            tos: connector.clone(),
            s3: connector,
            config,
        }
    }

    /// Creates a factory with the default TOS and S3 connectors.
    ///
    /// # Errors
    ///
    /// Returns an error if a default connector cannot be created.
    pub fn with_default_connectors(config: RemoteConfig) -> Result<Self> {
        Self::from_config(TollgateConfig {
            remote: config,
            ..TollgateConfig::default()
        })
    }

    /// Creates a factory with default connectors configured by `config`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if any section of `config` is invalid.
    pub fn from_config(config: TollgateConfig) -> Result<Self> {
        config.validate()?;

        let tos = TosConnector::new(config.tos)?;
        let s3 = S3Connector::new(config.s3)?;

        tracing::debug!(
            target: TRACING_TARGET_FACTORY,
            presign_expiry = ?config.remote.presign_expiry(),
            sts_duration = ?config.remote.sts_duration(),
            "Created remote factory with default connectors"
        );

        Ok(Self {
            tos: Arc::new(tos),
            s3: Arc::new(s3),
            config: config.remote,
        })
    }

    /// Replaces the connector used for `backend`.
    #[must_use]
    pub fn with_connector(mut self, backend: BackendKind, connector: Arc<dyn Connector>) -> Self {
        match backend {
            BackendKind::Tos => self.tos = connector,
            BackendKind::S3 => self.s3 = connector,
        }
        self
    }

    /// Returns the policy remotes are built with.
    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    /// Creates the remote matching the backend of `info`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the remote policy is invalid.
    pub fn remote(&self, info: impl Into<Arc<ObjectInfo>>) -> Result<AnyRemote> {
        let info = info.into();
        let remote: AnyRemote = match info.backend() {
            BackendKind::Tos => {
                TosRemote::new(info, self.config.clone(), self.tos.clone())?.into()
            }
            BackendKind::S3 => S3Remote::new(info, self.config.clone(), self.s3.clone())?.into(),
        };
        Ok(remote)
    }
}
