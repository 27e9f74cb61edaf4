//! Default TOS client factory.

use std::sync::Arc;

use reqwest::Client;
use tollgate_core::{ClientOptions, Connector, PresignSigner, Result, StsClient};

use crate::presign::TosPresigner;
use crate::sts::VolcStsClient;
use crate::{TRACING_TARGET_CONNECTOR, TosConnectorConfig};

/// Builds TOS SDK presigners and Volcengine STS clients.
///
/// Each call gets its own signer or STS client holding that call's keys. The
/// STS HTTP connection pool is the only state kept between calls.
///
/// # Examples
///
/// ```rust,ignore
/// use tollgate_tos::{TosConnector, TosConnectorConfig};
///
/// let connector = TosConnector::new(TosConnectorConfig::default())?;
/// ```
#[derive(Clone)]
pub struct TosConnector {
    http: Client,
    config: Arc<TosConnectorConfig>,
}

impl std::fmt::Debug for TosConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TosConnector")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TosConnector {
    /// Creates a connector with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` is invalid or the HTTP
    /// client cannot be initialized.
    pub fn new(config: TosConnectorConfig) -> Result<Self> {
        config.validate()?;

        let timeout = config.effective_timeout();
        let user_agent = config.effective_user_agent();

        tracing::debug!(
            target: TRACING_TARGET_CONNECTOR,
            sts_endpoint = %config.sts_endpoint,
            timeout_ms = timeout.as_millis(),
            "Creating TOS connector"
        );

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| {
                tollgate_core::Error::configuration("Failed to create HTTP client").with_source(e)
            })?;

        Ok(Self {
            http,
            config: Arc::new(config),
        })
    }

    /// Gets the connector configuration.
    pub fn config(&self) -> &TosConnectorConfig {
        &self.config
    }
}

impl Connector for TosConnector {
    fn signer(&self, options: &ClientOptions) -> Result<Box<dyn PresignSigner>> {
        let signer = TosPresigner::new(options.clone(), &self.config.url_scheme)?;
        Ok(Box::new(signer))
    }

    fn sts(&self, options: &ClientOptions) -> Result<Box<dyn StsClient>> {
        let client = VolcStsClient::new(self.http.clone(), self.config.clone(), options.clone());
        Ok(Box::new(client))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tollgate_core::PresignRequest;

    use super::*;

    fn options() -> ClientOptions {
        ClientOptions {
            region: "cn-beijing".into(),
            endpoint: "tos-cn-beijing.ivolces.com".into(),
            access_key: "AKLTEXAMPLE".into(),
            secret_key: "c2VjcmV0".into(),
        }
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = TosConnectorConfig::default().with_sts_endpoint("::");
        assert!(TosConnector::new(config).is_err());
    }

    #[tokio::test]
    async fn test_signer_presigns_through_sdk() {
        let connector = TosConnector::new(TosConnectorConfig::default()).unwrap();
        let signer = connector.signer(&options()).unwrap();

        let request = PresignRequest::put("b", "path/obj.txt", Duration::from_secs(3600));
        let url = signer.presign(&request).await.unwrap();
        assert_eq!(url.host_str(), Some("b.tos-cn-beijing.ivolces.com"));
        assert!(url.as_str().contains("X-Tos-Signature="));
    }

    #[test]
    fn test_signer_rejects_endpoint_with_path() {
        let connector = TosConnector::new(TosConnectorConfig::default()).unwrap();
        let options = ClientOptions {
            endpoint: "tos-cn-beijing.ivolces.com/bucket".into(),
            ..options()
        };
        assert!(connector.signer(&options).is_err());
    }

    #[test]
    fn test_sts_client_per_call() {
        let connector = TosConnector::new(TosConnectorConfig::default()).unwrap();
        assert!(connector.sts(&options()).is_ok());
        assert!(connector.sts(&options()).is_ok());
    }
}
