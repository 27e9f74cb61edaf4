//! The TOS [`Remote`] implementation.

use std::sync::Arc;

use async_trait::async_trait;
use tollgate_core::{
    BackendKind, ClientOptions, Connector, Error, ObjectInfo, Remote, RemoteConfig, Result,
    TemporaryCredential, broker,
};

use crate::endpoint::canonical_endpoint;
use crate::{TRACING_TARGET_REMOTE, TosConnector, TosConnectorConfig};

/// Brokers presigned URLs and STS credentials for one TOS bucket.
///
/// Cloning is cheap; clones share the storage target and the connector.
///
/// # Examples
///
/// ```rust,ignore
/// use tollgate_core::{Remote, RemoteConfig};
/// use tollgate_tos::TosRemote;
///
/// let remote = TosRemote::with_default_connector(info, RemoteConfig::default())?;
/// let url = remote.presigned_url("path/obj.txt").await;
/// ```
#[derive(Clone)]
pub struct TosRemote {
    info: Arc<ObjectInfo>,
    config: RemoteConfig,
    connector: Arc<dyn Connector>,
}

impl std::fmt::Debug for TosRemote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TosRemote")
            .field("info", &self.info)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TosRemote {
    /// Creates a remote for `info` that obtains its clients from `connector`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `info` does not describe a TOS
    /// target or `config` is invalid.
    pub fn new(
        info: impl Into<Arc<ObjectInfo>>,
        config: RemoteConfig,
        connector: Arc<dyn Connector>,
    ) -> Result<Self> {
        let info = info.into();
        if info.backend() != BackendKind::Tos {
            return Err(Error::configuration(format!(
                "bucket '{}' is a {} target, not tos",
                info.bucket(),
                info.backend()
            )));
        }
        config.validate()?;

        tracing::debug!(
            target: TRACING_TARGET_REMOTE,
            bucket = %info.bucket(),
            endpoint = %info.endpoint(),
            region = %info.region(),
            "Created TOS remote"
        );

        Ok(Self {
            info,
            config,
            connector,
        })
    }

    /// Creates a remote backed by a [`TosConnector`] with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote or the connector cannot be created.
    pub fn with_default_connector(
        info: impl Into<Arc<ObjectInfo>>,
        config: RemoteConfig,
    ) -> Result<Self> {
        let connector = TosConnector::new(TosConnectorConfig::default())?;
        Self::new(info, config, Arc::new(connector))
    }

    /// Connection parameters for presigning, against the native endpoint.
    fn presign_options(&self) -> ClientOptions {
        let endpoint = canonical_endpoint(self.info.endpoint());
        ClientOptions::from_object_info(&self.info).with_endpoint(endpoint)
    }
}

#[async_trait]
impl Remote for TosRemote {
    fn object_info(&self) -> &ObjectInfo {
        &self.info
    }

    fn config(&self) -> &RemoteConfig {
        &self.config
    }

    #[tracing::instrument(
        skip_all,
        target = TRACING_TARGET_REMOTE,
        fields(backend = "tos", bucket = %self.info.bucket())
    )]
    async fn presigned_url(&self, object_key: &str) -> Option<String> {
        let options = self.presign_options();
        let request = self.presign_request(object_key);

        broker::issue_presigned_url(
            self.connector.as_ref(),
            &options,
            &request,
            self.config.call_timeout(),
        )
        .await
    }

    #[tracing::instrument(
        skip_all,
        target = TRACING_TARGET_REMOTE,
        fields(backend = "tos", bucket = %self.info.bucket())
    )]
    async fn sts_token(&self) -> Result<TemporaryCredential> {
        let request = self.assume_role_request().inspect_err(|e| {
            tracing::error!(target: TRACING_TARGET_REMOTE, error = %e, "Cannot assume role");
        })?;
        let options = ClientOptions::from_object_info(&self.info);

        broker::issue_sts_token(
            self.connector.as_ref(),
            &options,
            &request,
            self.config.call_timeout(),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tollgate_core::{ErrorKind, HttpMethod};
    use tollgate_test::{MockBehavior, MockConnector};

    use super::*;

    const ROLE: &str = "trn:iam::2100000000:role/loader";

    fn info(endpoint: &str, role: Option<&str>) -> ObjectInfo {
        let builder = ObjectInfo::builder()
            .with_backend(BackendKind::Tos)
            .with_region("cn-beijing")
            .with_endpoint(endpoint)
            .with_bucket("b")
            .with_access_key("AKLTEXAMPLE")
            .with_secret_key("c2VjcmV0");
        match role {
            Some(role) => builder.with_role_arn(role).build().unwrap(),
            None => builder.build().unwrap(),
        }
    }

    fn remote(connector: &MockConnector, role: Option<&str>) -> TosRemote {
        TosRemote::new(
            info("tos-s3-cn-beijing.ivolces.com", role),
            RemoteConfig::default(),
            Arc::new(connector.clone()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_presign_targets_native_endpoint() {
        let connector = MockConnector::new();
        let remote = remote(&connector, None);

        let url = remote.presigned_url("path/obj.txt").await.unwrap();
        let url = url::Url::parse(&url).unwrap();
        assert_eq!(url.host_str(), Some("b.tos-cn-beijing.ivolces.com"));
        assert_eq!(url.path(), "/path/obj.txt");

        let record = connector.record();
        assert_eq!(record.signer_options.len(), 1);
        assert_eq!(record.signer_options[0].endpoint, "tos-cn-beijing.ivolces.com");
        assert_eq!(record.signer_options[0].region, "cn-beijing");

        let request = &record.presign_requests[0];
        assert_eq!(request.method, HttpMethod::Put);
        assert_eq!(request.bucket, "b");
        assert_eq!(request.key, "path/obj.txt");
        assert_eq!(request.expires, Duration::from_secs(3600));
    }

    #[tokio::test]
    async fn test_native_endpoint_is_kept() {
        let connector = MockConnector::new();
        let remote = TosRemote::new(
            info("tos-cn-beijing.ivolces.com", None),
            RemoteConfig::default(),
            Arc::new(connector.clone()),
        )
        .unwrap();

        assert!(remote.presigned_url("k").await.is_some());
        assert_eq!(
            connector.record().signer_options[0].endpoint,
            "tos-cn-beijing.ivolces.com"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_presign_failures_yield_empty_url() {
        let behaviors = [
            MockBehavior::reject("signature mismatch"),
            MockBehavior::fail("service down"),
            MockBehavior::Delay(Duration::from_secs(3600)),
            MockBehavior::Panic,
        ];

        for behavior in behaviors {
            let connector = MockConnector::new().with_presign(behavior);
            let remote = remote(&connector, None);
            assert!(remote.presigned_url("path/obj.txt").await.is_none());
            assert_eq!(remote.presigned_url_or_empty("path/obj.txt").await, "");
        }

        let connector = MockConnector::new().failing_to_build(ErrorKind::Configuration);
        assert!(remote(&connector, None).presigned_url("k").await.is_none());
    }

    #[tokio::test]
    async fn test_keys_naming_no_object_yield_empty_url() {
        let connector = MockConnector::new();
        let remote = remote(&connector, None);

        for key in ["", "/", "///"] {
            assert!(remote.presigned_url(key).await.is_none());
            assert_eq!(remote.presigned_url_or_empty(key).await, "");
        }
        assert!(connector.record().signer_options.is_empty());

        let sdk_backed = TosRemote::with_default_connector(
            info("tos-s3-cn-beijing.ivolces.com", None),
            RemoteConfig::default(),
        )
        .unwrap();
        for key in ["", "/", "///"] {
            assert!(sdk_backed.presigned_url(key).await.is_none());
        }
    }

    #[tokio::test]
    async fn test_sts_token_uses_original_endpoint_and_role() {
        let connector = MockConnector::new();
        let remote = remote(&connector, Some(ROLE));

        let credential = remote.sts_token().await.unwrap();
        assert!(!credential.access_key_id().is_empty());
        assert!(!credential.secret_access_key().is_empty());
        assert!(!credential.session_token().is_empty());

        let record = connector.record();
        assert_eq!(record.sts_options[0].endpoint, "tos-s3-cn-beijing.ivolces.com");
        assert_eq!(record.sts_options[0].access_key, "AKLTEXAMPLE");

        let request = &record.assume_role_requests[0];
        assert_eq!(request.role_arn, ROLE);
        assert_eq!(request.duration, Duration::from_secs(3600));
        assert!(request.session_name.starts_with("tollgate-"));
    }

    #[tokio::test]
    async fn test_sts_tokens_are_distinct() {
        let connector = MockConnector::new();
        let remote = remote(&connector, Some(ROLE));

        let first = remote.sts_token().await.unwrap();
        let second = remote.sts_token().await.unwrap();
        assert_ne!(first.session_token(), second.session_token());

        let record = connector.record();
        assert_eq!(record.sts_options.len(), 2);
        assert_ne!(
            record.assume_role_requests[0].session_name,
            record.assume_role_requests[1].session_name
        );
    }

    #[tokio::test]
    async fn test_untrusted_role_reports_reason() {
        let connector = MockConnector::new().with_sts(MockBehavior::reject("role does not trust caller"));
        let remote = remote(&connector, Some(ROLE));

        let err = remote.sts_token().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
        let message = err.to_string();
        assert!(message.contains("role does not trust caller"));
        assert!(message.contains(ROLE));
    }

    #[tokio::test]
    async fn test_sts_without_role_fails_before_connecting() {
        let connector = MockConnector::new();
        let remote = remote(&connector, None);

        let err = remote.sts_token().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
        assert!(connector.record().sts_options.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_calls_are_isolated() {
        let connector = MockConnector::new();
        let remote = remote(&connector, Some(ROLE));

        let (a, b, c) = tokio::join!(remote.sts_token(), remote.sts_token(), remote.sts_token());
        let mut tokens = vec![
            a.unwrap().session_token().to_string(),
            b.unwrap().session_token().to_string(),
            c.unwrap().session_token().to_string(),
        ];
        tokens.sort();
        tokens.dedup();
        assert_eq!(tokens.len(), 3);
        assert_eq!(connector.record().sts_options.len(), 3);
    }

    #[test]
    fn test_rejects_s3_target() {
        let s3 = ObjectInfo::builder()
            .with_backend(BackendKind::S3)
            .with_endpoint("s3.us-east-1.amazonaws.com")
            .with_bucket("b")
            .with_access_key("ak")
            .with_secret_key("sk")
            .build()
            .unwrap();

        let err = TosRemote::new(s3, RemoteConfig::default(), Arc::new(MockConnector::new()))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }
}
