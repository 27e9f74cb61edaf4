//! The capability contract every storage-backend adapter implements.

use std::time::Duration;

use async_trait::async_trait;

use crate::client::{AssumeRoleRequest, PresignRequest};
use crate::{Error, ObjectInfo, RemoteConfig, Result, TemporaryCredential, naming};

/// Brokers ephemeral access to one storage target.
///
/// The two operations fail differently on purpose. URL issuance is best
/// effort: [`presigned_url`](Remote::presigned_url) logs any failure and
/// returns `None`. Credential issuance is required for the caller to make
/// progress, so [`sts_token`](Remote::sts_token) returns a descriptive error.
///
/// # Examples
///
/// ```rust,ignore
/// use tollgate_core::Remote;
///
/// let url = remote.presigned_url_or_empty("loads/part-0.csv").await;
/// if url.is_empty() {
///     // fall back to uploading through the engine
/// }
///
/// let credential = remote.sts_token().await?;
/// ```
#[async_trait]
pub trait Remote: Send + Sync {
    /// Returns the storage target this remote brokers access to.
    fn object_info(&self) -> &ObjectInfo;

    /// Returns the policy this remote was built with.
    fn config(&self) -> &RemoteConfig;

    /// Issues a URL authorizing a PUT of `object_key`.
    ///
    /// Returns `None` when no URL could be obtained; the failure is logged.
    async fn presigned_url(&self, object_key: &str) -> Option<String>;

    /// Assumes the configured role and returns temporary credentials.
    ///
    /// # Errors
    ///
    /// Returns an error carrying the provider's reason when no role is
    /// configured, the client cannot be built or the exchange fails.
    async fn sts_token(&self) -> Result<TemporaryCredential>;

    /// Same as [`presigned_url`](Remote::presigned_url), with an empty string
    /// standing for "could not obtain URL".
    async fn presigned_url_or_empty(&self, object_key: &str) -> String {
        self.presigned_url(object_key).await.unwrap_or_default()
    }

    /// Makes `name` a backend-agnostic key under the configured prefix.
    fn normalize_prefix(&self, name: &str) -> String {
        naming::normalize_key(self.object_info().prefix(), name)
    }

    /// Generates a unique session name for the next assume-role call.
    fn new_role_session_name(&self) -> String {
        naming::new_role_session_name(self.config().session_prefix())
    }

    /// Lifetime requested for assumed-role credentials, in seconds.
    fn duration_seconds(&self) -> u32 {
        u32::try_from(self.config().sts_duration().as_secs()).unwrap_or(u32::MAX)
    }

    /// Builds the PUT request for `object_key`.
    fn presign_request(&self, object_key: &str) -> PresignRequest {
        PresignRequest::put(
            self.object_info().bucket(),
            self.normalize_prefix(object_key),
            self.config().presign_expiry(),
        )
    }

    /// Builds the assume-role request for the configured role.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the storage target has no role.
    fn assume_role_request(&self) -> Result<AssumeRoleRequest> {
        let role_arn = self.object_info().role_arn().ok_or_else(|| {
            Error::configuration(format!(
                "no role configured for bucket '{}', cannot issue STS token",
                self.object_info().bucket()
            ))
        })?;

        Ok(AssumeRoleRequest {
            role_arn: role_arn.to_string(),
            session_name: self.new_role_session_name(),
            duration: Duration::from_secs(u64::from(self.duration_seconds())),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{BackendKind, HttpMethod};

    struct FixedRemote {
        info: Arc<ObjectInfo>,
        config: RemoteConfig,
        url: Option<String>,
    }

    #[async_trait]
    impl Remote for FixedRemote {
        fn object_info(&self) -> &ObjectInfo {
            &self.info
        }

        fn config(&self) -> &RemoteConfig {
            &self.config
        }

        async fn presigned_url(&self, _object_key: &str) -> Option<String> {
            self.url.clone()
        }

        async fn sts_token(&self) -> Result<TemporaryCredential> {
            TemporaryCredential::new("ak", "sk", "token")
        }
    }

    fn remote(role: Option<&str>, prefix: Option<&str>, url: Option<&str>) -> FixedRemote {
        let mut builder = ObjectInfo::builder()
            .with_backend(BackendKind::Tos)
            .with_region("cn-beijing")
            .with_endpoint("tos-cn-beijing.ivolces.com")
            .with_bucket("b")
            .with_access_key("ak")
            .with_secret_key("sk");
        if let Some(role) = role {
            builder = builder.with_role_arn(role);
        }
        if let Some(prefix) = prefix {
            builder = builder.with_prefix(prefix);
        }

        FixedRemote {
            info: Arc::new(builder.build().unwrap()),
            config: RemoteConfig::default(),
            url: url.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_empty_sentinel() {
        let failing = remote(None, None, None);
        assert_eq!(failing.presigned_url_or_empty("k").await, "");

        let working = remote(None, None, Some("https://b.example.com/k"));
        assert_eq!(
            working.presigned_url_or_empty("k").await,
            "https://b.example.com/k"
        );
    }

    #[test]
    fn test_presign_request_uses_normalized_key() {
        let remote = remote(None, Some("stage"), None);
        let request = remote.presign_request("/path/obj.txt");

        assert_eq!(request.bucket, "b");
        assert_eq!(request.key, "stage/path/obj.txt");
        assert_eq!(request.method, HttpMethod::Put);
        assert_eq!(request.expires, Duration::from_secs(3600));
    }

    #[test]
    fn test_default_duration() {
        let remote = remote(None, None, None);
        assert_eq!(remote.duration_seconds(), 3600);
    }

    #[test]
    fn test_assume_role_request_requires_role() {
        let err = remote(None, None, None).assume_role_request().unwrap_err();
        assert_eq!(err.kind, crate::ErrorKind::Configuration);

        let request = remote(Some("trn:iam::1:role/r"), None, None)
            .assume_role_request()
            .unwrap();
        assert_eq!(request.role_arn, "trn:iam::1:role/r");
        assert_eq!(request.duration, Duration::from_secs(3600));
        assert!(request.session_name.starts_with("tollgate-"));
    }
}
