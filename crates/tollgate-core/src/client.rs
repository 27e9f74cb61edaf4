//! Signer and STS client seams.
//!
//! Backend adapters never sign or talk to an STS endpoint themselves. They
//! ask a [`Connector`] for a transient [`PresignSigner`] or [`StsClient`]
//! built from the credentials of one call, issue a single request and drop
//! the client again. Nothing here is shared between calls, so concurrent
//! callers with different credentials cannot observe each other.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};
use url::Url;

use crate::credential::masked;
use crate::{ObjectInfo, Result, TemporaryCredential};

/// HTTP method a presigned URL is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
#[derive(Serialize, Deserialize)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    #[default]
    Put,
    Head,
    Delete,
    Post,
}

impl HttpMethod {
    /// Returns the method as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// Connection parameters for one transient client.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// Provider region.
    pub region: String,
    /// Endpoint the client talks to, after any provider-specific rewriting.
    pub endpoint: String,
    /// Long-lived access key.
    pub access_key: String,
    /// Long-lived secret key.
    pub secret_key: String,
}

impl ClientOptions {
    /// Copies the connection parameters out of an [`ObjectInfo`].
    pub fn from_object_info(info: &ObjectInfo) -> Self {
        Self {
            region: info.region().to_string(),
            endpoint: info.endpoint().to_string(),
            access_key: info.access_key().to_string(),
            secret_key: info.secret_key().to_string(),
        }
    }

    /// Replaces the endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Returns a masked version of the access key for logging.
    pub fn access_key_masked(&self) -> String {
        masked(&self.access_key)
    }
}

impl std::fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientOptions")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("access_key", &self.access_key_masked())
            .finish_non_exhaustive()
    }
}

/// A request for one presigned URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresignRequest {
    /// Bucket holding the object.
    pub bucket: String,
    /// Normalized object key.
    pub key: String,
    /// Method the URL authorizes.
    pub method: HttpMethod,
    /// How long the URL stays valid.
    pub expires: Duration,
}

impl PresignRequest {
    /// Creates a PUT request valid for `expires`.
    pub fn put(bucket: impl Into<String>, key: impl Into<String>, expires: Duration) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            method: HttpMethod::Put,
            expires,
        }
    }

    /// Sets the method.
    #[must_use]
    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }
}

/// A request to exchange long-lived keys for role credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssumeRoleRequest {
    /// Role to assume (ARN on AWS, TRN on Volcengine).
    pub role_arn: String,
    /// Session name recorded by the provider for auditing.
    pub session_name: String,
    /// Requested credential lifetime.
    pub duration: Duration,
}

/// Signs and issues presigned URLs.
#[async_trait]
pub trait PresignSigner: Send + Sync {
    /// Returns a URL authorizing `request.method` on `request.key`.
    async fn presign(&self, request: &PresignRequest) -> Result<Url>;
}

/// Performs the assume-role exchange.
#[async_trait]
pub trait StsClient: Send + Sync {
    /// Assumes `request.role_arn` and returns the issued credentials.
    async fn assume_role(&self, request: &AssumeRoleRequest) -> Result<TemporaryCredential>;
}

/// Builds one transient client per call.
///
/// Implement this trait to plug a provider SDK (or a test double) into a
/// backend adapter.
pub trait Connector: Send + Sync + 'static {
    /// Builds a signer for one presign call.
    fn signer(&self, options: &ClientOptions) -> Result<Box<dyn PresignSigner>>;

    /// Builds an STS client for one assume-role call.
    fn sts(&self, options: &ClientOptions) -> Result<Box<dyn StsClient>>;
}
