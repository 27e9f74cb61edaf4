//! Storage target descriptor.
//!
//! An [`ObjectInfo`] names one logical storage target: which backend serves
//! it, where it lives and which long-lived keys may act on it. It is built
//! once (usually by a configuration loader) and then only read.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

use crate::credential::masked;
use crate::{Error, Result};

/// Storage provider serving an [`ObjectInfo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
#[derive(Serialize, Deserialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Volcengine TOS.
    Tos,
    /// Amazon S3 and S3-compatible services.
    S3,
}

/// Immutable description of a storage target and its access credentials.
///
/// Construct it with [`ObjectInfo::builder`]; the builder rejects missing or
/// empty access keys, so every instance carries a usable key pair.
#[derive(Clone, Builder, Serialize, Deserialize)]
#[builder(
    name = "ObjectInfoBuilder",
    pattern = "owned",
    setter(into, prefix = "with"),
    build_fn(validate = "Self::validate", error = "Error")
)]
#[serde(rename_all = "camelCase", try_from = "ObjectInfoRepr")]
pub struct ObjectInfo {
    backend: BackendKind,
    #[builder(default)]
    region: String,
    endpoint: String,
    bucket: String,
    access_key: String,
    #[serde(skip_serializing)]
    secret_key: String,
    #[builder(default, setter(into, strip_option))]
    #[serde(skip_serializing_if = "Option::is_none")]
    role_arn: Option<String>,
    #[builder(default, setter(into, strip_option))]
    #[serde(skip_serializing_if = "Option::is_none")]
    prefix: Option<String>,
}

impl ObjectInfo {
    /// Creates a new builder.
    pub fn builder() -> ObjectInfoBuilder {
        ObjectInfoBuilder::default()
    }

    /// Returns the backend serving this target.
    #[inline]
    pub fn backend(&self) -> BackendKind {
        self.backend
    }

    /// Returns the region. May be empty for backends that infer it.
    #[inline]
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Returns the endpoint exactly as configured.
    #[inline]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns the bucket name.
    #[inline]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Returns the long-lived access key.
    #[inline]
    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    /// Returns the long-lived secret key.
    #[inline]
    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }

    /// Returns the role to assume, if STS issuance is configured.
    #[inline]
    pub fn role_arn(&self) -> Option<&str> {
        self.role_arn.as_deref()
    }

    /// Returns the key prefix all object keys live under, if any.
    #[inline]
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Returns a masked version of the access key for logging.
    pub fn access_key_masked(&self) -> String {
        masked(&self.access_key)
    }
}

impl ObjectInfoBuilder {
    fn validate(&self) -> Result<()> {
        let required = [
            ("endpoint", &self.endpoint),
            ("bucket", &self.bucket),
            ("access key", &self.access_key),
            ("secret key", &self.secret_key),
        ];

        for (name, value) in required {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(Error::configuration(format!("{name} cannot be empty")));
            }
        }

        if let Some(Some(role_arn)) = &self.role_arn
            && role_arn.trim().is_empty()
        {
            return Err(Error::configuration("role ARN cannot be blank when set"));
        }

        Ok(())
    }
}

impl From<derive_builder::UninitializedFieldError> for Error {
    fn from(error: derive_builder::UninitializedFieldError) -> Self {
        Error::configuration(format!("missing object info field `{}`", error.field_name()))
    }
}

impl std::fmt::Debug for ObjectInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectInfo")
            .field("backend", &self.backend)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("bucket", &self.bucket)
            .field("access_key", &self.access_key_masked())
            .field("role_arn", &self.role_arn)
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

/// Wire shape accepted by the `Deserialize` impl; funnels through the builder
/// so deserialized descriptors obey the same invariants.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectInfoRepr {
    backend: BackendKind,
    #[serde(default)]
    region: String,
    endpoint: String,
    bucket: String,
    access_key: String,
    secret_key: String,
    #[serde(default)]
    role_arn: Option<String>,
    #[serde(default)]
    prefix: Option<String>,
}

impl TryFrom<ObjectInfoRepr> for ObjectInfo {
    type Error = Error;

    fn try_from(repr: ObjectInfoRepr) -> Result<Self> {
        let mut builder = ObjectInfo::builder()
            .with_backend(repr.backend)
            .with_region(repr.region)
            .with_endpoint(repr.endpoint)
            .with_bucket(repr.bucket)
            .with_access_key(repr.access_key)
            .with_secret_key(repr.secret_key);

        if let Some(role_arn) = repr.role_arn {
            builder = builder.with_role_arn(role_arn);
        }
        if let Some(prefix) = repr.prefix {
            builder = builder.with_prefix(prefix);
        }

        builder.build()
    }
}
