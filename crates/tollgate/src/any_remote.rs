//! Backend-polymorphic remote.

use async_trait::async_trait;
use tollgate_core::{BackendKind, ObjectInfo, Remote, RemoteConfig, Result, TemporaryCredential};
use tollgate_s3::S3Remote;
use tollgate_tos::TosRemote;

/// A remote for any supported backend.
///
/// Implements [`Remote`] by delegating to the wrapped adapter, so callers can
/// hold remotes for different backends behind one concrete type.
#[derive(Debug, Clone)]
pub enum AnyRemote {
    /// Volcengine TOS.
    Tos(TosRemote),
    /// AWS S3.
    S3(S3Remote),
}

impl AnyRemote {
    /// Returns the backend this remote talks to.
    pub fn backend(&self) -> BackendKind {
        match self {
            Self::Tos(_) => BackendKind::Tos,
            Self::S3(_) => BackendKind::S3,
        }
    }

    fn as_remote(&self) -> &dyn Remote {
        match self {
            Self::Tos(remote) => remote,
            Self::S3(remote) => remote,
        }
    }
}

impl From<TosRemote> for AnyRemote {
    fn from(remote: TosRemote) -> Self {
        Self::Tos(remote)
    }
}

impl From<S3Remote> for AnyRemote {
    fn from(remote: S3Remote) -> Self {
        Self::S3(remote)
    }
}

#[async_trait]
impl Remote for AnyRemote {
    fn object_info(&self) -> &ObjectInfo {
        self.as_remote().object_info()
    }

    fn config(&self) -> &RemoteConfig {
        self.as_remote().config()
    }

    async fn presigned_url(&self, object_key: &str) -> Option<String> {
        self.as_remote().presigned_url(object_key).await
    }

    async fn sts_token(&self) -> Result<TemporaryCredential> {
        self.as_remote().sts_token().await
    }
}
