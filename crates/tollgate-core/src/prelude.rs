//! Convenience re-exports for implementing and using remotes.

pub use crate::client::{ClientOptions, Connector, PresignSigner, StsClient};
pub use crate::{
    BackendKind, Error, ErrorKind, ObjectInfo, Remote, RemoteConfig, Result, TemporaryCredential,
};
