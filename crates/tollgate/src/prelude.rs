//! Convenience re-exports of the commonly used types.

pub use crate::{
    AnyRemote, BackendKind, Error, ErrorKind, ObjectInfo, Remote, RemoteConfig, RemoteFactory,
    Result, TemporaryCredential, TollgateConfig,
};
