#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// Tracing target constants for consistent logging
pub const TRACING_TARGET_CONFIG: &str = "tollgate_core::config";
pub const TRACING_TARGET_PRESIGN: &str = "tollgate_core::presign";
pub const TRACING_TARGET_STS: &str = "tollgate_core::sts";

pub mod broker;
pub mod client;
mod config;
mod credential;
mod error;
pub mod naming;
mod object_info;
mod remote;

#[doc(hidden)]
pub mod prelude;

pub use crate::client::{
    AssumeRoleRequest, ClientOptions, Connector, HttpMethod, PresignRequest, PresignSigner,
    StsClient,
};
pub use crate::config::{
    DEFAULT_CALL_TIMEOUT, DEFAULT_PRESIGN_EXPIRY, DEFAULT_SESSION_PREFIX, DEFAULT_STS_DURATION,
    MAX_PRESIGN_EXPIRY, MAX_STS_DURATION, MIN_STS_DURATION, RemoteConfig, clamp_sts_duration,
};
pub use crate::credential::{TemporaryCredential, masked};
pub use crate::error::{BoxedError, Error, ErrorKind, Result};
pub use crate::object_info::{BackendKind, ObjectInfo, ObjectInfoBuilder};
pub use crate::remote::Remote;
