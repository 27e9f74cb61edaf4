#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// Tracing target constants for consistent logging
pub const TRACING_TARGET_CONNECTOR: &str = "tollgate_tos::connector";
pub const TRACING_TARGET_REMOTE: &str = "tollgate_tos::remote";
pub const TRACING_TARGET_STS: &str = "tollgate_tos::sts";

mod config;
mod connector;
mod endpoint;
mod error;
mod presign;
mod remote;
mod sts;

pub use crate::config::{
    DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_STS_ENDPOINT, DEFAULT_STS_REGION, DEFAULT_STS_VERSION,
    TosConnectorConfig,
};
pub use crate::connector::TosConnector;
pub use crate::endpoint::{S3_COMPAT_MARKER, canonical_endpoint};
pub use crate::error::Error;
pub use crate::presign::{MAX_PRESIGN_EXPIRES_SECS, TosPresigner};
pub use crate::remote::TosRemote;
pub use crate::sts::VolcStsClient;
