#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// Tracing target constants for consistent logging
pub const TRACING_TARGET_CONNECTOR: &str = "tollgate_s3::connector";
pub const TRACING_TARGET_REMOTE: &str = "tollgate_s3::remote";
pub const TRACING_TARGET_STS: &str = "tollgate_s3::sts";

mod config;
mod connector;
mod error;
mod presign;
mod remote;
mod sts;

pub use crate::config::{DEFAULT_STS_MAX_ATTEMPTS, S3ConnectorConfig};
pub use crate::connector::S3Connector;
pub use crate::error::Error;
pub use crate::presign::S3Presigner;
pub use crate::remote::S3Remote;
pub use crate::sts::AwsStsClient;
