#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// Tracing target constants for consistent logging
pub const TRACING_TARGET_FACTORY: &str = "tollgate::factory";

mod any_remote;
mod config;
mod factory;

#[doc(hidden)]
pub mod prelude;

pub use tollgate_core::{
    BackendKind, Connector, Error, ErrorKind, ObjectInfo, ObjectInfoBuilder, Remote,
    RemoteConfig, Result, TemporaryCredential,
};
pub use tollgate_s3 as s3;
pub use tollgate_tos as tos;

pub use crate::any_remote::AnyRemote;
pub use crate::config::TollgateConfig;
pub use crate::factory::RemoteFactory;
