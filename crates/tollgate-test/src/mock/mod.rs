//! Mock implementations of the connector, signer and STS client seams.
//!
//! The mocks never touch the network. URLs are derived from the request so
//! tests can assert on bucket, key, method and expiry, and every issued
//! credential carries a fresh session token.

mod behavior;
mod connector;

pub use behavior::MockBehavior;
pub use connector::{MockConnector, MockRecord};
