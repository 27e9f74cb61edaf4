//! Guarded single-shot calls into a [`Connector`].
//!
//! Adapters share these helpers so that every backend applies the same
//! failure policy: presigning never fails the caller, assume-role always
//! reports why it failed. Both bound the external call with a timeout.

use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};

use futures::FutureExt;
use tracing::{debug, error, info};

use crate::client::{AssumeRoleRequest, ClientOptions, Connector, PresignRequest};
use crate::{Error, ErrorKind, Result, TRACING_TARGET_PRESIGN, TRACING_TARGET_STS, TemporaryCredential};

/// Builds a signer from `options` and issues one presigned URL.
///
/// Every failure mode is logged and mapped to `None`: keys that name no
/// object, connector errors, signer errors, timeouts and panics.
pub async fn issue_presigned_url(
    connector: &dyn Connector,
    options: &ClientOptions,
    request: &PresignRequest,
    timeout: Duration,
) -> Option<String> {
    let start = Instant::now();
    let url = presign_once(connector, options, request, timeout).await;

    info!(
        target: TRACING_TARGET_PRESIGN,
        bucket = %request.bucket,
        key = %request.key,
        method = %request.method,
        endpoint = %options.endpoint,
        issued = url.is_some(),
        elapsed = ?start.elapsed(),
        "Presigned URL request finished"
    );

    url
}

async fn presign_once(
    connector: &dyn Connector,
    options: &ClientOptions,
    request: &PresignRequest,
    timeout: Duration,
) -> Option<String> {
    if !names_object(&request.key) {
        error!(
            target: TRACING_TARGET_PRESIGN,
            bucket = %request.bucket,
            key = %request.key,
            "Object key names no object, refusing to presign"
        );
        return None;
    }

    let built = std::panic::catch_unwind(AssertUnwindSafe(|| connector.signer(options)));
    let signer = match built {
        Ok(Ok(signer)) => signer,
        Ok(Err(e)) => {
            error!(
                target: TRACING_TARGET_PRESIGN,
                error = %e,
                endpoint = %options.endpoint,
                "Failed to build presign client"
            );
            return None;
        }
        Err(_) => {
            error!(
                target: TRACING_TARGET_PRESIGN,
                endpoint = %options.endpoint,
                "Presign client construction panicked"
            );
            return None;
        }
    };

    debug!(
        target: TRACING_TARGET_PRESIGN,
        access_key = %options.access_key_masked(),
        expires = ?request.expires,
        "Signing request"
    );

    let call = AssertUnwindSafe(signer.presign(request)).catch_unwind();
    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(Ok(url))) => Some(url.to_string()),
        Ok(Ok(Err(e))) if e.is_client_error() => {
            error!(
                target: TRACING_TARGET_PRESIGN,
                error = %e,
                key = %request.key,
                "Presign request rejected"
            );
            None
        }
        Ok(Ok(Err(e))) => {
            error!(
                target: TRACING_TARGET_PRESIGN,
                error = %e,
                key = %request.key,
                "Unexpected error while presigning"
            );
            None
        }
        Ok(Err(_)) => {
            error!(
                target: TRACING_TARGET_PRESIGN,
                key = %request.key,
                "Signer panicked while presigning"
            );
            None
        }
        Err(_) => {
            error!(
                target: TRACING_TARGET_PRESIGN,
                key = %request.key,
                timeout = ?timeout,
                "Presign call timed out"
            );
            None
        }
    }
}

/// A normalized key names an object when it is non-empty and is not a
/// directory marker.
fn names_object(key: &str) -> bool {
    !key.is_empty() && !key.ends_with('/')
}

/// Builds an STS client from `options` and assumes the requested role.
///
/// # Errors
///
/// Returns an error that keeps the kind of the underlying failure, names the
/// role in its message and carries the original error as its source.
pub async fn issue_sts_token(
    connector: &dyn Connector,
    options: &ClientOptions,
    request: &AssumeRoleRequest,
    timeout: Duration,
) -> Result<TemporaryCredential> {
    let start = Instant::now();
    let result = assume_role_once(connector, options, request, timeout).await;

    match &result {
        Ok(_) => info!(
            target: TRACING_TARGET_STS,
            role = %request.role_arn,
            session = %request.session_name,
            duration = ?request.duration,
            elapsed = ?start.elapsed(),
            "Issued STS token"
        ),
        Err(e) => error!(
            target: TRACING_TARGET_STS,
            role = %request.role_arn,
            session = %request.session_name,
            error = %e,
            elapsed = ?start.elapsed(),
            "Failed to issue STS token"
        ),
    }

    result
}

async fn assume_role_once(
    connector: &dyn Connector,
    options: &ClientOptions,
    request: &AssumeRoleRequest,
    timeout: Duration,
) -> Result<TemporaryCredential> {
    let built = std::panic::catch_unwind(AssertUnwindSafe(|| connector.sts(options)));
    let client = match built {
        Ok(Ok(client)) => client,
        Ok(Err(e)) => {
            return Err(Error::new(e.kind)
                .with_message(format!("failed to build STS client: {e}"))
                .with_source(e));
        }
        Err(_) => {
            return Err(Error::new(ErrorKind::InternalError).with_message(format!(
                "STS client construction panicked before assuming role '{}'",
                request.role_arn
            )));
        }
    };

    debug!(
        target: TRACING_TARGET_STS,
        access_key = %options.access_key_masked(),
        role = %request.role_arn,
        "Assuming role"
    );

    let call = AssertUnwindSafe(client.assume_role(request)).catch_unwind();
    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(Ok(credential))) => Ok(credential),
        Ok(Ok(Err(e))) => Err(Error::new(e.kind)
            .with_message(format!("failed to assume role '{}': {e}", request.role_arn))
            .with_source(e)),
        Ok(Err(_)) => Err(Error::new(ErrorKind::InternalError).with_message(format!(
            "STS client panicked while assuming role '{}'",
            request.role_arn
        ))),
        Err(_) => Err(Error::timeout(timeout).with_message(format!(
            "assuming role '{}' timed out after {timeout:?}",
            request.role_arn
        ))),
    }
}
