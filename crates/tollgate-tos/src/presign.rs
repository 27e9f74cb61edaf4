//! Presigned URLs through the TOS SDK signer.

use async_trait::async_trait;
use tollgate_core::{ClientOptions, Error, ErrorKind, HttpMethod, PresignRequest, PresignSigner, Result};
use url::Url;
use ve_tos_rust_sdk::auth::{PreSignedURLInput, SignerAPI};
use ve_tos_rust_sdk::enumeration::HttpMethodType;
use ve_tos_rust_sdk::tos;

use crate::TRACING_TARGET_CONNECTOR;

/// Longest validity TOS accepts for a query-string signature.
pub const MAX_PRESIGN_EXPIRES_SECS: u64 = 7 * 24 * 3600;

/// Presigns TOS URLs with the SDK's `pre_signed_url`.
///
/// Holds the connection parameters of exactly one call. The SDK client is
/// built when the URL is requested and dropped right after.
pub struct TosPresigner {
    options: ClientOptions,
    endpoint: String,
}

impl std::fmt::Debug for TosPresigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TosPresigner")
            .field("options", &self.options)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl TosPresigner {
    /// Creates a presigner for `options`.
    ///
    /// `default_scheme` applies when the endpoint carries no scheme of its own.
    ///
    /// # Errors
    ///
    /// Returns an invalid input error if the endpoint has no host or carries a
    /// path.
    pub fn new(options: ClientOptions, default_scheme: &str) -> Result<Self> {
        let endpoint = endpoint_url(&options.endpoint, default_scheme)?;
        Ok(Self { options, endpoint })
    }

    /// Endpoint handed to the SDK client, always with a scheme.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Adds `default_scheme` to a bare endpoint and checks that it is a host.
fn endpoint_url(endpoint: &str, default_scheme: &str) -> Result<String> {
    let trimmed = endpoint.trim().trim_end_matches('/');
    let (scheme, host) = trimmed
        .split_once("://")
        .unwrap_or((default_scheme, trimmed));

    if host.is_empty() || host.contains('/') {
        return Err(Error::invalid_input(format!("invalid TOS endpoint '{endpoint}'")));
    }

    Ok(format!("{scheme}://{host}"))
}

fn method_type(method: HttpMethod) -> HttpMethodType {
    match method {
        HttpMethod::Get => HttpMethodType::HttpMethodGet,
        HttpMethod::Put => HttpMethodType::HttpMethodPut,
        HttpMethod::Head => HttpMethodType::HttpMethodHead,
        HttpMethod::Delete => HttpMethodType::HttpMethodDelete,
        HttpMethod::Post => HttpMethodType::HttpMethodPost,
    }
}

fn validate(request: &PresignRequest) -> Result<()> {
    if request.bucket.is_empty() {
        return Err(Error::invalid_input("cannot presign without a bucket"));
    }
    if request.key.is_empty() {
        return Err(Error::invalid_input("cannot presign without an object key"));
    }

    let expires = request.expires.as_secs();
    if expires == 0 || expires > MAX_PRESIGN_EXPIRES_SECS {
        return Err(Error::invalid_input(format!(
            "presign expiry must be between 1 and {MAX_PRESIGN_EXPIRES_SECS} seconds, got {expires}"
        )));
    }

    Ok(())
}

/// Builds a one-shot SDK client and asks it for the URL.
fn sign_with_sdk(options: &ClientOptions, endpoint: &str, request: &PresignRequest) -> Result<String> {
    let client = tos::builder()
        .ak(options.access_key.as_str())
        .sk(options.secret_key.as_str())
        .region(options.region.as_str())
        .endpoint(endpoint)
        .build()
        .map_err(|e| Error::configuration(format!("failed to create TOS client: {e}")))?;

    let mut input = PreSignedURLInput::new_with_key(request.bucket.as_str(), request.key.as_str());
    input.set_http_method(method_type(request.method));
    input.set_expires(request.expires.as_secs() as _);

    let output = client.pre_signed_url(&input).map_err(|e| {
        Error::new(ErrorKind::ExternalError).with_message(format!("TOS signer failed: {e}"))
    })?;

    Ok(output.signed_url().to_string())
}

#[async_trait]
impl PresignSigner for TosPresigner {
    async fn presign(&self, request: &PresignRequest) -> Result<Url> {
        validate(request)?;

        tracing::trace!(
            target: TRACING_TARGET_CONNECTOR,
            endpoint = %self.endpoint,
            bucket = %request.bucket,
            "Calling TOS SDK signer"
        );

        // The SDK client is blocking; keep it off the async workers.
        let options = self.options.clone();
        let endpoint = self.endpoint.clone();
        let request = request.clone();
        let signed = tokio::task::spawn_blocking(move || sign_with_sdk(&options, &endpoint, &request))
            .await
            .map_err(|e| {
                Error::new(ErrorKind::InternalError)
                    .with_message("TOS signer task failed")
                    .with_source(e)
            })??;

        Ok(Url::parse(&signed)?)
    }
}
