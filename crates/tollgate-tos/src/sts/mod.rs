//! Default Volcengine STS `AssumeRole` client.
//!
//! Neither the TOS SDK nor any other crate in this workspace's stack exposes
//! the Volcengine STS API, so the default connector speaks it over `reqwest`.
//! Requests are signed with the Volcengine OpenAPI HMAC-SHA256 scheme in
//! [`signing`]. Deployments that ship a vendor STS client plug it in through
//! their own [`Connector`](tollgate_core::Connector) instead.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use reqwest::Client;
use serde::Deserialize;
use tollgate_core::{
    AssumeRoleRequest, ClientOptions, Error, ErrorKind, Result, StsClient, TemporaryCredential,
};
use url::Url;

use self::signing::SigningTime;
use crate::{TRACING_TARGET_STS, TosConnectorConfig};

mod signing;

/// Signing algorithm of the Volcengine OpenAPI.
const OPENAPI_ALGORITHM: &str = "HMAC-SHA256";

/// Service name in the credential scope.
const STS_SERVICE: &str = "sts";

/// Headers covered by the signature, lowercase and sorted.
const SIGNED_HEADERS: &str = "host;x-content-sha256;x-date";

/// Signature headers of one STS request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SignedHeaders {
    pub x_date: String,
    pub content_sha256: String,
    pub authorization: String,
}

/// One-shot STS client holding the long-lived keys of a single call.
///
/// The underlying [`Client`] only pools connections and carries no
/// credentials.
pub struct VolcStsClient {
    http: Client,
    config: Arc<TosConnectorConfig>,
    options: ClientOptions,
}

impl std::fmt::Debug for VolcStsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VolcStsClient")
            .field("endpoint", &self.config.sts_endpoint)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl VolcStsClient {
    pub(crate) fn new(http: Client, config: Arc<TosConnectorConfig>, options: ClientOptions) -> Self {
        Self {
            http,
            config,
            options,
        }
    }

    /// Query parameters of the `AssumeRole` action.
    fn query(&self, request: &AssumeRoleRequest) -> String {
        let duration = request.duration.as_secs().to_string();
        signing::canonical_query([
            ("Action", "AssumeRole"),
            ("Version", self.config.sts_version.as_str()),
            ("RoleTrn", request.role_arn.as_str()),
            ("RoleSessionName", request.session_name.as_str()),
            ("DurationSeconds", duration.as_str()),
        ])
    }

    /// Signs a GET of `/?{query}` against `host` at `now`.
    pub(crate) fn sign(&self, host: &str, query: &str, now: Timestamp) -> SignedHeaders {
        let time = SigningTime::new(now);
        let content_sha256 = signing::sha256_hex(b"");
        let scope = signing::credential_scope(&time.date, &self.config.sts_region, STS_SERVICE);

        let canonical_request = format!(
            "GET\n/\n{query}\nhost:{host}\nx-content-sha256:{content_sha256}\nx-date:{}\n\n{SIGNED_HEADERS}\n{content_sha256}",
            time.datetime,
        );
        let string_to_sign = format!(
            "{OPENAPI_ALGORITHM}\n{}\n{scope}\n{}",
            time.datetime,
            signing::sha256_hex(canonical_request.as_bytes()),
        );

        let key = signing::signing_key(
            &self.options.secret_key,
            &time.date,
            &self.config.sts_region,
            STS_SERVICE,
        );
        let signature = signing::sign(&key, &string_to_sign);

        SignedHeaders {
            authorization: format!(
                "{OPENAPI_ALGORITHM} Credential={}/{scope}, SignedHeaders={SIGNED_HEADERS}, Signature={signature}",
                self.options.access_key,
            ),
            x_date: time.datetime,
            content_sha256,
        }
    }
}

#[async_trait]
impl StsClient for VolcStsClient {
    async fn assume_role(&self, request: &AssumeRoleRequest) -> Result<TemporaryCredential> {
        let mut url = Url::parse(&self.config.sts_endpoint)?;
        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => {
                return Err(Error::configuration(format!(
                    "STS endpoint '{}' has no host",
                    self.config.sts_endpoint
                )));
            }
        };

        let query = self.query(request);
        url.set_path("/");
        url.set_query(Some(&query));

        let headers = self.sign(&host, &query, Timestamp::now());

        tracing::debug!(
            target: TRACING_TARGET_STS,
            host = %host,
            role = %request.role_arn,
            session = %request.session_name,
            "Sending AssumeRole request"
        );

        let response = self
            .http
            .get(url)
            .header("X-Date", &headers.x_date)
            .header("X-Content-Sha256", &headers.content_sha256)
            .header("Authorization", &headers.authorization)
            .send()
            .await
            .map_err(crate::Error::from)?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(crate::Error::from)?;

        tracing::debug!(
            target: TRACING_TARGET_STS,
            status,
            bytes = body.len(),
            "Received AssumeRole response"
        );

        parse_assume_role_response(status, &body)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AssumeRoleResponse {
    #[serde(default)]
    response_metadata: ResponseMetadata,
    #[serde(default)]
    result: Option<AssumeRoleResult>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ResponseMetadata {
    #[serde(default)]
    request_id: Option<String>,
    #[serde(default)]
    error: Option<ResponseError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ResponseError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AssumeRoleResult {
    credentials: Option<Credentials>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Credentials {
    access_key_id: String,
    secret_access_key: String,
    session_token: String,
    #[serde(default)]
    expired_time: Option<String>,
}

/// Maps a Volcengine error code to an error kind.
fn error_kind(code: &str) -> ErrorKind {
    match code {
        "InvalidAccessKey"
        | "InvalidClientTokenId"
        | "InvalidAuthorization"
        | "SignatureDoesNotMatch"
        | "InvalidCredential"
        | "InvalidSecretToken"
        | "MissingAuthenticationToken" => ErrorKind::Authentication,
        "AccessDenied" | "NoPermission" | "InvalidActionOrVersion" => ErrorKind::Authorization,
        "InvalidParameter" | "MissingParameter" | "InvalidParameterValue" | "RoleNotExist" => {
            ErrorKind::InvalidInput
        }
        "Throttling" | "FlowLimitExceeded" | "RequestLimitExceeded" => ErrorKind::RateLimited,
        "InternalError" | "InternalServiceError" | "ServiceUnavailable" => {
            ErrorKind::ServiceUnavailable
        }
        _ => ErrorKind::ExternalError,
    }
}

fn status_kind(status: u16) -> ErrorKind {
    match status {
        401 => ErrorKind::Authentication,
        403 => ErrorKind::Authorization,
        429 => ErrorKind::RateLimited,
        400..=499 => ErrorKind::InvalidInput,
        500..=599 => ErrorKind::ServiceUnavailable,
        _ => ErrorKind::ExternalError,
    }
}

/// Turns an `AssumeRole` response into credentials or a descriptive error.
pub(crate) fn parse_assume_role_response(status: u16, body: &[u8]) -> Result<TemporaryCredential> {
    let response: AssumeRoleResponse = match serde_json::from_slice(body) {
        Ok(response) => response,
        Err(_) if !(200..300).contains(&status) => {
            return Err(Error::new(status_kind(status)).with_message(format!(
                "STS returned HTTP {status}: {}",
                String::from_utf8_lossy(body).trim()
            )));
        }
        Err(e) => return Err(crate::Error::from(e).into()),
    };

    let request_id = response
        .response_metadata
        .request_id
        .unwrap_or_else(|| "unknown".to_string());

    if let Some(error) = response.response_metadata.error {
        return Err(Error::new(error_kind(&error.code)).with_message(format!(
            "{}: {} (request id {request_id})",
            error.code, error.message
        )));
    }

    if !(200..300).contains(&status) {
        return Err(Error::new(status_kind(status))
            .with_message(format!("STS returned HTTP {status} (request id {request_id})")));
    }

    let credentials = response
        .result
        .and_then(|result| result.credentials)
        .ok_or_else(|| {
            Error::new(ErrorKind::ExternalError).with_message(format!(
                "STS response carries no credentials (request id {request_id})"
            ))
        })?;

    tracing::trace!(
        target: TRACING_TARGET_STS,
        request_id = %request_id,
        expires_at = credentials.expired_time.as_deref().unwrap_or("unknown"),
        "Decoded temporary credentials"
    );

    TemporaryCredential::new(
        credentials.access_key_id,
        credentials.secret_access_key,
        credentials.session_token,
    )
}
