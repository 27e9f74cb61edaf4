//! Presigning through `object_store`'s S3 signer.

use std::sync::Arc;

use async_trait::async_trait;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::signer::Signer;
use tollgate_core::{ClientOptions, Error, HttpMethod, PresignRequest, PresignSigner, Result};
use url::Url;

use crate::S3ConnectorConfig;

/// Signs S3 URLs locally with the long-lived keys of one call.
pub struct S3Presigner {
    options: ClientOptions,
    config: Arc<S3ConnectorConfig>,
}

impl std::fmt::Debug for S3Presigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Presigner")
            .field("options", &self.options)
            .field("virtual_hosted_style", &self.config.virtual_hosted_style)
            .finish_non_exhaustive()
    }
}

/// Adds a scheme to bare endpoints such as `s3.us-east-1.amazonaws.com`.
pub(crate) fn endpoint_url(endpoint: &str) -> String {
    let endpoint = endpoint.trim().trim_end_matches('/');
    if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("https://{endpoint}")
    }
}

pub(crate) fn http_method(method: HttpMethod) -> http::Method {
    match method {
        HttpMethod::Get => http::Method::GET,
        HttpMethod::Put => http::Method::PUT,
        HttpMethod::Head => http::Method::HEAD,
        HttpMethod::Delete => http::Method::DELETE,
        HttpMethod::Post => http::Method::POST,
    }
}

impl S3Presigner {
    pub(crate) fn new(options: ClientOptions, config: Arc<S3ConnectorConfig>) -> Self {
        Self { options, config }
    }

    /// Builds a store scoped to `bucket`, holding static credentials only.
    fn store(&self, bucket: &str) -> Result<AmazonS3> {
        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(bucket)
            .with_region(&self.options.region)
            .with_access_key_id(&self.options.access_key)
            .with_secret_access_key(&self.options.secret_key);

        if !self.options.endpoint.trim().is_empty() {
            let endpoint = endpoint_url(&self.options.endpoint);
            if endpoint.starts_with("http://") {
                builder = builder.with_allow_http(true);
            }

            builder = if self.config.virtual_hosted_style {
                let (scheme, host) = endpoint
                    .split_once("://")
                    .unwrap_or(("https", endpoint.as_str()));
                builder
                    .with_endpoint(format!("{scheme}://{bucket}.{host}"))
                    .with_virtual_hosted_style_request(true)
            } else {
                builder.with_endpoint(endpoint)
            };
        }

        builder
            .build()
            .map_err(|e| tollgate_core::Error::from(crate::Error::from(e)))
    }
}

#[async_trait]
impl PresignSigner for S3Presigner {
    async fn presign(&self, request: &PresignRequest) -> Result<Url> {
        if request.key.trim_matches('/').is_empty() {
            return Err(Error::invalid_input("cannot presign an empty object key"));
        }

        let path = Path::parse(&request.key).map_err(|e| {
            Error::invalid_input(format!("invalid object key '{}'", request.key)).with_source(e)
        })?;

        let store = self.store(&request.bucket)?;
        let url = store
            .signed_url(http_method(request.method), &path, request.expires)
            .await
            .map_err(crate::Error::from)?;

        Ok(url)
    }
}
