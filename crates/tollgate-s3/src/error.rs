//! Conversions from SDK errors.

use aws_sdk_sts::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use thiserror::Error;
use tollgate_core::{BoxedError, ErrorKind};

/// Error type for the S3 signer and the AWS STS exchange.
#[derive(Debug, Error)]
pub enum Error {
    /// The object store signer failed.
    #[error("Object store error: {0}")]
    ObjectStore(#[from] object_store::Error),
    /// The AWS STS call failed.
    #[error("AWS STS error: {message}")]
    Sts {
        kind: ErrorKind,
        code: Option<String>,
        message: String,
        #[source]
        source: BoxedError,
    },
}

impl Error {
    /// Classifies an SDK error returned by an STS operation.
    pub(crate) fn from_sdk<E, R>(err: SdkError<E, R>) -> Self
    where
        E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
        R: std::fmt::Debug + Send + Sync + 'static,
    {
        let code = err.code().map(str::to_string);
        let kind = match &err {
            SdkError::TimeoutError(_) => ErrorKind::Timeout,
            SdkError::DispatchFailure(_) => ErrorKind::NetworkError,
            SdkError::ConstructionFailure(_) => ErrorKind::Configuration,
            SdkError::ServiceError(_) => code.as_deref().map_or(ErrorKind::ExternalError, sts_error_kind),
            _ => ErrorKind::ExternalError,
        };

        let message = match (&code, err.message()) {
            (Some(code), Some(message)) => format!("{code}: {message}"),
            _ => DisplayErrorContext(&err).to_string(),
        };

        Self::Sts {
            kind,
            code,
            message,
            source: Box::new(err),
        }
    }
}

/// Maps an AWS STS error code to an error kind.
fn sts_error_kind(code: &str) -> ErrorKind {
    match code {
        "InvalidClientTokenId" | "SignatureDoesNotMatch" | "ExpiredToken"
        | "IncompleteSignature" | "MissingAuthenticationToken" => ErrorKind::Authentication,
        "AccessDenied" | "AccessDeniedException" | "RegionDisabledException" => {
            ErrorKind::Authorization
        }
        "MalformedPolicyDocument" | "PackedPolicyTooLarge" | "ValidationError"
        | "InvalidParameterValue" => ErrorKind::InvalidInput,
        "Throttling" | "ThrottlingException" | "RequestLimitExceeded" => ErrorKind::RateLimited,
        "InternalFailure" | "ServiceUnavailable" => ErrorKind::ServiceUnavailable,
        _ => ErrorKind::ExternalError,
    }
}

fn object_store_kind(err: &object_store::Error) -> ErrorKind {
    match err {
        object_store::Error::InvalidPath { .. } => ErrorKind::InvalidInput,
        object_store::Error::NotSupported { .. } | object_store::Error::NotImplemented => {
            ErrorKind::Unsupported
        }
        object_store::Error::PermissionDenied { .. } => ErrorKind::Authorization,
        object_store::Error::Unauthenticated { .. } => ErrorKind::Authentication,
        object_store::Error::UnknownConfigurationKey { .. } => ErrorKind::Configuration,
        _ => ErrorKind::ExternalError,
    }
}

impl From<Error> for tollgate_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::ObjectStore(e) => tollgate_core::Error::new(object_store_kind(&e))
                .with_message(e.to_string())
                .with_source(e),
            Error::Sts {
                kind,
                message,
                source,
                ..
            } => tollgate_core::Error::new(kind)
                .with_message(message)
                .with_source(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use aws_sdk_sts::operation::assume_role::AssumeRoleError;

    use super::*;

    #[test]
    fn test_sts_error_codes() {
        assert_eq!(sts_error_kind("InvalidClientTokenId"), ErrorKind::Authentication);
        assert_eq!(sts_error_kind("AccessDenied"), ErrorKind::Authorization);
        assert_eq!(sts_error_kind("MalformedPolicyDocument"), ErrorKind::InvalidInput);
        assert_eq!(sts_error_kind("Throttling"), ErrorKind::RateLimited);
        assert_eq!(sts_error_kind("Unheard"), ErrorKind::ExternalError);
    }

    #[test]
    fn test_sts_error_conversion_keeps_kind() {
        let err = Error::Sts {
            kind: ErrorKind::Authorization,
            code: Some("AccessDenied".into()),
            message: "AccessDenied: not authorized to perform sts:AssumeRole".into(),
            source: "not authorized".into(),
        };
        let err: tollgate_core::Error = err.into();
        assert_eq!(err.kind, ErrorKind::Authorization);
        assert!(err.to_string().contains("sts:AssumeRole"));
    }

    #[test]
    fn test_sdk_error_is_kept_as_source() {
        let sdk = SdkError::<AssumeRoleError, ()>::construction_failure(std::io::Error::other(
            "missing region",
        ));
        let err = Error::from_sdk(sdk);
        assert!(matches!(
            err,
            Error::Sts {
                kind: ErrorKind::Configuration,
                code: None,
                ..
            }
        ));

        let err: tollgate_core::Error = err.into();
        assert_eq!(err.kind, ErrorKind::Configuration);
        assert!(err.to_string().contains("missing region"));

        let source = std::error::Error::source(&err).unwrap();
        assert!(source.downcast_ref::<SdkError<AssumeRoleError, ()>>().is_some());
    }

    #[test]
    fn test_object_store_conversion() {
        let source = object_store::Error::NotImplemented;
        let err: tollgate_core::Error = Error::from(source).into();
        assert_eq!(err.kind, ErrorKind::Unsupported);
    }
}
