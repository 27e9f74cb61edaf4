//! Endpoint normalization for TOS.

use std::borrow::Cow;

/// Marker of the S3-compatible TOS endpoints, e.g. `tos-s3-cn-beijing.ivolces.com`.
pub const S3_COMPAT_MARKER: &str = "s3-";

/// Returns the native TOS endpoint for `endpoint`.
///
/// Storage targets are often configured with the S3-compatible endpoint,
/// but TOS signatures are only valid against the native one. The first
/// occurrence of `s3-` is removed; any other endpoint is returned as is.
pub fn canonical_endpoint(endpoint: &str) -> Cow<'_, str> {
    if endpoint.contains(S3_COMPAT_MARKER) {
        Cow::Owned(endpoint.replacen(S3_COMPAT_MARKER, "", 1))
    } else {
        Cow::Borrowed(endpoint)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_s3_compat_endpoint_is_rewritten() {
        assert_eq!(
            canonical_endpoint("tos-s3-cn-beijing.ivolces.com"),
            "tos-cn-beijing.ivolces.com"
        );
        assert_eq!(
            canonical_endpoint("https://tos-s3-cn-shanghai.volces.com"),
            "https://tos-cn-shanghai.volces.com"
        );
    }

    #[test]
    fn test_native_endpoint_is_unchanged() {
        let endpoint = canonical_endpoint("tos-cn-beijing.ivolces.com");
        assert!(matches!(endpoint, Cow::Borrowed(_)));
        assert_eq!(endpoint, "tos-cn-beijing.ivolces.com");
    }

    #[test]
    fn test_only_first_marker_is_removed() {
        assert_eq!(canonical_endpoint("s3-s3-host"), "s3-host");
    }

    proptest! {
        #[test]
        fn rewrite_removes_exactly_one_marker(
            head in "[a-z.]{0,10}",
            tail in "[a-z.]{0,10}",
        ) {
            let endpoint = format!("{head}s3-{tail}");
            let rewritten = canonical_endpoint(&endpoint);
            prop_assert_eq!(rewritten.len(), endpoint.len() - S3_COMPAT_MARKER.len());
        }

        #[test]
        fn endpoints_without_marker_pass_through(endpoint in "[a-z.]{1,24}") {
            prop_assert_eq!(canonical_endpoint(&endpoint), endpoint.as_str());
        }
    }
}
