//! Volcengine OpenAPI request signing for the default STS client.
//!
//! The signing key is derived from the secret key (`date`, then `region`,
//! then `service`, then the literal `request`) and signs a digest of the
//! canonical request.

use hmac::{Hmac, Mac};
use jiff::Timestamp;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Characters left unescaped by RFC 3986: `A-Z a-z 0-9 - . _ ~`.
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Terminal element of every credential scope.
pub(crate) const SCOPE_TERMINATOR: &str = "request";

/// Signing time in the two formats the scheme uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SigningTime {
    /// `YYYYMMDD'T'HHMMSS'Z'`.
    pub datetime: String,
    /// `YYYYMMDD`.
    pub date: String,
}

impl SigningTime {
    pub fn new(at: Timestamp) -> Self {
        Self {
            datetime: at.strftime("%Y%m%dT%H%M%SZ").to_string(),
            date: at.strftime("%Y%m%d").to_string(),
        }
    }
}

/// `{date}/{region}/{service}/request`.
pub(crate) fn credential_scope(date: &str, region: &str, service: &str) -> String {
    format!("{date}/{region}/{service}/{SCOPE_TERMINATOR}")
}

pub(crate) fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

pub(crate) fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Derives the scoped signing key for `service` in `region` on `date`.
pub(crate) fn signing_key(secret_key: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
    let k_date = hmac_sha256(secret_key.as_bytes(), date.as_bytes());
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, service.as_bytes());
    hmac_sha256(&k_service, SCOPE_TERMINATOR.as_bytes())
}

/// Hex signature of `string_to_sign` under `key`.
pub(crate) fn sign(key: &[u8], string_to_sign: &str) -> String {
    hex::encode(hmac_sha256(key, string_to_sign.as_bytes()))
}

/// Percent-encodes a query component.
pub(crate) fn uri_encode(value: &str) -> String {
    utf8_percent_encode(value, UNRESERVED).to_string()
}

/// Builds a canonical query string: encoded pairs sorted by key, then value.
pub(crate) fn canonical_query<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    let mut encoded: Vec<(String, String)> = pairs
        .into_iter()
        .map(|(k, v)| (uri_encode(k), uri_encode(v)))
        .collect();
    encoded.sort();

    encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signing_time_format() {
        let at: Timestamp = "2024-03-05T07:08:09Z".parse().unwrap();
        let time = SigningTime::new(at);
        assert_eq!(time.datetime, "20240305T070809Z");
        assert_eq!(time.date, "20240305");
    }

    #[test]
    fn test_hmac_known_vector() {
        // RFC 4231, test case 2.
        let mac = hmac_sha256(b"Jefe", b"what do ya want for nothing?");
        assert_eq!(
            hex::encode(mac),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_sha256_of_empty_payload() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_signing_key_depends_on_every_scope_part() {
        let base = signing_key("sk", "20240305", "cn-north-1", "sts");
        assert_eq!(base.len(), 32);
        assert_ne!(base, signing_key("sk", "20240306", "cn-north-1", "sts"));
        assert_ne!(base, signing_key("sk", "20240305", "cn-beijing", "sts"));
        assert_ne!(base, signing_key("sk", "20240305", "cn-north-1", "iam"));
        assert_ne!(base, signing_key("sk2", "20240305", "cn-north-1", "sts"));
    }

    #[test]
    fn test_uri_encoding() {
        assert_eq!(uri_encode("AK/2024/cn/sts/request"), "AK%2F2024%2Fcn%2Fsts%2Frequest");
        assert_eq!(uri_encode("a b~c"), "a%20b~c");
        assert_eq!(uri_encode("数据"), "%E6%95%B0%E6%8D%AE");
    }

    #[test]
    fn test_canonical_query_is_sorted() {
        let query = canonical_query([("b", "2"), ("a", "x y"), ("Action", "AssumeRole")]);
        assert_eq!(query, "Action=AssumeRole&a=x%20y&b=2");
    }
}
