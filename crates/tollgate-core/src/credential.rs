//! Temporary credentials issued by an STS provider.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Short-lived credentials obtained by assuming a role.
///
/// All three parts are always present: a credential can only be built through
/// [`TemporaryCredential::new`], which refuses partial triples. Its lifetime is
/// enforced by the provider and is not tracked here.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "CredentialRepr")]
pub struct TemporaryCredential {
    access_key_id: String,
    secret_access_key: String,
    session_token: String,
}

impl TemporaryCredential {
    /// Creates a credential from its three parts.
    ///
    /// # Errors
    ///
    /// Returns an [`ErrorKind::InvalidInput`](crate::ErrorKind::InvalidInput)
    /// error if any part is empty.
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: impl Into<String>,
    ) -> Result<Self> {
        let credential = Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: session_token.into(),
        };

        let parts = [
            ("access key id", &credential.access_key_id),
            ("secret access key", &credential.secret_access_key),
            ("session token", &credential.session_token),
        ];
        for (name, value) in parts {
            if value.is_empty() {
                return Err(Error::invalid_input(format!(
                    "temporary credential is missing its {name}"
                )));
            }
        }

        Ok(credential)
    }

    /// Returns the temporary access key id.
    #[inline]
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// Returns the temporary secret access key.
    #[inline]
    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }

    /// Returns the session token.
    #[inline]
    pub fn session_token(&self) -> &str {
        &self.session_token
    }

    /// Splits the credential into `(access_key_id, secret_access_key, session_token)`.
    pub fn into_parts(self) -> (String, String, String) {
        (
            self.access_key_id,
            self.secret_access_key,
            self.session_token,
        )
    }
}

impl std::fmt::Debug for TemporaryCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemporaryCredential")
            .field("access_key_id", &masked(&self.access_key_id))
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CredentialRepr {
    access_key_id: String,
    secret_access_key: String,
    session_token: String,
}

impl TryFrom<CredentialRepr> for TemporaryCredential {
    type Error = Error;

    fn try_from(repr: CredentialRepr) -> Result<Self> {
        Self::new(
            repr.access_key_id,
            repr.secret_access_key,
            repr.session_token,
        )
    }
}

/// Masks a key for logging: keeps the first four characters.
pub fn masked(key: &str) -> String {
    let visible: String = key.chars().take(4).collect();
    if key.chars().count() <= 4 {
        "*".repeat(key.chars().count())
    } else {
        format!("{visible}***")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_credential_parts() {
        let credential = TemporaryCredential::new("STSAK", "STSSK", "token").unwrap();
        assert_eq!(credential.access_key_id(), "STSAK");
        assert_eq!(credential.secret_access_key(), "STSSK");
        assert_eq!(credential.session_token(), "token");

        let (ak, sk, token) = credential.into_parts();
        assert_eq!((ak.as_str(), sk.as_str(), token.as_str()), ("STSAK", "STSSK", "token"));
    }

    #[test]
    fn test_partial_triple_rejected() {
        let err = TemporaryCredential::new("STSAK", "STSSK", "").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidInput);
        assert!(err.to_string().contains("session token"));

        assert!(TemporaryCredential::new("", "STSSK", "token").is_err());
        assert!(TemporaryCredential::new("STSAK", "", "token").is_err());
    }

    #[test]
    fn test_debug_hides_secret_and_token() {
        let credential = TemporaryCredential::new("STSAKEXAMPLE", "topsecret", "tok123").unwrap();
        let debug = format!("{credential:?}");

        assert!(debug.contains("STSA***"));
        assert!(!debug.contains("topsecret"));
        assert!(!debug.contains("tok123"));
    }

    #[test]
    fn test_masking() {
        assert_eq!(masked("AKIATEST12345"), "AKIA***");
        assert_eq!(masked("ABC"), "***");
        assert_eq!(masked(""), "");
    }
}
