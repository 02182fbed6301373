//! Basic-Auth credential extraction.
//!
//! # Responsibilities
//! - Parse the inbound `Authorization` header
//! - Decode `Basic <base64(user:pass)>` into [`Credentials`]
//! - Re-encode credentials for the upstream call
//!
//! Only the Basic scheme is accepted. Anything else is rejected before an
//! upstream call is attempted.

use base64::{engine::general_purpose, Engine as _};
use thiserror::Error;

/// Why an `Authorization` header could not be turned into credentials.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Header absent or empty.
    #[error("Authentication required")]
    Missing,
    /// Header present but not `Basic <token>`.
    #[error("Only Basic authentication is supported")]
    UnsupportedScheme,
    /// Token is not valid base64 `user:pass` with both parts non-empty.
    #[error("Invalid credentials format")]
    Malformed,
}

/// Username/password pair forwarded to the upstream service.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub pass: String,
}

impl Credentials {
    /// Extract credentials from an `Authorization` header value.
    pub fn from_authorization(header: Option<&str>) -> Result<Self, AuthError> {
        let header = header.map(str::trim).unwrap_or_default();
        if header.is_empty() {
            return Err(AuthError::Missing);
        }

        // A scheme with no token after it is not `Basic <token>` at all.
        let (scheme, token) = header
            .split_once(char::is_whitespace)
            .ok_or(AuthError::UnsupportedScheme)?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return Err(AuthError::UnsupportedScheme);
        }

        let decoded = general_purpose::STANDARD
            .decode(token.trim())
            .map_err(|_| AuthError::Malformed)?;
        let decoded = String::from_utf8(decoded).map_err(|_| AuthError::Malformed)?;

        match decoded.split_once(':') {
            Some((user, pass)) if !user.is_empty() && !pass.is_empty() => Ok(Self {
                user: user.to_string(),
                pass: pass.to_string(),
            }),
            _ => Err(AuthError::Malformed),
        }
    }

    /// `Basic <base64(user:pass)>`, ready for an outbound `Authorization` header.
    pub fn basic_header_value(&self) -> String {
        let token = general_purpose::STANDARD.encode(format!("{}:{}", self.user, self.pass));
        format!("Basic {}", token)
    }

    /// Whether a password is present, for logging without exposing it.
    pub fn has_password(&self) -> bool {
        !self.pass.is_empty()
    }
}

// Keep the password out of logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("pass", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_header_decodes() {
        let creds = Credentials::from_authorization(Some("Basic dGVzdDp0ZXN0")).unwrap();
        assert_eq!(creds.user, "test");
        assert_eq!(creds.pass, "test");
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        let creds = Credentials::from_authorization(Some("basic   dGVzdDp0ZXN0")).unwrap();
        assert_eq!(creds.user, "test");
    }

    #[test]
    fn test_password_may_contain_colons() {
        // "alice:pa:ss"
        let creds = Credentials::from_authorization(Some("Basic YWxpY2U6cGE6c3M=")).unwrap();
        assert_eq!(creds.user, "alice");
        assert_eq!(creds.pass, "pa:ss");
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(Credentials::from_authorization(None), Err(AuthError::Missing));
        assert_eq!(Credentials::from_authorization(Some("")), Err(AuthError::Missing));
        assert_eq!(Credentials::from_authorization(Some("   ")), Err(AuthError::Missing));
    }

    #[test]
    fn test_other_schemes_rejected() {
        assert_eq!(
            Credentials::from_authorization(Some("Bearer xyz")),
            Err(AuthError::UnsupportedScheme)
        );
        assert_eq!(
            Credentials::from_authorization(Some("Digest username=\"a\"")),
            Err(AuthError::UnsupportedScheme)
        );
    }

    #[test]
    fn test_malformed_tokens() {
        // "test:" (empty password)
        assert_eq!(
            Credentials::from_authorization(Some("Basic dGVzdDo=")),
            Err(AuthError::Malformed)
        );
        // ":test" (empty user)
        assert_eq!(
            Credentials::from_authorization(Some("Basic OnRlc3Q=")),
            Err(AuthError::Malformed)
        );
        // "test" (no separator)
        assert_eq!(
            Credentials::from_authorization(Some("Basic dGVzdA==")),
            Err(AuthError::Malformed)
        );
        assert_eq!(
            Credentials::from_authorization(Some("Basic !!!not-base64")),
            Err(AuthError::Malformed)
        );
    }

    #[test]
    fn test_bare_scheme_is_unsupported() {
        for header in ["Basic", "basic", "Basic   "] {
            assert_eq!(
                Credentials::from_authorization(Some(header)),
                Err(AuthError::UnsupportedScheme),
                "{header:?}"
            );
        }
    }

    #[test]
    fn test_header_value_round_trip() {
        let creds = Credentials {
            user: "test".into(),
            pass: "test".into(),
        };
        assert_eq!(creds.basic_header_value(), "Basic dGVzdDp0ZXN0");
        assert!(creds.has_password());
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = Credentials {
            user: "alice".into(),
            pass: "secret".into(),
        };
        let rendered = format!("{:?}", creds);
        assert!(rendered.contains("alice"));
        assert!(!rendered.contains("secret"));
    }
}
