//! Authentication material presented to the server on every request.
//!
//! The server accepts two kinds of credential. API keys travel in the
//! server's own `X-Octopus-ApiKey` header, verbatim. Access tokens (issued by
//! an OIDC exchange) travel as a standard bearer token in `Authorization`.
//!
//! Both variants are validated when they are created so that a bad value is
//! reported while reading configuration rather than on the first request.

use crate::error::{OctoError, Result};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;

const API_KEY_HEADER: &str = "X-Octopus-ApiKey";
const AUTHORIZATION_HEADER: &str = "Authorization";
const API_KEY_PREFIX: &str = "API-";

pub enum Credential {
    ApiKey(SecretString),
    AccessToken(SecretString),
}

impl Credential {
    /// Creates an API key credential. Keys look like `API-XXXXXXXX`, where the
    /// tail is upper-case letters and digits.
    pub fn api_key(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        let value = value.trim();
        if value.is_empty() {
            return Err(OctoError::InvalidCredential(
                "API key must not be empty".to_string(),
            ));
        }
        let valid = value
            .strip_prefix(API_KEY_PREFIX)
            .map(|tail| {
                !tail.is_empty()
                    && tail
                        .chars()
                        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
            })
            .unwrap_or(false);
        if !valid {
            return Err(OctoError::InvalidCredential(
                "API key must look like API-XXXXXXXX".to_string(),
            ));
        }
        Ok(Self::ApiKey(SecretString::from(value.to_string())))
    }

    /// Creates a bearer access token credential.
    pub fn access_token(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(OctoError::InvalidCredential(
                "access token must not be empty".to_string(),
            ));
        }
        Ok(Self::AccessToken(SecretString::from(value)))
    }

    pub fn header_name(&self) -> &'static str {
        match self {
            Self::ApiKey(_) => API_KEY_HEADER,
            Self::AccessToken(_) => AUTHORIZATION_HEADER,
        }
    }

    pub fn header_value(&self) -> String {
        match self {
            Self::ApiKey(key) => key.expose_secret().to_string(),
            Self::AccessToken(token) => format!("Bearer {}", token.expose_secret()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::ApiKey(_) => "api-key",
            Self::AccessToken(_) => "access-token",
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential::{}([REDACTED])", self.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLACEHOLDER_API_KEY: &str = "API-XXXXXXXXXXXXXXXXXXXXXXXXXXXXX";

    #[test]
    fn test_api_key_header_is_raw() {
        let credential = Credential::api_key(PLACEHOLDER_API_KEY).unwrap();
        assert_eq!(credential.header_name(), "X-Octopus-ApiKey");
        assert_eq!(credential.header_value(), PLACEHOLDER_API_KEY);
        assert!(!credential.header_value().starts_with("Bearer"));
    }

    #[test]
    fn test_access_token_header_is_bearer() {
        let credential = Credential::access_token("token").unwrap();
        assert_eq!(credential.header_name(), "Authorization");
        assert_eq!(credential.header_value(), "Bearer token");
    }

    #[test]
    fn test_api_key_rejects_malformed_values() {
        assert!(Credential::api_key("").is_err());
        assert!(Credential::api_key("API-").is_err());
        assert!(Credential::api_key("not-a-key").is_err());
        assert!(Credential::api_key("API-lowercase").is_err());
    }

    #[test]
    fn test_api_key_trims_whitespace() {
        let credential = Credential::api_key("  API-ABC123\n").unwrap();
        assert_eq!(credential.header_value(), "API-ABC123");
    }

    #[test]
    fn test_access_token_rejects_blank() {
        assert!(Credential::access_token("   ").is_err());
    }

    #[test]
    fn test_debug_hides_secret() {
        let credential = Credential::access_token("super-secret").unwrap();
        let rendered = format!("{:?}", credential);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("access-token"));
    }
}
