//! Client id and shared secret.
//!
//! The secret is wrapped in `SecretString`, so it never shows up in `Debug`
//! output and is zeroed on drop.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};

use crate::error::ApiError;

/// Account credentials issued by the vendor.
#[derive(Clone)]
pub struct Credentials {
    client_id: String,
    secret: SecretString,
}

impl Credentials {
    /// Create credentials from explicit values.
    ///
    /// Empty values are accepted here and rejected by the signer, so that
    /// configuration problems surface on the first signing attempt.
    pub fn new(client_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            secret: SecretString::from(secret.into()),
        }
    }

    /// Read credentials from two environment variables.
    ///
    /// # Errors
    /// Returns `ApiError::Configuration` if either variable is unset.
    pub fn from_env_vars(client_id_var: &str, secret_var: &str) -> Result<Self, ApiError> {
        let client_id = std::env::var(client_id_var)
            .map_err(|_| ApiError::Configuration(format!("missing environment variable {client_id_var}")))?;
        let secret = std::env::var(secret_var)
            .map_err(|_| ApiError::Configuration(format!("missing environment variable {secret_var}")))?;
        Ok(Self::new(client_id, secret))
    }

    /// Public client id, safe to log.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Secret bytes for HMAC keying. Never log the return value.
    pub(crate) fn expose_secret(&self) -> &str {
        self.secret.expose_secret()
    }

    /// Fails with `ApiError::Configuration` if either half is empty, or if
    /// the client id carries leading or trailing whitespace. The id is sent
    /// and signed verbatim.
    pub fn validate(&self) -> Result<(), ApiError> {
        let trimmed = self.client_id.trim();
        if trimmed.is_empty() {
            return Err(ApiError::Configuration("client id is empty".into()));
        }
        if trimmed.len() != self.client_id.len() {
            return Err(ApiError::Configuration(
                "client id has surrounding whitespace".into(),
            ));
        }
        if self.expose_secret().is_empty() {
            return Err(ApiError::Configuration("shared secret is empty".into()));
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_secret() {
        let creds = Credentials::new("demo-client", "super-secret-value");
        let debug = format!("{creds:?}");
        assert!(debug.contains("demo-client"));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("super-secret-value"));
    }

    #[test]
    fn validate_rejects_empty_secret() {
        let err = Credentials::new("demo-client", "").validate().unwrap_err();
        assert!(matches!(err, ApiError::Configuration(_)));
    }

    #[test]
    fn validate_rejects_blank_client_id() {
        let err = Credentials::new("  ", "abc123").validate().unwrap_err();
        assert!(matches!(err, ApiError::Configuration(_)));
    }

    #[test]
    fn validate_rejects_padded_client_id() {
        for id in [" demo-client", "demo-client\n", "\tdemo-client "] {
            let err = Credentials::new(id, "abc123").validate().unwrap_err();
            assert!(matches!(err, ApiError::Configuration(ref m) if m.contains("whitespace")), "{id:?}");
        }
        assert!(Credentials::new("demo-client", "abc123").validate().is_ok());
    }

    #[test]
    fn missing_env_var_is_configuration_error() {
        let err = Credentials::from_env_vars(
            "SINGLEPLATFORM_TEST_UNSET_ID_3F9A",
            "SINGLEPLATFORM_TEST_UNSET_SECRET_3F9A",
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::Configuration(ref m) if m.contains("UNSET_ID")));
    }
}
