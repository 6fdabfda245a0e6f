//! API token handling.
//!
//! The token is wrapped in `SecretString`, which:
//! - Implements `Debug` as `"[REDACTED]"`
//! - Zeroizes memory on drop
//! - Requires explicit `.expose_secret()` to access the value

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::{Error, Result};

/// A bearer token that prevents accidental logging.
#[derive(Clone)]
pub struct ApiToken(SecretString);

impl ApiToken {
    /// Create a new token from a string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// Read the token from the named environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingToken`] if the variable is unset or empty.
    pub fn from_env(var: &str) -> Result<Self> {
        match std::env::var(var) {
            Ok(value) if !value.trim().is_empty() => {
                debug!(var, "loaded API token from environment");
                Ok(Self::new(value.trim()))
            }
            _ => Err(Error::MissingToken(var.to_string())),
        }
    }

    /// Expose the secret token value.
    ///
    /// Use sparingly - only when actually sending to an API.
    pub fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApiToken([REDACTED])")
    }
}

impl From<&str> for ApiToken {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ApiToken {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
