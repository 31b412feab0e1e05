use async_trait::async_trait;
use std::fmt;
use std::time::Instant;
use thiserror::Error;

/// Bearer token for the Azure management API.
///
/// The token is held only as long as the caller needs it to stamp
/// `Authorization` headers; this crate never persists or caches it. `Debug`
/// output redacts the secret so tokens cannot leak through logs.
#[derive(Clone)]
pub struct AccessToken {
    token: String,
    expires_on: Option<Instant>,
}

impl AccessToken {
    /// Wraps a token with no known expiry (e.g. CLI-brokered tokens).
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            expires_on: None,
        }
    }

    /// Wraps a token that the identity provider reported as valid for
    /// `expires_in_secs` seconds from now.
    pub fn with_expiry(token: impl Into<String>, expires_in_secs: u64) -> Self {
        Self {
            token: token.into(),
            expires_on: Instant::now().checked_add(std::time::Duration::from_secs(expires_in_secs)),
        }
    }

    /// The raw bearer token.
    pub fn secret(&self) -> &str {
        &self.token
    }

    /// When the token expires, if the provider reported it.
    pub fn expires_on(&self) -> Option<Instant> {
        self.expires_on
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_on", &self.expires_on)
            .finish()
    }
}

/// Errors raised while acquiring a token.
///
/// All variants are fatal to the resolution that requested the token; none of
/// them is retried by this crate.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The credential is missing a value it needs before it can even send a
    /// request (tenant, client id, secret, endpoint).
    #[error("credential configuration incomplete: {0}")]
    MissingConfiguration(String),

    /// The token endpoint could not be reached.
    #[error("token request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The identity provider answered with a non-success status.
    #[error("identity provider returned HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    /// The identity provider answered 2xx but the payload was not a usable
    /// token response.
    #[error("malformed token response: {0}")]
    InvalidResponse(String),

    /// `az account get-access-token` failed or produced unusable output.
    #[error("azure cli token acquisition failed: {0}")]
    Cli(String),
}

/// Trait for credentials that can obtain Azure AD access tokens.
///
/// This is the seam between the connection resolver and the concrete
/// authentication method (client secret, managed identity, Azure CLI, or a
/// pre-acquired token). Implementations authenticate on every call; callers
/// that want reuse hold the credential behind an `Arc` and decide their own
/// lifecycle.
///
/// # Examples
///
/// ```no_run
/// use cosmos_connect::auth::{AccessToken, CredentialError, TokenCredential};
/// use async_trait::async_trait;
///
/// struct MyCredential;
///
/// #[async_trait]
/// impl TokenCredential for MyCredential {
///     async fn get_token(&self, _scopes: &[&str]) -> Result<AccessToken, CredentialError> {
///         Ok(AccessToken::new("example_token"))
///     }
/// }
/// ```
#[async_trait]
pub trait TokenCredential: Send + Sync {
    /// Acquires a bearer token valid for the requested scopes.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] if the credential is misconfigured, the
    /// identity provider is unreachable or rejects the request, or the
    /// response cannot be decoded.
    async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken, CredentialError>;
}

/// Credential that hands out one fixed, pre-acquired token.
///
/// Useful when a token is brokered by the host environment, and in tests that
/// stub the management API without standing up an identity provider.
pub struct StaticTokenCredential {
    token: String,
}

impl StaticTokenCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenCredential for StaticTokenCredential {
    async fn get_token(&self, _scopes: &[&str]) -> Result<AccessToken, CredentialError> {
        Ok(AccessToken::new(self.token.clone()))
    }
}

/// Converts an OAuth2 scope into the legacy `resource` form expected by IMDS
/// and the Azure CLI, by stripping the `/.default` suffix.
pub(super) fn scope_to_resource(scope: &str) -> &str {
    scope.strip_suffix("/.default").unwrap_or(scope)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_output_redacts_the_token() {
        let token = AccessToken::with_expiry("super-secret-token", 3600);
        let rendered = format!("{token:?}");
        assert!(!rendered.contains("super-secret-token"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_scope_maps_to_resource_by_dropping_default_suffix() {
        assert_eq!(
            scope_to_resource("https://management.azure.com/.default"),
            "https://management.azure.com"
        );
        assert_eq!(
            scope_to_resource("https://management.azure.com"),
            "https://management.azure.com"
        );
    }

    #[tokio::test]
    async fn test_static_credential_returns_the_configured_token() {
        let credential = StaticTokenCredential::new("fixed");
        let token = credential
            .get_token(&["https://management.azure.com/.default"])
            .await
            .unwrap();
        assert_eq!(token.secret(), "fixed");
        assert!(token.expires_on().is_none());
    }
}
