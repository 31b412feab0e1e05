use super::credential::{AccessToken, CredentialError, TokenCredential};
use crate::utils::env;
use async_trait::async_trait;
use serde::Deserialize;

const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// Environment variables forming the conventional service-principal triple.
pub const AZURE_TENANT_ID: &str = "AZURE_TENANT_ID";
pub const AZURE_CLIENT_ID: &str = "AZURE_CLIENT_ID";
pub const AZURE_CLIENT_SECRET: &str = "AZURE_CLIENT_SECRET";

/// Service-principal credential using the OAuth2 client-credentials grant.
///
/// Posts a form to `{authority}/{tenant}/oauth2/v2.0/token` and returns the
/// issued access token. Every [`get_token`](TokenCredential::get_token) call
/// performs a fresh grant.
pub struct ClientSecretCredential {
    tenant_id: String,
    client_id: String,
    client_secret: String,
    authority_host: String,
    http_client: reqwest::Client,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

impl ClientSecretCredential {
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            authority_host: DEFAULT_AUTHORITY_HOST.to_string(),
            http_client: reqwest::Client::new(),
        }
    }

    /// Builds the credential from `AZURE_TENANT_ID`, `AZURE_CLIENT_ID` and
    /// `AZURE_CLIENT_SECRET`.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::MissingConfiguration`] when any of the three
    /// variables is unset or empty.
    pub fn from_env() -> Result<Self, CredentialError> {
        let read = |name: &str| {
            env::required_var(name).map_err(|e| CredentialError::MissingConfiguration(e.to_string()))
        };
        Ok(Self::new(
            read(AZURE_TENANT_ID)?,
            read(AZURE_CLIENT_ID)?,
            read(AZURE_CLIENT_SECRET)?,
        ))
    }

    /// Overrides the authority host (sovereign clouds, local test stubs).
    pub fn with_authority_host(mut self, authority_host: impl Into<String>) -> Self {
        self.authority_host = authority_host.into();
        self
    }

    fn token_url(&self) -> String {
        format!("{}/{}/oauth2/v2.0/token", self.authority_host, self.tenant_id)
    }
}

#[async_trait]
impl TokenCredential for ClientSecretCredential {
    async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken, CredentialError> {
        let token_url = self.token_url();
        let scope = scopes.join(" ");
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", scope.as_str()),
        ];

        log::debug!("Requesting client-credentials token from {token_url}");

        let response = self
            .http_client
            .post(&token_url)
            .form(&params)
            .send()
            .await
            .map_err(|source| CredentialError::Request {
                url: token_url.clone(),
                source,
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| CredentialError::Request {
                url: token_url,
                source,
            })?;

        if !status.is_success() {
            return Err(CredentialError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let token_response: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| CredentialError::InvalidResponse(e.to_string()))?;

        Ok(AccessToken::with_expiry(
            token_response.access_token,
            token_response.expires_in,
        ))
    }
}
