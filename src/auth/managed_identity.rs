use super::credential::{scope_to_resource, AccessToken, CredentialError, TokenCredential};
use crate::utils::env;
use async_trait::async_trait;
use serde::Deserialize;

const IMDS_TOKEN_ENDPOINT: &str = "http://169.254.169.254/metadata/identity/oauth2/token";
const IMDS_API_VERSION: &str = "2018-02-01";
const APP_SERVICE_API_VERSION: &str = "2019-08-01";

/// Environment variables set by App Service / Container Apps managed identity.
pub const IDENTITY_ENDPOINT: &str = "IDENTITY_ENDPOINT";
pub const IDENTITY_HEADER: &str = "IDENTITY_HEADER";

/// Managed-identity credential for Azure-hosted compute.
///
/// Speaks either the IMDS protocol (VMs, VM scale sets) or the App Service
/// variant, depending on how it was constructed. Both are a single
/// authenticated GET against a local token endpoint, with the requested scope
/// translated to the legacy `resource` parameter.
pub struct ManagedIdentityCredential {
    endpoint: String,
    identity_header: Option<String>,
    api_version: &'static str,
    http_client: reqwest::Client,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    // IMDS reports expires_in as a decimal string, App Service omits it.
    #[serde(default, deserialize_with = "expires_in_opt")]
    expires_in: Option<u64>,
}

impl ManagedIdentityCredential {
    /// Credential against the instance metadata service at its well-known
    /// link-local address.
    pub fn imds() -> Self {
        Self {
            endpoint: IMDS_TOKEN_ENDPOINT.to_string(),
            identity_header: None,
            api_version: IMDS_API_VERSION,
            http_client: reqwest::Client::new(),
        }
    }

    /// Credential against the App Service identity endpoint announced through
    /// `IDENTITY_ENDPOINT` and `IDENTITY_HEADER`.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::MissingConfiguration`] when either variable
    /// is unset or empty.
    pub fn app_service() -> Result<Self, CredentialError> {
        let read = |name: &str| {
            env::required_var(name).map_err(|e| CredentialError::MissingConfiguration(e.to_string()))
        };
        Ok(Self {
            endpoint: read(IDENTITY_ENDPOINT)?,
            identity_header: Some(read(IDENTITY_HEADER)?),
            api_version: APP_SERVICE_API_VERSION,
            http_client: reqwest::Client::new(),
        })
    }

    /// Picks the App Service variant when `IDENTITY_ENDPOINT` is present,
    /// IMDS otherwise.
    pub fn from_env() -> Result<Self, CredentialError> {
        if env::optional_var(IDENTITY_ENDPOINT).is_some() {
            Self::app_service()
        } else {
            Ok(Self::imds())
        }
    }

    /// Overrides the token endpoint (tests; non-standard hosts).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl TokenCredential for ManagedIdentityCredential {
    async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken, CredentialError> {
        let scope = scopes.first().copied().ok_or_else(|| {
            CredentialError::MissingConfiguration("at least one scope is required".to_string())
        })?;
        let resource = scope_to_resource(scope);

        log::debug!("Requesting managed identity token from {}", self.endpoint);

        let mut request = self
            .http_client
            .get(&self.endpoint)
            .query(&[("api-version", self.api_version), ("resource", resource)]);
        request = match &self.identity_header {
            Some(header) => request.header("X-IDENTITY-HEADER", header),
            None => request.header("Metadata", "true"),
        };

        let response = request.send().await.map_err(|source| CredentialError::Request {
            url: self.endpoint.clone(),
            source,
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| CredentialError::Request {
                url: self.endpoint.clone(),
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

        Ok(match token_response.expires_in {
            Some(secs) => AccessToken::with_expiry(token_response.access_token, secs),
            None => AccessToken::new(token_response.access_token),
        })
    }
}

fn expires_in_opt<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        None => None,
        Some(Raw::Number(n)) => Some(n),
        Some(Raw::Text(s)) => s.parse().ok(),
    })
}
