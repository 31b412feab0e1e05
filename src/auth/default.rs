use super::azure_cli::AzureCliCredential;
use super::client_secret::{
    ClientSecretCredential, AZURE_CLIENT_ID, AZURE_CLIENT_SECRET, AZURE_TENANT_ID,
};
use super::credential::{AccessToken, CredentialError, TokenCredential};
use super::managed_identity::{ManagedIdentityCredential, IDENTITY_ENDPOINT};
use crate::utils::env;
use async_trait::async_trait;

/// Options for [`DefaultCredential`] construction.
#[derive(Debug, Clone, Default)]
pub struct DefaultCredentialOptions {
    /// Tenant to authenticate against, overriding `AZURE_TENANT_ID` and the
    /// CLI's default tenant. Used when the resolving process runs in one
    /// tenant but the Cosmos DB account lives in another.
    pub tenant_id: Option<String>,
}

/// Which concrete credential a [`DefaultCredential`] selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    ClientSecret,
    ManagedIdentity,
    AzureCli,
}

/// Ambient credential that picks an authentication method from the
/// environment, once, at construction:
///
/// 1. `AZURE_TENANT_ID` + `AZURE_CLIENT_ID` + `AZURE_CLIENT_SECRET` →
///    [`ClientSecretCredential`]
/// 2. `IDENTITY_ENDPOINT` → [`ManagedIdentityCredential`]
/// 3. otherwise → [`AzureCliCredential`]
///
/// The selection is an ordinary value: construct it at startup, wrap it in an
/// `Arc`, and hand it to whatever needs tokens.
pub struct DefaultCredential {
    inner: Box<dyn TokenCredential>,
    source: CredentialSource,
}

impl DefaultCredential {
    /// Selects a credential from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::MissingConfiguration`] when the detected
    /// method is incompletely configured (e.g. `IDENTITY_ENDPOINT` without
    /// `IDENTITY_HEADER`).
    pub fn new() -> Result<Self, CredentialError> {
        Self::with_options(DefaultCredentialOptions::default())
    }

    pub fn with_options(options: DefaultCredentialOptions) -> Result<Self, CredentialError> {
        let tenant_id = options
            .tenant_id
            .or_else(|| env::optional_var(AZURE_TENANT_ID));
        let client_id = env::optional_var(AZURE_CLIENT_ID);
        let client_secret = env::optional_var(AZURE_CLIENT_SECRET);

        let has_service_principal =
            tenant_id.is_some() && client_id.is_some() && client_secret.is_some();
        let has_identity_endpoint = env::optional_var(IDENTITY_ENDPOINT).is_some();
        let source = detect_source(has_service_principal, has_identity_endpoint);

        let inner: Box<dyn TokenCredential> = match source {
            CredentialSource::ClientSecret => {
                log::info!("Using service principal credentials from environment");
                // Presence was checked above.
                let (tenant, client, secret) = match (tenant_id, client_id, client_secret) {
                    (Some(t), Some(c), Some(s)) => (t, c, s),
                    _ => {
                        return Err(CredentialError::MissingConfiguration(
                            "incomplete service principal configuration".to_string(),
                        ));
                    }
                };
                Box::new(ClientSecretCredential::new(tenant, client, secret))
            }
            CredentialSource::ManagedIdentity => {
                log::info!("Using managed identity credential");
                Box::new(ManagedIdentityCredential::from_env()?)
            }
            CredentialSource::AzureCli => {
                log::info!("Using Azure CLI credential");
                Box::new(match tenant_id {
                    Some(tenant) => AzureCliCredential::with_tenant(tenant),
                    None => AzureCliCredential::new(),
                })
            }
        };

        Ok(Self { inner, source })
    }

    /// The authentication method this credential settled on.
    pub fn source(&self) -> CredentialSource {
        self.source
    }
}

#[async_trait]
impl TokenCredential for DefaultCredential {
    async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken, CredentialError> {
        self.inner.get_token(scopes).await
    }
}

fn detect_source(has_service_principal: bool, has_identity_endpoint: bool) -> CredentialSource {
    if has_service_principal {
        CredentialSource::ClientSecret
    } else if has_identity_endpoint {
        CredentialSource::ManagedIdentity
    } else {
        CredentialSource::AzureCli
    }
}
