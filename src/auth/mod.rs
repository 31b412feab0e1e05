//! Credentials and Azure AD token acquisition.
//!
//! Everything in this module produces bearer tokens for the Azure management
//! API; nothing here talks to Cosmos DB itself. Credentials are constructed
//! explicitly (typically once at startup) and injected where they are needed,
//! usually as an `Arc<dyn TokenCredential>`. There is no process-wide
//! credential singleton and no token cache: callers that resolve twice
//! authenticate twice.

pub mod azure_cli;
pub mod client_secret;
pub mod credential;
pub mod default;
pub mod managed_identity;

pub use azure_cli::AzureCliCredential;
pub use client_secret::ClientSecretCredential;
pub use credential::{AccessToken, CredentialError, StaticTokenCredential, TokenCredential};
pub use default::{CredentialSource, DefaultCredential, DefaultCredentialOptions};
pub use managed_identity::ManagedIdentityCredential;
