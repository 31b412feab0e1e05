//! Thin client for the two Azure management API calls this crate needs.
//!
//! Only the fields the resolver actually consumes are modeled; everything
//! else in the ARM payloads (locations, consistency policy, capabilities,
//! tags) is deliberately left unparsed.

use crate::error::{ResolveError, ResolveResult};
use crate::resource::CosmosAccountId;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use std::fmt;

pub const AZURE_MANAGEMENT_URL: &str = "https://management.azure.com";
pub const API_VERSION_COSMOS_DB: &str = "2021-04-15";

/// OAuth2 scope for the management plane; tokens passed to
/// [`ManagementClient`] must be issued for it.
pub const MANAGEMENT_SCOPE: &str = "https://management.azure.com/.default";

const OP_GET_ACCOUNT: &str = "get database account";
const OP_LIST_KEYS: &str = "list account keys";

#[derive(Debug, Clone)]
pub struct ManagementClient {
    endpoint: String,
    client: reqwest::Client,
}

/// Cosmos DB account metadata, reduced to the document endpoint.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DatabaseAccount {
    pub properties: DatabaseAccountProperties,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DatabaseAccountProperties {
    #[serde(rename = "documentEndpoint", alias = "DocumentEndpoint")]
    pub document_endpoint: String,
}

/// The account keys returned by `listKeys`.
///
/// Only the primary read-write key is required downstream; the sibling keys
/// come along when the payload carries them. Key fields accept both the
/// camelCase names current api-versions return and the PascalCase names of
/// older payloads. `Debug` redacts all of them.
#[derive(Clone, Deserialize, PartialEq)]
pub struct AccountKeys {
    #[serde(rename = "primaryMasterKey", alias = "PrimaryMasterKey")]
    pub primary_master_key: String,
    #[serde(rename = "secondaryMasterKey", alias = "SecondaryMasterKey")]
    pub secondary_master_key: Option<String>,
    #[serde(rename = "primaryReadonlyMasterKey", alias = "PrimaryReadonlyMasterKey")]
    pub primary_readonly_master_key: Option<String>,
    #[serde(rename = "secondaryReadonlyMasterKey", alias = "SecondaryReadonlyMasterKey")]
    pub secondary_readonly_master_key: Option<String>,
}

impl fmt::Debug for AccountKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountKeys")
            .field("primary_master_key", &"<redacted>")
            .field("secondary_master_key", &"<redacted>")
            .field("primary_readonly_master_key", &"<redacted>")
            .field("secondary_readonly_master_key", &"<redacted>")
            .finish()
    }
}

impl ManagementClient {
    /// Client against the public Azure management endpoint.
    pub fn new() -> Self {
        Self::with_endpoint(AZURE_MANAGEMENT_URL)
    }

    /// Client against a custom management endpoint (sovereign clouds, test
    /// stubs).
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Fetch the account's metadata, including the document endpoint that
    /// database clients connect to.
    pub async fn get_database_account(
        &self,
        token: &str,
        account: &CosmosAccountId,
    ) -> ResolveResult<DatabaseAccount> {
        let url = format!(
            "{}{}?api-version={}",
            self.endpoint,
            account.resource_path(),
            API_VERSION_COSMOS_DB
        );

        log::debug!("GET {url}");

        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .send()
            .await
            .map_err(|e| ResolveError::transport(&url, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ResolveError::transport(&url, e))?;

        if !status.is_success() {
            return Err(ResolveError::api(OP_GET_ACCOUNT, status.as_u16(), body));
        }

        serde_json::from_str(&body).map_err(|e| ResolveError::deserialize(OP_GET_ACCOUNT, e))
    }

    /// Fetch the account's read-write and read-only keys.
    pub async fn list_account_keys(
        &self,
        token: &str,
        account: &CosmosAccountId,
    ) -> ResolveResult<AccountKeys> {
        let url = format!(
            "{}{}/listKeys?api-version={}",
            self.endpoint,
            account.resource_path(),
            API_VERSION_COSMOS_DB
        );

        log::debug!("POST {url}");

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(CONTENT_TYPE, "application/json")
            .body("{}") // Empty JSON body required for Azure Management API POST requests
            .send()
            .await
            .map_err(|e| ResolveError::transport(&url, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ResolveError::transport(&url, e))?;

        if !status.is_success() {
            return Err(ResolveError::api(OP_LIST_KEYS, status.as_u16(), body));
        }

        serde_json::from_str(&body).map_err(|e| ResolveError::deserialize(OP_LIST_KEYS, e))
    }
}

impl Default for ManagementClient {
    fn default() -> Self {
        Self::new()
    }
}
