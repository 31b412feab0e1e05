use crate::auth::TokenCredential;
use crate::builder::CosmosConfigBuilder;
use crate::error::ResolveResult;
use crate::management::{ManagementClient, MANAGEMENT_SCOPE};
use crate::resource::CosmosAccountId;
use std::fmt;
use std::sync::Arc;

/// Everything a database client needs to connect: account endpoint, primary
/// read-write key, and the database to open.
///
/// Built fresh on every [`ConnectionResolver::resolve`] call and never cached.
/// `Debug` redacts the key.
#[derive(Clone)]
pub struct ResolvedConnection {
    pub endpoint: String,
    pub primary_key: String,
    pub database: String,
}

impl ResolvedConnection {
    /// Hands the connection triple to a configuration builder.
    pub fn apply<B: CosmosConfigBuilder>(&self, builder: B) -> B {
        builder.with_cosmos_account(&self.endpoint, &self.primary_key, &self.database)
    }
}

impl fmt::Debug for ResolvedConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedConnection")
            .field("endpoint", &self.endpoint)
            .field("primary_key", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

/// Resolves Cosmos DB connection details through the Azure management API.
///
/// Holds the credential injected at construction and a [`ManagementClient`];
/// both are cheap to share, so one resolver per process is the expected
/// shape. Resolution itself is stateless: every call re-authenticates and
/// re-queries, and concurrent calls proceed independently.
pub struct ConnectionResolver {
    credential: Arc<dyn TokenCredential>,
    management: ManagementClient,
}

impl ConnectionResolver {
    /// Resolver against the public Azure management endpoint.
    pub fn new(credential: Arc<dyn TokenCredential>) -> Self {
        Self::with_management_client(credential, ManagementClient::new())
    }

    /// Resolver with an explicit management client (sovereign clouds, test
    /// stubs).
    pub fn with_management_client(
        credential: Arc<dyn TokenCredential>,
        management: ManagementClient,
    ) -> Self {
        Self {
            credential,
            management,
        }
    }

    /// Resolves the account's endpoint and primary key using the resolver's
    /// own credential.
    ///
    /// # Errors
    ///
    /// Any failure along the way is fatal to the call: an invalid account
    /// identifier, a credential that cannot produce a token (in which case no
    /// management request is issued), a management call that fails or returns
    /// a non-success status, or an undecodable payload.
    pub async fn resolve(
        &self,
        account: &CosmosAccountId,
        database: &str,
    ) -> ResolveResult<ResolvedConnection> {
        self.resolve_with_credential(account, database, self.credential.as_ref())
            .await
    }

    /// Resolves with a caller-supplied credential instead of the resolver's
    /// own, for hosts that authenticate per tenant.
    pub async fn resolve_with_credential(
        &self,
        account: &CosmosAccountId,
        database: &str,
        credential: &dyn TokenCredential,
    ) -> ResolveResult<ResolvedConnection> {
        account.validate()?;

        log::debug!("Resolving Cosmos DB connection for {account}");

        let token = credential.get_token(&[MANAGEMENT_SCOPE]).await?;

        // Metadata and keys are independent once the token is in hand.
        let (metadata, keys) = tokio::try_join!(
            self.management.get_database_account(token.secret(), account),
            self.management.list_account_keys(token.secret(), account),
        )?;

        log::info!(
            "Resolved Cosmos DB endpoint {} for {account}",
            metadata.properties.document_endpoint
        );

        Ok(ResolvedConnection {
            endpoint: metadata.properties.document_endpoint,
            primary_key: keys.primary_master_key,
            database: database.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AccessToken, CredentialError};
    use crate::error::ResolveError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingCredential {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TokenCredential for CountingCredential {
        async fn get_token(&self, _scopes: &[&str]) -> Result<AccessToken, CredentialError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(AccessToken::new("token"))
        }
    }

    struct FailingCredential;

    #[async_trait]
    impl TokenCredential for FailingCredential {
        async fn get_token(&self, _scopes: &[&str]) -> Result<AccessToken, CredentialError> {
            Err(CredentialError::MissingConfiguration(
                "no credentials".to_string(),
            ))
        }
    }

    #[tokio::test]
    async fn test_invalid_account_fails_before_authentication() {
        let credential = Arc::new(CountingCredential {
            calls: AtomicUsize::new(0),
        });
        let resolver = ConnectionResolver::new(credential.clone());
        let account = CosmosAccountId::from_path("not-a-resource-id");

        let err = resolver.resolve(&account, "mydb").await.unwrap_err();
        assert!(matches!(err, ResolveError::InvalidAccountId(_)));
        assert_eq!(credential.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_credential_failure_propagates_as_credential_error() {
        let resolver = ConnectionResolver::new(Arc::new(FailingCredential));
        let account = CosmosAccountId::from_components("abc", "rg1", "acct1");

        let err = resolver.resolve(&account, "mydb").await.unwrap_err();
        assert!(matches!(err, ResolveError::Credential(_)));
    }

    #[test]
    fn test_debug_output_redacts_the_primary_key() {
        let connection = ResolvedConnection {
            endpoint: "https://acct1.documents.azure.com:443/".to_string(),
            primary_key: "KEYVALUE==".to_string(),
            database: "mydb".to_string(),
        };

        let rendered = format!("{connection:?}");
        assert!(!rendered.contains("KEYVALUE=="));
        assert!(rendered.contains("https://acct1.documents.azure.com:443/"));
    }
}
