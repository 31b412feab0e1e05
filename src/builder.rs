use crate::auth::TokenCredential;
use crate::error::ResolveResult;
use crate::resolver::ConnectionResolver;
use crate::resource::CosmosAccountId;
use async_trait::async_trait;

/// Sink for resolved connection details.
///
/// Database-context configuration builders implement this one method to
/// receive the endpoint, primary key and database name; what they do with the
/// triple is their business. The builder is taken and returned by value so
/// implementations keep their fluent style.
pub trait CosmosConfigBuilder: Sized {
    fn with_cosmos_account(self, endpoint: &str, primary_key: &str, database: &str) -> Self;
}

/// Extension that connects a configuration builder to Cosmos DB by account
/// identity instead of endpoint and key.
///
/// Implemented for every [`CosmosConfigBuilder`]; both methods resolve
/// through the given [`ConnectionResolver`] and then apply the result,
/// returning the builder for further chaining.
///
/// # Examples
///
/// ```no_run
/// use cosmos_connect::auth::DefaultCredential;
/// use cosmos_connect::builder::{CosmosConfigBuilder, UseCosmos};
/// use cosmos_connect::resolver::ConnectionResolver;
/// use cosmos_connect::resource::CosmosAccountId;
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct ContextOptionsBuilder {
///     endpoint: String,
///     key: String,
///     database: String,
/// }
///
/// impl CosmosConfigBuilder for ContextOptionsBuilder {
///     fn with_cosmos_account(mut self, endpoint: &str, primary_key: &str, database: &str) -> Self {
///         self.endpoint = endpoint.to_string();
///         self.key = primary_key.to_string();
///         self.database = database.to_string();
///         self
///     }
/// }
///
/// # async fn configure() -> Result<(), cosmos_connect::error::ResolveError> {
/// let credential = Arc::new(DefaultCredential::new()?);
/// let resolver = ConnectionResolver::new(credential);
/// let account = CosmosAccountId::from_components("abc", "rg1", "acct1");
///
/// let options = ContextOptionsBuilder::default()
///     .use_cosmos(&resolver, &account, "mydb")
///     .await?;
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait UseCosmos: CosmosConfigBuilder + Send {
    /// Resolves with the resolver's own credential and applies the result.
    async fn use_cosmos(
        self,
        resolver: &ConnectionResolver,
        account: &CosmosAccountId,
        database: &str,
    ) -> ResolveResult<Self> {
        let connection = resolver.resolve(account, database).await?;
        Ok(connection.apply(self))
    }

    /// Resolves with a caller-supplied credential and applies the result.
    async fn use_cosmos_with_credential(
        self,
        resolver: &ConnectionResolver,
        account: &CosmosAccountId,
        database: &str,
        credential: &dyn TokenCredential,
    ) -> ResolveResult<Self> {
        let connection = resolver
            .resolve_with_credential(account, database, credential)
            .await?;
        Ok(connection.apply(self))
    }
}

impl<B: CosmosConfigBuilder + Send> UseCosmos for B {}
