//! # Cosmos Connect
//!
//! Connect database-context configuration builders to Azure Cosmos DB by
//! account identity instead of endpoint and key. Given a credential and the
//! account's ARM coordinates, this library resolves the account's document
//! endpoint and primary master key through the Azure management API at
//! startup, so connection secrets never have to live in application
//! configuration.
//!
//! ## Modules
//!
//! - [`auth`] - Credentials and Azure AD token acquisition
//! - [`builder`] - Configuration-builder traits and the `use_cosmos` extension
//! - [`error`] - The resolution error taxonomy
//! - [`management`] - Azure management API client (account metadata, listKeys)
//! - [`resolver`] - The connection resolver itself
//! - [`resource`] - Cosmos DB account identifiers
//! - [`utils`] - Utility functions and helpers

pub mod auth;
pub mod builder;
pub mod error;
pub mod management;
pub mod resolver;
pub mod resource;
pub mod utils;

pub use builder::{CosmosConfigBuilder, UseCosmos};
pub use error::{ResolveError, ResolveResult};
pub use resolver::{ConnectionResolver, ResolvedConnection};
pub use resource::CosmosAccountId;
