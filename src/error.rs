use crate::auth::CredentialError;
use thiserror::Error;

/// Error type for connection resolution.
///
/// Every failure mode of [`crate::resolver::ConnectionResolver::resolve`] maps
/// to exactly one variant and surfaces to the caller unchanged. There is no
/// retry and no partial result: either a complete
/// [`crate::resolver::ResolvedConnection`] is produced or the operation fails
/// as a whole.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The account identifier is empty or not in canonical resource-ID form.
    #[error("invalid Cosmos DB account identifier: {0}")]
    InvalidAccountId(String),

    /// The credential could not produce a management-API token. When this is
    /// returned, no management call has been issued.
    #[error("credential failed to produce a management API token: {0}")]
    Credential(#[from] CredentialError),

    /// The HTTP request could not be sent or completed.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The management API answered with a non-success status. The raw response
    /// body is kept verbatim; ARM error payloads are not interpreted.
    #[error("{operation} returned HTTP {status}: {body}")]
    Api {
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// The response body did not match the expected JSON shape.
    #[error("malformed {operation} response: {source}")]
    Deserialize {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl ResolveError {
    pub(crate) fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            url: url.into(),
            source,
        }
    }

    pub(crate) fn api(operation: &'static str, status: u16, body: impl Into<String>) -> Self {
        Self::Api {
            operation,
            status,
            body: body.into(),
        }
    }

    pub(crate) fn deserialize(operation: &'static str, source: serde_json::Error) -> Self {
        Self::Deserialize { operation, source }
    }

    /// Returns the HTTP status code when the failure was a management-API
    /// status error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result alias for resolver operations.
pub type ResolveResult<T> = Result<T, ResolveError>;
