//! Validated access to environment variables.
//!
//! Credential detection reads several `AZURE_*` and `IDENTITY_*` variables at
//! startup. A variable that is set but blank is as useless as one that is
//! missing, so every read trims whitespace and rejects empty values.

use thiserror::Error;

/// Errors raised when an environment variable cannot be used.
#[derive(Debug, Error)]
pub enum EnvVarError {
    /// The variable is not set at all.
    #[error("environment variable '{name}' is not set")]
    NotFound { name: String },

    /// The variable is set but empty or whitespace-only.
    #[error("environment variable '{name}' is empty")]
    Empty { name: String },

    /// The variable contains invalid UTF-8.
    #[error("environment variable '{name}' contains invalid UTF-8")]
    InvalidUtf8 { name: String },
}

/// Reads a required environment variable, trimming whitespace and rejecting
/// empty values.
pub fn required_var(name: &str) -> Result<String, EnvVarError> {
    match std::env::var(name) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                Err(EnvVarError::Empty {
                    name: name.to_string(),
                })
            } else {
                Ok(trimmed.to_string())
            }
        }
        Err(std::env::VarError::NotPresent) => Err(EnvVarError::NotFound {
            name: name.to_string(),
        }),
        Err(std::env::VarError::NotUnicode(_)) => Err(EnvVarError::InvalidUtf8 {
            name: name.to_string(),
        }),
    }
}

/// Reads an optional environment variable. Missing, empty and non-UTF-8 values
/// all come back as `None`.
pub fn optional_var(name: &str) -> Option<String> {
    required_var(name).ok()
}
