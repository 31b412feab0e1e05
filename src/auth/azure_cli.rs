use super::credential::{scope_to_resource, AccessToken, CredentialError, TokenCredential};
use async_trait::async_trait;
use serde::Deserialize;
use std::process::Stdio;
use tokio::process::Command;

/// Credential backed by a logged-in Azure CLI.
///
/// Shells out to `az account get-access-token` for every call, so it inherits
/// whatever account `az login` established. Intended for developer machines;
/// on hosted compute prefer [`super::ManagedIdentityCredential`].
#[derive(Default)]
pub struct AzureCliCredential {
    tenant_id: Option<String>,
}

#[derive(Deserialize)]
struct CliTokenOutput {
    #[serde(rename = "accessToken")]
    access_token: String,
}

impl AzureCliCredential {
    pub fn new() -> Self {
        Self { tenant_id: None }
    }

    /// Requests tokens from a specific tenant instead of the CLI default.
    pub fn with_tenant(tenant_id: impl Into<String>) -> Self {
        Self {
            tenant_id: Some(tenant_id.into()),
        }
    }
}

#[async_trait]
impl TokenCredential for AzureCliCredential {
    async fn get_token(&self, scopes: &[&str]) -> Result<AccessToken, CredentialError> {
        let scope = scopes.first().copied().ok_or_else(|| {
            CredentialError::MissingConfiguration("at least one scope is required".to_string())
        })?;
        let resource = scope_to_resource(scope);

        let mut args = vec!["account", "get-access-token", "--resource", resource];
        if let Some(tenant_id) = self.tenant_id.as_deref() {
            args.extend(["--tenant", tenant_id]);
        }
        args.extend(["--output", "json"]);

        log::debug!("Requesting token via az account get-access-token");

        let output = Command::new("az")
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    CredentialError::Cli(
                        "az command not found; install the Azure CLI or use another credential"
                            .to_string(),
                    )
                } else {
                    CredentialError::Cli(format!("failed to launch az: {e}"))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CredentialError::Cli(format!(
                "az account get-access-token exited with {}: {}; run 'az login' first",
                output.status.code().unwrap_or(-1),
                stderr.trim()
            )));
        }

        let parsed: CliTokenOutput = serde_json::from_slice(&output.stdout)
            .map_err(|e| CredentialError::Cli(format!("unparseable az output: {e}")))?;

        // The CLI reports expiry as a local wall-clock timestamp; treat its
        // tokens as expiry-unknown rather than parse that format.
        Ok(AccessToken::new(parsed.access_token))
    }
}
