use crate::error::ResolveError;
use std::fmt;

/// Identifies a Cosmos DB account in Azure Resource Manager.
///
/// Accounts can be named either by their coordinates (subscription, resource
/// group, account name) or by a pre-formed ARM resource ID. Both forms render
/// to the same canonical path:
///
/// `/subscriptions/{sub}/resourceGroups/{rg}/providers/Microsoft.DocumentDB/databaseAccounts/{account}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CosmosAccountId {
    /// Account named by its coordinates.
    ByComponents {
        subscription_id: String,
        resource_group: String,
        account_name: String,
    },
    /// Account named by a full ARM resource ID.
    ByPath(String),
}

impl CosmosAccountId {
    /// Identifies an account by subscription, resource group and account name.
    pub fn from_components(
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
        account_name: impl Into<String>,
    ) -> Self {
        Self::ByComponents {
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
            account_name: account_name.into(),
        }
    }

    /// Identifies an account by its ARM resource ID.
    pub fn from_path(path: impl Into<String>) -> Self {
        Self::ByPath(path.into())
    }

    /// Renders the canonical ARM resource path for this account.
    ///
    /// Pure string interpolation: component values are spliced in verbatim,
    /// exactly as they will appear in the request URL.
    pub fn resource_path(&self) -> String {
        match self {
            Self::ByComponents {
                subscription_id,
                resource_group,
                account_name,
            } => format!(
                "/subscriptions/{subscription_id}/resourceGroups/{resource_group}/providers/Microsoft.DocumentDB/databaseAccounts/{account_name}"
            ),
            Self::ByPath(path) => path.clone(),
        }
    }

    /// Checks the preconditions for using this identifier in a management
    /// call: components must be non-empty, and a pre-formed path must be in
    /// canonical Cosmos DB resource-ID form.
    pub fn validate(&self) -> Result<(), ResolveError> {
        match self {
            Self::ByComponents {
                subscription_id,
                resource_group,
                account_name,
            } => {
                if subscription_id.trim().is_empty() {
                    return Err(ResolveError::InvalidAccountId(
                        "subscription id must not be empty".to_string(),
                    ));
                }
                if resource_group.trim().is_empty() {
                    return Err(ResolveError::InvalidAccountId(
                        "resource group must not be empty".to_string(),
                    ));
                }
                if account_name.trim().is_empty() {
                    return Err(ResolveError::InvalidAccountId(
                        "account name must not be empty".to_string(),
                    ));
                }
                Ok(())
            }
            Self::ByPath(path) => match split_resource_path(path) {
                Some(_) => Ok(()),
                None => Err(ResolveError::InvalidAccountId(format!(
                    "'{path}' is not a Cosmos DB account resource ID \
                     (/subscriptions/{{sub}}/resourceGroups/{{rg}}/providers/Microsoft.DocumentDB/databaseAccounts/{{account}})"
                ))),
            },
        }
    }

    /// The subscription ID, if it can be read from this identifier.
    pub fn subscription_id(&self) -> Option<&str> {
        match self {
            Self::ByComponents {
                subscription_id, ..
            } => Some(subscription_id),
            Self::ByPath(path) => split_resource_path(path).map(|(sub, _, _)| sub),
        }
    }

    /// The resource group name, if it can be read from this identifier.
    pub fn resource_group(&self) -> Option<&str> {
        match self {
            Self::ByComponents { resource_group, .. } => Some(resource_group),
            Self::ByPath(path) => split_resource_path(path).map(|(_, rg, _)| rg),
        }
    }

    /// The account name, if it can be read from this identifier.
    pub fn account_name(&self) -> Option<&str> {
        match self {
            Self::ByComponents { account_name, .. } => Some(account_name),
            Self::ByPath(path) => split_resource_path(path).map(|(_, _, account)| account),
        }
    }
}

impl fmt::Display for CosmosAccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.resource_path())
    }
}

/// Splits a resource ID into (subscription, resource group, account name),
/// returning `None` unless the path has the canonical nine-segment shape.
/// Keyword segments are matched case-insensitively; ARM tolerates either
/// casing in IDs it hands back.
fn split_resource_path(path: &str) -> Option<(&str, &str, &str)> {
    let parts: Vec<&str> = path.split('/').collect();
    if parts.len() != 9 || !parts[0].is_empty() {
        return None;
    }

    let keyword = |index: usize, expected: &str| parts[index].eq_ignore_ascii_case(expected);
    if !keyword(1, "subscriptions")
        || !keyword(3, "resourceGroups")
        || !keyword(5, "providers")
        || !keyword(6, "Microsoft.DocumentDB")
        || !keyword(7, "databaseAccounts")
    {
        return None;
    }

    let (sub, rg, account) = (parts[2], parts[4], parts[8]);
    if sub.is_empty() || rg.is_empty() || account.is_empty() {
        return None;
    }
    Some((sub, rg, account))
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::{assert_err, assert_ok};

    const CANONICAL: &str =
        "/subscriptions/abc/resourceGroups/rg1/providers/Microsoft.DocumentDB/databaseAccounts/acct1";

    #[test]
    fn test_components_render_the_canonical_path() {
        let id = CosmosAccountId::from_components("abc", "rg1", "acct1");
        assert_eq!(id.resource_path(), CANONICAL);
        assert_eq!(id.to_string(), CANONICAL);
    }

    #[test]
    fn test_path_form_is_passed_through_verbatim() {
        let id = CosmosAccountId::from_path(CANONICAL);
        assert_eq!(id.resource_path(), CANONICAL);
        assert_ok!(id.validate());
    }

    #[test]
    fn test_both_forms_expose_the_same_components() {
        let by_components = CosmosAccountId::from_components("abc", "rg1", "acct1");
        let by_path = CosmosAccountId::from_path(CANONICAL);

        for id in [by_components, by_path] {
            assert_eq!(id.subscription_id(), Some("abc"));
            assert_eq!(id.resource_group(), Some("rg1"));
            assert_eq!(id.account_name(), Some("acct1"));
        }
    }

    #[test]
    fn test_keyword_segments_match_case_insensitively() {
        let id = CosmosAccountId::from_path(
            "/subscriptions/abc/resourcegroups/rg1/providers/microsoft.documentdb/databaseaccounts/acct1",
        );
        assert_ok!(id.validate());
        assert_eq!(id.account_name(), Some("acct1"));
    }

    #[test]
    fn test_empty_components_fail_validation() {
        let id = CosmosAccountId::from_components("", "rg1", "acct1");
        let err = assert_err!(id.validate());
        assert!(matches!(err, ResolveError::InvalidAccountId(_)));

        let id = CosmosAccountId::from_components("abc", "  ", "acct1");
        assert_err!(id.validate());

        let id = CosmosAccountId::from_components("abc", "rg1", "");
        assert_err!(id.validate());
    }

    #[test]
    fn test_malformed_paths_fail_validation() {
        let malformed = [
            "",
            "acct1",
            "subscriptions/abc/resourceGroups/rg1/providers/Microsoft.DocumentDB/databaseAccounts/acct1",
            "/subscriptions/abc/resourceGroups/rg1",
            "/subscriptions/abc/resourceGroups/rg1/providers/Microsoft.ServiceBus/namespaces/ns1",
            "/subscriptions//resourceGroups/rg1/providers/Microsoft.DocumentDB/databaseAccounts/acct1",
            "/subscriptions/abc/resourceGroups/rg1/providers/Microsoft.DocumentDB/databaseAccounts/",
            "/subscriptions/abc/resourceGroups/rg1/providers/Microsoft.DocumentDB/databaseAccounts/acct1/extra",
        ];

        for path in malformed {
            let id = CosmosAccountId::from_path(path);
            let err = assert_err!(id.validate());
            assert!(
                matches!(err, ResolveError::InvalidAccountId(_)),
                "expected InvalidAccountId for {path:?}"
            );
            assert_eq!(id.account_name(), None);
        }
    }
}
