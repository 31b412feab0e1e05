use claims::assert_some;
use cosmos_connect::auth::{
    ClientSecretCredential, CredentialError, ManagedIdentityCredential, TokenCredential,
};
use cosmos_connect::management::MANAGEMENT_SCOPE;
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// The client-credentials grant against a stub authority
mod client_secret_flow {
    use super::*;

    const TENANT: &str = "test-tenant";
    const TOKEN_PATH: &str = "/test-tenant/oauth2/v2.0/token";

    fn credential_against(server: &MockServer) -> ClientSecretCredential {
        ClientSecretCredential::new(TENANT, "client-123", "secret-456")
            .with_authority_host(server.uri())
    }

    #[tokio::test]
    async fn test_client_secret_posts_the_grant_and_returns_the_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("grant_type=client_credentials"))
            .and(body_string_contains("client_id=client-123"))
            .and(body_string_contains("client_secret=secret-456"))
            .and(body_string_contains(
                "scope=https%3A%2F%2Fmanagement.azure.com%2F.default",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token_type": "Bearer",
                "expires_in": 3599,
                "access_token": "issued-token"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let credential = credential_against(&server);
        let token = credential.get_token(&[MANAGEMENT_SCOPE]).await.unwrap();

        assert_eq!(token.secret(), "issued-token");
        assert_some!(token.expires_on());
    }

    #[tokio::test]
    async fn test_client_secret_rejection_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_client",
                "error_description": "AADSTS7000215: Invalid client secret provided."
            })))
            .mount(&server)
            .await;

        let credential = credential_against(&server);
        let err = credential.get_token(&[MANAGEMENT_SCOPE]).await.unwrap_err();

        match err {
            CredentialError::Rejected { status, body } => {
                assert_eq!(status, 400);
                assert!(
                    body.contains("AADSTS7000215"),
                    "authority diagnostics should be preserved, got: {body}"
                );
            }
            other => panic!("Expected Rejected error, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_client_secret_garbage_response_is_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("<html>proxy intercepted</html>"),
            )
            .mount(&server)
            .await;

        let credential = credential_against(&server);
        let err = credential.get_token(&[MANAGEMENT_SCOPE]).await.unwrap_err();

        assert!(
            matches!(err, CredentialError::InvalidResponse(_)),
            "expected InvalidResponse, got: {err:?}"
        );
    }
}

// The managed-identity GET against a stub metadata endpoint
mod managed_identity_flow {
    use super::*;

    const METADATA_PATH: &str = "/metadata/identity/oauth2/token";

    fn credential_against(server: &MockServer) -> ManagedIdentityCredential {
        ManagedIdentityCredential::imds()
            .with_endpoint(format!("{}{METADATA_PATH}", server.uri()))
    }

    #[tokio::test]
    async fn test_imds_request_shape_and_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(METADATA_PATH))
            .and(query_param("api-version", "2018-02-01"))
            .and(query_param("resource", "https://management.azure.com"))
            .and(header("Metadata", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "imds-token",
                "expires_in": "3599",
                "resource": "https://management.azure.com",
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let credential = credential_against(&server);
        let token = credential.get_token(&[MANAGEMENT_SCOPE]).await.unwrap();

        assert_eq!(token.secret(), "imds-token");
        assert_some!(token.expires_on());
    }

    #[tokio::test]
    async fn test_managed_identity_requires_a_scope() {
        let credential = ManagedIdentityCredential::imds();
        let err = credential.get_token(&[]).await.unwrap_err();

        assert!(
            matches!(err, CredentialError::MissingConfiguration(_)),
            "expected MissingConfiguration, got: {err:?}"
        );
    }

    #[tokio::test]
    async fn test_managed_identity_rejection_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(METADATA_PATH))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_request",
                "error_description": "Identity not found"
            })))
            .mount(&server)
            .await;

        let credential = credential_against(&server);
        let err = credential.get_token(&[MANAGEMENT_SCOPE]).await.unwrap_err();

        match err {
            CredentialError::Rejected { status, body } => {
                assert_eq!(status, 400);
                assert!(body.contains("Identity not found"));
            }
            other => panic!("Expected Rejected error, got: {other:?}"),
        }
    }
}
