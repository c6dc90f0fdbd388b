//! Tests for the tokeninfo-backed Google verifier, using a wiremock fake for
//! the provider endpoint.

use moviebase_server::auth::{GoogleVerifier, HttpGoogleVerifier};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn verifier_for(server: &MockServer) -> HttpGoogleVerifier {
    HttpGoogleVerifier::with_endpoint(
        "moviebase-client-id".to_string(),
        format!("{}/tokeninfo", server.uri()),
    )
}

#[tokio::test]
async fn test_valid_assertion_is_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tokeninfo"))
        .and(query_param("id_token", "good-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "aud": "moviebase-client-id",
            "sub": "1234567890",
            "email": "user@example.com",
            "name": "Example User",
            "picture": "https://example.com/photo.jpg"
        })))
        .mount(&server)
        .await;

    let identity = verifier_for(&server)
        .verify("good-token")
        .await
        .unwrap()
        .expect("assertion should verify");

    assert_eq!(identity.google_id, "1234567890");
    assert_eq!(identity.email, "user@example.com");
    assert_eq!(identity.name, "Example User");
    assert_eq!(identity.picture.as_deref(), Some("https://example.com/photo.jpg"));
}

#[tokio::test]
async fn test_wrong_audience_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tokeninfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "aud": "some-other-application",
            "sub": "1234567890",
            "email": "user@example.com",
            "name": "Example User"
        })))
        .mount(&server)
        .await;

    let result = verifier_for(&server).verify("foreign-token").await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_provider_error_status_is_invalid_not_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tokeninfo"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_token"
        })))
        .mount(&server)
        .await;

    let result = verifier_for(&server).verify("expired-token").await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_unparseable_body_is_invalid_not_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tokeninfo"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let result = verifier_for(&server).verify("odd-token").await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_unreachable_provider_is_an_error() {
    // nothing listens on this port
    let verifier = HttpGoogleVerifier::with_endpoint(
        "moviebase-client-id".to_string(),
        "http://127.0.0.1:9/tokeninfo".to_string(),
    );

    let result = verifier.verify("any-token").await;
    assert!(result.is_err());
}
