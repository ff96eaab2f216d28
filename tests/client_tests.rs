use chrono::{Duration, Utc};
use quiltery::client::{AuthClient, ClientError, Registration};
use reqwest::StatusCode;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn user_body(trial_ends_at: chrono::DateTime<Utc>) -> serde_json::Value {
    json!({
        "id": 1,
        "email": "alice@example.com",
        "firstName": "Alice",
        "displayName": null,
        "status": "quilter",
        "subscriptionStatus": "trial",
        "subscriptionPlan": null,
        "trialEndsAt": trial_ends_at.to_rfc3339(),
    })
}

#[tokio::test]
async fn unauthenticated_refresh_resolves_to_no_user() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/user"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Not authenticated"})),
        )
        .mount(&server)
        .await;

    let mut client = AuthClient::new(server.uri()).unwrap();

    // A 401 is the ordinary signed-out state, not a fault.
    client.refresh().await.unwrap();
    assert!(!client.is_authenticated());
    assert!(!client.has_active_subscription());
    assert!(client.current_user().is_none());
}

#[tokio::test]
async fn refresh_surfaces_other_faults_with_status_and_reason() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/user"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"message": "Internal server error"})),
        )
        .mount(&server)
        .await;

    let mut client = AuthClient::new(server.uri()).unwrap();
    let err = client.refresh().await.unwrap_err();

    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(message, "Internal server error");
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn login_updates_the_cache_in_place() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(user_body(Utc::now() + Duration::days(10))),
        )
        .mount(&server)
        .await;

    let mut client = AuthClient::new(server.uri()).unwrap();
    let user = client.login("alice@example.com", "password123").await.unwrap();
    assert_eq!(user.email, "alice@example.com");

    assert!(client.is_authenticated());
    assert!(client.has_active_subscription());
    assert_eq!(client.trial_days_remaining(), Some(10));
}

#[tokio::test]
async fn failed_login_is_a_distinguishable_fault() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"message": "Invalid email or password"})),
        )
        .mount(&server)
        .await;

    let mut client = AuthClient::new(server.uri()).unwrap();
    let err = client.login("alice@example.com", "wrongpass").await.unwrap_err();

    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(message, "Invalid email or password");
        }
        other => panic!("expected API error, got {other:?}"),
    }
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn register_updates_the_cache_in_place() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(user_body(Utc::now() + Duration::days(14))),
        )
        .mount(&server)
        .await;

    let mut client = AuthClient::new(server.uri()).unwrap();
    let registration = Registration {
        email: "alice@example.com".to_string(),
        password: "password123".to_string(),
        first_name: "Alice".to_string(),
        display_name: None,
        status: Some("quilter".to_string()),
    };

    client.register(&registration).await.unwrap();
    assert!(client.is_authenticated());
    assert!(client.has_active_subscription());
}

#[tokio::test]
async fn logout_clears_the_cache() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(user_body(Utc::now() + Duration::days(10))),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Logged out"})))
        .mount(&server)
        .await;

    let mut client = AuthClient::new(server.uri()).unwrap();
    client.login("alice@example.com", "password123").await.unwrap();
    assert!(client.is_authenticated());

    client.logout().await.unwrap();
    assert!(!client.is_authenticated());
    assert!(!client.has_active_subscription());
    assert!(client.current_user().is_none());
}

#[tokio::test]
async fn entitlement_is_recomputed_on_every_read() {
    let server = MockServer::start().await;

    // The cached record says "trial", but the window already closed; the
    // derived boolean must reflect the clock, not the cached status.
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(user_body(Utc::now() - Duration::hours(1))),
        )
        .mount(&server)
        .await;

    let mut client = AuthClient::new(server.uri()).unwrap();
    client.login("alice@example.com", "password123").await.unwrap();

    assert!(client.is_authenticated());
    assert!(!client.has_active_subscription());
    assert_eq!(client.trial_days_remaining(), None);
}
