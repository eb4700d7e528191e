use kystdata_core::Credentials;
use kystdatahuset_rs::Error;
use serde_json::json;
use wiremock::{
    Mock, ResponseTemplate,
    matchers::{body_json, method, path},
};

use crate::helper::*;

struct StaticStore(Option<Credentials>);

impl kystdata_core::CredentialStore for StaticStore {
    fn credentials(&self) -> Option<Credentials> {
        self.0.clone()
    }

    fn last_mmsi(&self) -> Option<kystdata_core::Mmsi> {
        None
    }

    fn set_last_mmsi(&self, _mmsi: kystdata_core::Mmsi) -> kystdata_core::CoreResult<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_login_stores_session() {
    let helper = TestHelper::new().await;

    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .and(body_json(json!({ "username": "user", "password": "pass" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({ "success": true, "msg": "", "data": { "JWT": TEST_TOKEN } }),
        ))
        .expect(1)
        .mount(&helper.mock_server)
        .await;

    let mut client = helper.client();
    let session = client.login("user", "pass").await.unwrap();

    assert_eq!(session.token().as_ref(), TEST_TOKEN);
    assert_eq!(session.username(), "user");
    assert_eq!(session.acquired_at(), login_time());
    assert!(client.is_authenticated());
}

#[tokio::test]
async fn test_rejected_login_leaves_client_unauthenticated() {
    let helper = TestHelper::new().await;
    helper
        .mock_envelope(
            LOGIN_PATH,
            json!({ "success": false, "msg": "Invalid username or password", "data": null }),
        )
        .await;

    let mut client = helper.client();
    let err = client.login("user", "wrong").await.unwrap_err();

    assert!(matches!(err, Error::Provider { ref msg, .. } if msg == "Invalid username or password"));
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_login_http_error_is_transport_error() {
    let helper = TestHelper::new().await;

    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&helper.mock_server)
        .await;

    let mut client = helper.client();
    let err = client.login("user", "pass").await.unwrap_err();

    assert!(matches!(err, Error::Transport { .. }));
    assert!(err.is_retryable());
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_login_without_token_fails() {
    let helper = TestHelper::new().await;
    helper
        .mock_envelope(LOGIN_PATH, json!({ "success": true, "msg": "", "data": {} }))
        .await;

    let mut client = helper.client();
    let err = client.login("user", "pass").await.unwrap_err();

    assert!(matches!(err, Error::MissingToken { .. }));
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_login_rejects_token_that_cannot_be_sent() {
    let helper = TestHelper::new().await;
    helper
        .mock_envelope(
            LOGIN_PATH,
            json!({ "success": true, "msg": "", "data": { "JWT": "abc\ndef" } }),
        )
        .await;

    let mut client = helper.client();
    let err = client.login("user", "pass").await.unwrap_err();

    assert!(matches!(err, Error::InvalidToken { .. }));
    assert!(!err.is_retryable());
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn test_empty_credentials_send_no_request() {
    let helper = TestHelper::new().await;
    helper.mock_login().await;

    let mut client = helper.client();
    let err = client.login("", "pass").await.unwrap_err();
    assert!(matches!(err, Error::MissingCredentials { .. }));

    let err = client.login("user", "").await.unwrap_err();
    assert!(matches!(err, Error::MissingCredentials { .. }));

    assert!(helper.request_bodies(LOGIN_PATH).await.is_empty());
}

#[tokio::test]
async fn test_ensure_session_logs_in_once() {
    let helper = TestHelper::new().await;

    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({ "success": true, "msg": "", "data": { "JWT": TEST_TOKEN } }),
        ))
        .expect(1)
        .mount(&helper.mock_server)
        .await;

    let store = StaticStore(Some(Credentials::new("user", "pass")));
    let mut client = helper.client();

    client.ensure_session(&store).await.unwrap();
    client.ensure_session(&store).await.unwrap();

    assert!(client.is_authenticated());
}

#[tokio::test]
async fn test_ensure_session_without_stored_credentials_fails() {
    let helper = TestHelper::new().await;
    let store = StaticStore(None);
    let mut client = helper.client();

    let err = client.ensure_session(&store).await.unwrap_err();
    assert!(matches!(err, Error::MissingCredentials { .. }));
}
