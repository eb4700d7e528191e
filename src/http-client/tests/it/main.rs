use http_client::{Error, HttpClient, StatusCode, Url};
use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path},
};

fn client() -> HttpClient {
    HttpClient::builder().max_retries(0).build().unwrap()
}

fn url(server: &MockServer, path: &str) -> Url {
    Url::parse(&format!("{}{path}", server.uri())).unwrap()
}

#[tokio::test]
async fn test_post_sends_json_with_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/echo"))
        .and(header("authorization", "Bearer abc"))
        .and(header("accept", "application/json"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({ "MmsiIds": [258500000] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let response: Value = client()
        .post(url(&server, "/api/echo"))
        .accept_json()
        .bearer_auth("abc")
        .unwrap()
        .json(&json!({ "MmsiIds": [258500000] }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(response, json!({ "success": true }));
}

#[tokio::test]
async fn test_token_that_is_not_a_header_value_is_rejected() {
    let server = MockServer::start().await;

    let err = client()
        .post(url(&server, "/api/echo"))
        .bearer_auth("abc\ndef")
        .unwrap_err();

    assert!(matches!(err, Error::InvalidHeader { .. }));
    assert!(!err.is_timeout());
    assert_eq!(err.status(), None);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_non_success_status_is_reported_with_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let err = client()
        .post(url(&server, "/api/auth/login"))
        .send()
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
    assert!(!err.is_timeout());
    match err {
        Error::Status { body, url, .. } => {
            assert_eq!(body, "forbidden");
            assert_eq!(url.path(), "/api/auth/login");
        }
        e => panic!("unexpected error: {e:?}"),
    }
}

#[tokio::test]
async fn test_gateway_timeout_counts_as_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(504))
        .mount(&server)
        .await;

    let err = client().get(url(&server, "/slow")).send().await.unwrap_err();
    assert!(err.is_timeout());
}

#[tokio::test]
async fn test_invalid_json_is_a_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/text"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = client()
        .get(url(&server, "/text"))
        .send()
        .await
        .unwrap()
        .json::<Value>()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Decode { .. }));
}

#[tokio::test]
async fn test_transient_failures_are_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::builder().max_retries(1).build().unwrap();
    let body = client
        .get(url(&server, "/flaky"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert_eq!(body, "ok");
}
