mod common;

use common::{build_config, build_session};
use mockito::{Matcher, Server};
use serde_json::json;
use tuum_session::{Credential, FormData, RequestOptions, SessionError};

#[tokio::test]
async fn integration_unauthenticated_request_then_refresh_and_retry() {
    let mut server = Server::new_async().await;

    let first_attempt = server
        .mock("GET", "/orders")
        .match_header("authorization", "Bearer tok123")
        .with_status(401)
        .with_body(r#"{"detail": "token expired"}"#)
        .expect(1)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/user/v1/token/refresh")
        .match_header("authorization", "Bearer ref456")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token": "tok999", "user_id": "u1"}"#)
        .expect(1)
        .create_async()
        .await;
    let retry = server
        .mock("GET", "/orders")
        .match_header("authorization", "Bearer tok999")
        .with_status(200)
        .with_body(r#"[{"id": 1}]"#)
        .expect(1)
        .create_async()
        .await;

    let (session, listener) = build_session(build_config(&server.url(), ""));

    // Nothing stored yet: the call never reaches the network.
    let result = session.get("/orders").await;
    assert!(matches!(result, Err(SessionError::NotAuthenticated)));

    session
        .save_tokens("tok123", Some("ref456"), Some("u1"))
        .await
        .unwrap();
    let response = session.get("/orders").await.expect("retry should succeed");

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.text(), r#"[{"id": 1}]"#);
    assert_eq!(
        session.credential().await,
        Credential::new("tok999", Some("ref456".to_string()), Some("u1".to_string()))
    );
    assert_eq!(listener.expired(), 0);

    first_attempt.assert_async().await;
    refresh.assert_async().await;
    retry.assert_async().await;
}

#[tokio::test]
async fn integration_retry_reuses_original_body_and_headers() {
    let mut server = Server::new_async().await;
    let payload = json!({"item": "book", "qty": 2});

    let first_attempt = server
        .mock("POST", "/orders")
        .match_header("authorization", "Bearer tok123")
        .with_status(401)
        .expect(1)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/user/v1/token/refresh")
        .with_status(200)
        .with_body(r#"{"access_token": "tok999", "refresh_token": "ref789", "user_id": 7}"#)
        .expect(1)
        .create_async()
        .await;
    let retry = server
        .mock("POST", "/orders")
        .match_header("authorization", "Bearer tok999")
        .match_header("content-type", "application/json")
        .match_header("x-request-source", "checkout")
        .match_body(Matcher::Json(payload.clone()))
        .with_status(201)
        .expect(1)
        .create_async()
        .await;

    let (session, _listener) = build_session(build_config(&server.url(), ""));
    session
        .save_tokens("tok123", Some("ref456"), Some("7"))
        .await
        .unwrap();

    let options = RequestOptions::post()
        .header("X-Request-Source", "checkout")
        .json(payload);
    let response = session.request("/orders", options).await.unwrap();

    assert_eq!(response.status().as_u16(), 201);
    let credential = session.credential().await;
    assert_eq!(credential.refresh_token.as_deref(), Some("ref789"));
    assert_eq!(credential.user_id.as_deref(), Some("7"));

    first_attempt.assert_async().await;
    refresh.assert_async().await;
    retry.assert_async().await;
}

#[tokio::test]
async fn integration_failed_refresh_tears_session_down() {
    let mut server = Server::new_async().await;

    let orders = server
        .mock("GET", "/orders")
        .with_status(401)
        .expect(1)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/user/v1/token/refresh")
        .with_status(401)
        .with_body(r#"{"detail": "refresh token expired"}"#)
        .expect(1)
        .create_async()
        .await;

    let (session, listener) = build_session(build_config(&server.url(), ""));
    session
        .save_tokens("tok123", Some("ref456"), Some("u1"))
        .await
        .unwrap();

    let result = session.get("/orders").await;

    assert!(matches!(result, Err(SessionError::SessionExpired { .. })));
    assert!(session.credential().await.is_empty());
    assert!(!session.is_logged_in().await);
    assert_eq!(listener.expired(), 1);

    orders.assert_async().await;
    refresh.assert_async().await;
}

#[tokio::test]
async fn integration_error_statuses_are_returned_without_refresh() {
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/missing")
        .with_status(404)
        .with_body("not found")
        .create_async()
        .await;
    server
        .mock("GET", "/broken")
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/user/v1/token/refresh")
        .expect(0)
        .create_async()
        .await;

    let (session, listener) = build_session(build_config(&server.url(), ""));
    session
        .save_tokens("tok123", Some("ref456"), Some("u1"))
        .await
        .unwrap();
    let before = session.credential().await;

    let missing = session.get("/missing").await.unwrap();
    let broken = session.get("/broken").await.unwrap();

    assert_eq!(missing.status().as_u16(), 404);
    assert_eq!(missing.text(), "not found");
    assert_eq!(broken.status().as_u16(), 500);
    assert_eq!(session.credential().await, before);
    assert_eq!(listener.expired(), 0);

    refresh.assert_async().await;
}

#[tokio::test]
async fn integration_second_unauthorized_is_returned_not_refreshed_again() {
    let mut server = Server::new_async().await;

    let admin = server
        .mock("GET", "/admin")
        .with_status(401)
        .expect(2)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/user/v1/token/refresh")
        .with_status(200)
        .with_body(r#"{"access_token": "tok999"}"#)
        .expect(1)
        .create_async()
        .await;

    let (session, _listener) = build_session(build_config(&server.url(), ""));
    session
        .save_tokens("tok123", Some("ref456"), None)
        .await
        .unwrap();

    let response = session.get("/admin").await.unwrap();

    assert_eq!(response.status().as_u16(), 401);
    assert!(session.is_logged_in().await);
    admin.assert_async().await;
    refresh.assert_async().await;
}

#[tokio::test]
async fn integration_form_body_is_not_labelled_json() {
    let mut server = Server::new_async().await;

    let upload = server
        .mock("POST", "/files")
        .match_header("authorization", "Bearer tok123")
        .match_header(
            "content-type",
            Matcher::Regex("^multipart/form-data; boundary=".to_string()),
        )
        .match_body(Matcher::Regex("hello world".to_string()))
        .with_status(201)
        .expect(1)
        .create_async()
        .await;

    let (session, _listener) = build_session(build_config(&server.url(), ""));
    session
        .save_tokens("tok123", Some("ref456"), None)
        .await
        .unwrap();

    let form = FormData::new()
        .text("title", "notes")
        .file("file", "notes.txt", b"hello world".to_vec(), Some("text/plain"));
    let response = session
        .request("/files", RequestOptions::post().form(form))
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 201);
    upload.assert_async().await;
}

#[tokio::test]
async fn integration_network_failure_is_surfaced_and_not_retried() {
    let (session, listener) = build_session(build_config("http://127.0.0.1:9", ""));
    session
        .save_tokens("tok123", Some("ref456"), Some("u1"))
        .await
        .unwrap();

    let result = session.get("/orders").await;

    match result {
        Err(SessionError::Network(cause)) => {
            assert!(std::error::Error::source(&cause).is_some(), "cause should be attached");
        }
        other => panic!("expected a network error, got {:?}", other.map(|r| r.status())),
    }
    assert!(session.is_logged_in().await);
    assert_eq!(listener.expired(), 0);
}

#[tokio::test]
async fn integration_uncoalesced_refresh_still_retries_once() {
    let mut server = Server::new_async().await;

    server
        .mock("GET", "/orders")
        .match_header("authorization", "Bearer tok123")
        .with_status(401)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/user/v1/token/refresh")
        .with_status(200)
        .with_body(r#"{"access_token": "tok999", "user_id": "u1"}"#)
        .expect(1)
        .create_async()
        .await;
    let retry = server
        .mock("GET", "/orders")
        .match_header("authorization", "Bearer tok999")
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let (session, _listener) =
        build_session(build_config(&server.url(), "  coalesce: false"));
    session
        .save_tokens("tok123", Some("ref456"), Some("u1"))
        .await
        .unwrap();

    let response = session.get("/orders").await.unwrap();

    assert_eq!(response.status().as_u16(), 200);
    refresh.assert_async().await;
    retry.assert_async().await;
}

#[tokio::test]
async fn integration_unreachable_refresh_endpoint_tears_session_down() {
    let mut server = Server::new_async().await;

    let orders = server
        .mock("GET", "/orders")
        .match_header("authorization", "Bearer tok123")
        .with_status(401)
        .expect(1)
        .create_async()
        .await;

    // Requests still reach the mock server; only the refresh call goes
    // to a port nothing listens on.
    let mut config = build_config(&server.url(), "");
    config.api.endpoints.refresh = "http://127.0.0.1:9/user/v1/token/refresh".to_string();
    let (session, listener) = build_session(config);
    session
        .save_tokens("tok123", Some("ref456"), Some("u1"))
        .await
        .unwrap();

    let result = session.get("/orders").await;

    assert!(matches!(result, Err(SessionError::SessionExpired { .. })));
    assert!(session.credential().await.is_empty());
    assert_eq!(listener.expired(), 1);
    orders.assert_async().await;
}
