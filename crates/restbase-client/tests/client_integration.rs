//! Integration tests for restbase-client against a wiremock server

use restbase_client::{Authorization, RequestClient, RestError, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use wiremock::matchers::{body_json, body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Default, Deserialize, PartialEq)]
struct Item {
    id: u64,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Serialize)]
struct NewItem {
    name: String,
}

#[derive(Debug, Serialize)]
struct ItemQuery {
    q: String,
    cursor: Option<String>,
}

async fn client_for(server: &MockServer) -> RequestClient {
    RequestClient::with_base_url(format!("{}/", server.uri())).unwrap()
}

// === GET ===

#[tokio::test]
async fn test_get_json_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/items/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"id":1}"#))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let item: Item = client.get_json("items/1").await.unwrap();

    assert_eq!(item.id, 1);
}

#[tokio::test]
async fn test_get_json_empty_body_is_default() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/items/1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let item: Item = client.get_json("items/1").await.unwrap();
    let filtered: Item = client
        .get_json_with("items/1", &json!({"q": "x"}))
        .await
        .unwrap();

    assert_eq!(item, Item::default());
    assert_eq!(filtered, Item::default());
}

#[tokio::test]
async fn test_get_not_found_raises_request_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/items/9"))
        .respond_with(ResponseTemplate::new(404).set_body_string("missing"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let result: Result<Item, _> = client.get_json("items/9").await;

    match result {
        Err(RestError::Request(failure)) => {
            assert_eq!(failure.url, format!("{}/items/9", server.uri()));
            assert_eq!(failure.status(), StatusCode::NOT_FOUND);
            assert_eq!(failure.body(), "missing");
            assert_eq!(failure.request.method, restbase_client::Method::GET);
        }
        other => panic!("Expected RestError::Request, got {other:?}"),
    }
}

#[tokio::test]
async fn test_get_raw_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    assert_eq!(client.get("health").await.unwrap(), "ok");
}

#[tokio::test]
async fn test_base_url_not_prefixed_twice() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let absolute = format!("{}/users", server.uri());
    let users: Vec<Item> = client.get_json(&absolute).await.unwrap();

    assert!(users.is_empty());
}

#[tokio::test]
async fn test_get_with_params_appends_to_existing_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/items"))
        .and(query_param("active", "1"))
        .and(query_param("q", "x"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let query = ItemQuery {
        q: "x".to_string(),
        cursor: None,
    };
    client.get_with("items?active=1", &query).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), Some("active=1&q=x"));
}

#[tokio::test]
async fn test_get_json_with_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/items"))
        .and(query_param("q", "a b"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"[{"id":3,"name":"a b"}]"#))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let items: Vec<Item> = client
        .get_json_with("items", &json!({"q": "a b", "empty": ""}))
        .await
        .unwrap();

    assert_eq!(
        items,
        vec![Item {
            id: 3,
            name: "a b".to_string()
        }]
    );
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), Some("q=a%20b"));
}

#[tokio::test]
async fn test_get_sends_no_body_or_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    client.get("items").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].body.is_empty());
    assert!(requests[0].headers.get("content-type").is_none());
}

// === Headers ===

#[tokio::test]
async fn test_default_headers_and_authorization_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("authorization", "Bearer some-key"))
        .and(header("x-tenant", "acme"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"id":7}"#))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server).await;
    client.set_authorization(Authorization::bearer("old-key")).unwrap();
    client.set_bearer_token("some-key").unwrap();
    client.set_default_header("X-Tenant", "other").unwrap();
    client.set_default_header("x-tenant", "acme").unwrap();

    let me: Item = client.get_json("me").await.unwrap();
    assert_eq!(me.id, 7);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].headers.get_all("x-tenant").iter().count(), 1);
}

// === POST / PUT / PATCH ===

#[tokio::test]
async fn test_post_json_body_and_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/items"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"name": "lamp"})))
        .respond_with(ResponseTemplate::new(201).set_body_string(r#"{"id":5,"name":"lamp"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let created: Item = client
        .post_json(
            "items",
            &NewItem {
                name: "lamp".to_string(),
            },
        )
        .await
        .unwrap();

    assert_eq!(created.id, 5);
    assert_eq!(created.name, "lamp");
}

#[tokio::test]
async fn test_post_text_payload_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/raw"))
        .and(body_string("name=lamp"))
        .respond_with(ResponseTemplate::new(200).set_body_string("stored"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    assert_eq!(client.post("raw", "name=lamp").await.unwrap(), "stored");
}

#[tokio::test]
async fn test_post_without_payload_sends_empty_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let item: Item = client.post_json("ping", &None::<NewItem>).await.unwrap();

    assert_eq!(item, Item::default());
    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].body.is_empty());
}

#[tokio::test]
async fn test_empty_response_decodes_to_default() {
    let server = MockServer::start().await;
    for verb in ["POST", "PUT", "PATCH"] {
        Mock::given(method(verb))
            .and(path("/items/1"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
    }

    let client = client_for(&server).await;
    let payload = NewItem {
        name: "desk".to_string(),
    };

    let posted: Item = client.post_json("items/1", &payload).await.unwrap();
    let put: Item = client.put_json("items/1", &payload).await.unwrap();
    let patched: Item = client.patch_json("items/1", &payload).await.unwrap();

    assert_eq!(posted, Item::default());
    assert_eq!(put, Item::default());
    assert_eq!(patched, Item::default());
}

#[tokio::test]
async fn test_put_and_patch_use_matching_verbs() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/items/2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"id":2,"name":"put"}"#))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/items/2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"id":2,"name":"patch"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let payload = json!({"name": "x"});

    let put: Item = client.put_json("items/2", &payload).await.unwrap();
    let patched: Item = client.patch_json("items/2", &payload).await.unwrap();

    assert_eq!(put.name, "put");
    assert_eq!(patched.name, "patch");
}

#[tokio::test]
async fn test_post_invalid_response_is_decoding_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let result: Result<Item, _> = client.post_json("items", &json!({})).await;

    assert!(matches!(result, Err(RestError::Decoding(_))));
}

#[tokio::test]
async fn test_post_failure_captures_sent_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(422).set_body_string(r#"{"error":"name"}"#))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let error = client
        .post("items", &json!({"name": ""}))
        .await
        .unwrap_err();

    let failure = error.failure().expect("should be a request failure");
    assert_eq!(failure.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(failure.request.body, r#"{"name":""}"#);
    assert_eq!(
        failure.request.content_headers.get("content-type"),
        Some("application/json")
    );
    assert!(!error.is_retryable());
}

// === DELETE ===

#[tokio::test]
async fn test_delete_success() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/items/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ignored"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    assert!(client.delete("items/1").await.is_ok());
}

#[tokio::test]
async fn test_delete_failure() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let error = client.delete("items/1").await.unwrap_err();

    assert_eq!(error.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
    assert!(error.is_retryable());
}

// === Escape hatch and transport errors ===

#[tokio::test]
async fn test_get_response_skips_status_check() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .and(header("authorization", "Basic dXNlcjpwYXNz"))
        .respond_with(
            ResponseTemplate::new(500)
                .insert_header("x-request-id", "r-1")
                .set_body_string("boom"),
        )
        .mount(&server)
        .await;

    let mut client = client_for(&server).await;
    client.set_authorization(Authorization::basic("user", "pass")).unwrap();
    let response = client.get_response("broken").await.unwrap();

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body, "boom");
    assert_eq!(
        response.headers.get("x-request-id").map(|v| v.to_str().unwrap()),
        Some("r-1")
    );
}

#[tokio::test]
async fn test_connection_error_is_transport_error() {
    let client = RequestClient::new().unwrap();
    let result = client.get("http://127.0.0.1:1/unreachable").await;

    assert!(matches!(result, Err(RestError::Transport(_))));
}

#[tokio::test]
async fn test_relative_url_without_base_is_invalid() {
    let client = RequestClient::new().unwrap();
    let result = client.get("items").await;

    assert!(matches!(result, Err(RestError::InvalidUrl(_))));
}
