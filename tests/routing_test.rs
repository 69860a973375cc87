//! End-to-end routing through the gateway against mock backends.

mod common;

use axum::body::Body;
use axum::response::Response;
use reqwest::StatusCode;
use serde_json::Value;

use api_gateway::registry::{EndpointRecord, ServiceRegistry};
use common::{breaker_config, client, registry_with, start_gateway, start_mock_backend, start_programmable_backend};

fn default_breaker() -> api_gateway::config::CircuitBreakerConfig {
    breaker_config(5, 2_000, 30_000)
}

#[tokio::test]
async fn prefix_is_stripped_before_forwarding() {
    let backend = start_mock_backend(200, "hello").await;
    let registry = registry_with(vec![backend.record("svc", "svc")]).await;
    let gateway = start_gateway(registry.clone(), default_breaker()).await;

    let res = client().get(gateway.url("/svc/rest/of/path?x=1&y=2")).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "hello");
    assert_eq!(backend.calls(), 1);
    let seen = backend.last();
    assert_eq!(seen.method, "GET");
    assert_eq!(seen.uri, "/rest/of/path?x=1&y=2");
}

#[tokio::test]
async fn bare_prefix_forwards_to_backend_root() {
    let backend = start_mock_backend(200, "root").await;
    let registry = registry_with(vec![backend.record("svc", "svc")]).await;
    let gateway = start_gateway(registry, default_breaker()).await;

    let res = client().get(gateway.url("/svc")).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(backend.last().uri, "/");
}

#[tokio::test]
async fn root_is_rejected_without_touching_backends() {
    let backend = start_mock_backend(200, "unused").await;
    let registry = registry_with(vec![backend.record("svc", "svc")]).await;
    let gateway = start_gateway(registry.clone(), default_breaker()).await;

    let res = client().post(gateway.url("/")).body("payload").send().await.unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "invalid request, this is an api gateway");
    assert_eq!(backend.calls(), 0);
    assert_eq!(gateway.breaker.failure_count(), 0);
}

#[tokio::test]
async fn unmatched_prefix_is_not_found() {
    let backend = start_mock_backend(200, "unused").await;
    let registry = registry_with(vec![backend.record("namesservice", "names")]).await;
    let gateway = start_gateway(registry.clone(), default_breaker()).await;

    let res = client().get(gateway.url("/fruits/")).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "not found");
    assert_eq!(backend.calls(), 0);
    assert_eq!(gateway.breaker.failure_count(), 0);
    assert_eq!(registry.outstanding_handles(), 0);
}

#[tokio::test]
async fn gateway_record_is_never_matched() {
    let registry = registry_with(vec![]).await;
    let gateway = start_gateway(registry.clone(), default_breaker()).await;

    let res = client().get(gateway.url("/api-gateway/")).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(registry.len(), 1);
}

#[tokio::test]
async fn non_http_records_are_ignored() {
    let backend = start_mock_backend(200, "unused").await;
    let mut record = backend.record("queue", "svc");
    record.record_type = "message-source".into();
    let registry = registry_with(vec![record]).await;
    let gateway = start_gateway(registry, default_breaker()).await;

    let res = client().get(gateway.url("/svc/")).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn first_published_record_wins_a_shared_key() {
    let first = start_mock_backend(200, "first").await;
    let second = start_mock_backend(200, "second").await;
    let registry = registry_with(vec![first.record("a", "dup"), second.record("b", "dup")]).await;
    let gateway = start_gateway(registry, default_breaker()).await;

    for _ in 0..3 {
        let res = client().get(gateway.url("/dup/")).send().await.unwrap();
        assert_eq!(res.text().await.unwrap(), "first");
    }
    assert_eq!(second.calls(), 0);
}

#[tokio::test]
async fn headers_body_and_status_are_relayed_verbatim() {
    let backend = start_programmable_backend(|request| async move {
        Response::builder()
            .status(201)
            .header("x-custom", "value")
            .header("set-cookie", "a=1")
            .header("set-cookie", "b=2")
            .header("content-type", "application/octet-stream")
            .body(Body::from(request.body))
            .unwrap()
    })
    .await;
    let registry = registry_with(vec![backend.record("echo", "echo")]).await;
    let gateway = start_gateway(registry.clone(), default_breaker()).await;

    let payload: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
    let res = client()
        .put(gateway.url("/echo/items/1"))
        .header("x-dup", "one")
        .header("x-dup", "two")
        .header("content-type", "application/octet-stream")
        .body(payload.clone())
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(res.headers()["x-custom"], "value");
    let cookies: Vec<_> = res.headers().get_all("set-cookie").iter().collect();
    assert_eq!(cookies, vec!["a=1", "b=2"]);
    assert_eq!(res.bytes().await.unwrap().as_ref(), payload.as_slice());

    let seen = backend.last();
    assert_eq!(seen.method, "PUT");
    assert_eq!(seen.uri, "/items/1");
    let dup: Vec<_> = seen.headers.get_all("x-dup").iter().collect();
    assert_eq!(dup, vec!["one", "two"]);
    assert_eq!(seen.body.as_ref(), payload.as_slice());
    assert_eq!(registry.outstanding_handles(), 0);
}

#[tokio::test]
async fn bodies_beyond_the_request_limit_are_relayed_in_full() {
    const SIZE: usize = 3 * 1024 * 1024;
    let backend = start_programmable_backend(|_| async {
        Response::builder()
            .status(200)
            .header("content-type", "application/octet-stream")
            .body(Body::from(vec![b'z'; SIZE]))
            .unwrap()
    })
    .await;
    let registry = registry_with(vec![backend.record("files", "files")]).await;
    let gateway = start_gateway(registry.clone(), default_breaker()).await;

    let res = client().get(gateway.url("/files/big.bin")).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-length"], SIZE.to_string().as_str());
    let body = res.bytes().await.unwrap();
    assert_eq!(body.len(), SIZE);
    assert!(body.iter().all(|&b| b == b'z'));
    assert_eq!(gateway.breaker.failure_count(), 0);
    assert_eq!(registry.outstanding_handles(), 0);
}

#[tokio::test]
async fn client_errors_are_relayed_not_failed() {
    let backend = start_mock_backend(404, "missing").await;
    let registry = registry_with(vec![backend.record("svc", "svc")]).await;
    let gateway = start_gateway(registry, default_breaker()).await;

    let res = client().get(gateway.url("/svc/nothing")).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.text().await.unwrap(), "missing");
    assert_eq!(gateway.breaker.failure_count(), 0);
}

#[tokio::test]
async fn caller_cannot_assert_a_principal() {
    let backend = start_mock_backend(200, "ok").await;
    let registry = registry_with(vec![backend.record("svc", "svc")]).await;
    let gateway = start_gateway(registry, default_breaker()).await;

    client()
        .get(gateway.url("/svc/"))
        .header("user-principal", r#"{"sub":"mallory"}"#)
        .send()
        .await
        .unwrap();

    assert!(backend.last().headers.get("user-principal").is_none());
}

#[tokio::test]
async fn request_id_is_generated_and_propagated() {
    let backend = start_mock_backend(200, "ok").await;
    let registry = registry_with(vec![backend.record("svc", "svc")]).await;
    let gateway = start_gateway(registry, default_breaker()).await;

    let res = client().get(gateway.url("/svc/")).send().await.unwrap();
    let generated = res.headers()["x-request-id"].to_str().unwrap().to_string();
    assert!(!generated.is_empty());
    assert_eq!(backend.last().headers["x-request-id"], generated.as_str());

    let res = client()
        .get(gateway.url("/svc/"))
        .header("x-request-id", "caller-chosen")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"], "caller-chosen");
    assert_eq!(backend.last().headers["x-request-id"], "caller-chosen");
}

#[tokio::test]
async fn gateway_responses_carry_request_id() {
    let registry = registry_with(vec![]).await;
    let gateway = start_gateway(registry, default_breaker()).await;

    let res = client().get(gateway.url("/")).send().await.unwrap();
    assert!(res.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn repeated_get_is_idempotent() {
    let backend = start_mock_backend(200, r#"[{"name":"orange"}]"#).await;
    let registry = registry_with(vec![backend.record("fruitsservice", "fruits")]).await;
    let gateway = start_gateway(registry, default_breaker()).await;

    let first = client().get(gateway.url("/fruits/")).send().await.unwrap();
    let first_status = first.status();
    let first_body = first.bytes().await.unwrap();

    let second = client().get(gateway.url("/fruits/")).send().await.unwrap();
    assert_eq!(second.status(), first_status);
    assert_eq!(second.bytes().await.unwrap(), first_body);
}

#[tokio::test]
async fn records_published_later_are_seen_without_restart() {
    let registry = registry_with(vec![]).await;
    let gateway = start_gateway(registry.clone(), default_breaker()).await;

    let res = client().get(gateway.url("/late/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let backend = start_mock_backend(200, "now here").await;
    registry
        .publish(EndpointRecord::http_endpoint("late", "127.0.0.1", backend.addr.port(), "/").with_api_name("late"))
        .await
        .unwrap();

    let res = client().get(gateway.url("/late/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "now here");
}
