//! Local HTTP servers for tests

use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode};
use axum::routing::{any, delete, get};
use axum::{Json, Router};
use reqwest::Url;
use serde_json::{json, Value};

/// Serve `router` on an ephemeral local port and return its base URL
pub async fn spawn_server(router: Router) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    Url::parse(&format!("http://{addr}")).unwrap()
}

/// A base URL nothing is listening on
pub async fn unused_address() -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    Url::parse(&format!("http://{addr}")).unwrap()
}

fn header_value(headers: &HeaderMap, name: &str) -> Value {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map_or(Value::Null, |v| Value::String(v.to_string()))
}

async fn echo(method: Method, headers: HeaderMap, body: Bytes) -> Json<Value> {
    Json(json!({
        "method": method.as_str(),
        "authorization": header_value(&headers, "authorization"),
        "content_type": header_value(&headers, "content-type"),
        "body": String::from_utf8_lossy(&body),
    }))
}

/// Echoes requests at `/echo` and serves a few fixed responses
pub fn echo_router() -> Router {
    Router::new()
        .route("/echo", any(echo))
        .route(
            "/v1/products/{id}",
            delete(|| async { (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found"}))) }),
        )
        .route("/empty", get(|| async { StatusCode::NO_CONTENT }))
        .route("/text", get(|| async { "plain text" }))
}
