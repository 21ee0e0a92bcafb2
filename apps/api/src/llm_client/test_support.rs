//! Local stand-in for the Gemini endpoint, shared by client and orchestration tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::Query;
use axum::http::{StatusCode, Uri};
use axum::{Json, Router};
use serde_json::{json, Value};

use super::{ModelClient, ModelSettings};

/// Last request the stub received: path, query parameters, JSON payload.
pub type Seen = Arc<Mutex<Option<(String, HashMap<String, String>, Value)>>>;

/// Answers every request with `status` and `body` after `delay`, recording what it received.
pub async fn spawn_stub(status: StatusCode, body: impl Into<String>, delay: Duration) -> (String, Seen) {
    let body: String = body.into();
    let seen: Seen = Arc::new(Mutex::new(None));
    let recorder = seen.clone();

    let app = Router::new().fallback(
        move |uri: Uri, Query(query): Query<HashMap<String, String>>, Json(payload): Json<Value>| {
            let recorder = recorder.clone();
            let body = body.clone();
            async move {
                *recorder.lock().unwrap() = Some((uri.path().to_string(), query, payload));
                tokio::time::sleep(delay).await;
                (status, body)
            }
        },
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), seen)
}

/// Wraps `text` in a `generateContent` success envelope.
pub fn candidate_envelope(text: &str) -> String {
    json!({"candidates": [{"content": {"parts": [{"text": text}]}}]}).to_string()
}

pub fn client_for(base_url: String, api_key: Option<&str>, timeout: Duration) -> ModelClient {
    ModelClient::new(ModelSettings {
        base_url,
        model: "gemini-test".to_string(),
        api_key: api_key.map(String::from),
        timeout,
    })
    .unwrap()
}
