use assert_fs::TempDir;
use assert_fs::prelude::*;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use std::path::PathBuf;
use task_server::config::Config;
use tower::ServiceExt;

/// Test context holding a router backed by a data file in a temp directory.
pub struct TestContext {
    #[allow(dead_code)] // dir is kept so the data file outlives the test
    pub dir: TempDir,
    pub data_file: PathBuf,
    pub app: Router,
}

pub fn setup() -> TestContext {
    // Allow multiple calls to init for tests.
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let dir = TempDir::new().unwrap();
    let data_file = dir.child("tasks.json").path().to_path_buf();
    let config = Config {
        data_file: data_file.clone(),
        ..Config::default()
    };
    let app = task_server::web::create_router(&config);
    TestContext {
        dir,
        data_file,
        app,
    }
}

/// Sends one request and returns the status with the body parsed as JSON.
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let (status, text) = send_raw(app, method, uri, body.map(|json| json.to_string())).await;
    let json = serde_json::from_str(&text).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Sends one request with an optional raw JSON body and returns the body text.
pub async fn send_raw(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<String>,
) -> (StatusCode, String) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}
