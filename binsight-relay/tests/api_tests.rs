//! Integration tests for binsight-relay API endpoints
//!
//! The classification service is replaced by a small in-process axum app
//! bound to an ephemeral port, which records every request it receives.

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, State},
    http::{Request, StatusCode},
    routing::post,
    Json, Router,
};
use binsight_relay::{build_router, AppState, UpstreamClient};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

const BOUNDARY: &str = "----binsight-test-boundary";

/// What the fake classification service answers with
#[derive(Clone)]
struct Canned {
    status: StatusCode,
    body: String,
}

#[derive(Clone, Default)]
struct Recorder {
    requests: Arc<Mutex<Vec<Value>>>,
}

impl Recorder {
    fn hits(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn last(&self) -> Value {
        self.requests.lock().unwrap().last().cloned().expect("no upstream request recorded")
    }
}

/// Start a fake upstream and return its URL plus the request recorder
async fn spawn_upstream(canned: Canned) -> (String, Recorder) {
    let recorder = Recorder::default();

    async fn handler(
        State((canned, recorder)): State<(Canned, Recorder)>,
        Json(body): Json<Value>,
    ) -> (StatusCode, [(&'static str, &'static str); 1], String) {
        recorder.requests.lock().unwrap().push(body);
        (canned.status, [("content-type", "application/json")], canned.body)
    }

    let app = Router::new()
        .route("/", post(handler))
        .layer(DefaultBodyLimit::disable())
        .with_state((canned, recorder.clone()));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/", addr), recorder)
}

/// URL of a port nobody listens on
async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/", addr)
}

fn setup_app(upstream_url: &str) -> Router {
    let upstream = UpstreamClient::new(upstream_url, Some(Duration::from_secs(10))).unwrap();
    build_router(AppState::new(upstream, 12 * 1024 * 1024))
}

/// One multipart form field
enum Part<'a> {
    /// Text field: name, value
    Text(&'a str, &'a str),
    /// The `file` field: file name, contents
    File(&'a str, &'a [u8]),
}

/// Hand-built multipart/form-data body
fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::File(file_name, data) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: image/jpeg\r\n\r\n",
                        file_name
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn analyze_request(parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/analyze")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = body.collect().await.expect("Should read body").to_bytes();
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

fn ok_upstream(body: Value) -> Canned {
    Canned {
        status: StatusCode::OK,
        body: body.to_string(),
    }
}

// =============================================================================
// Health and build info
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app("http://127.0.0.1:9/");
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "binsight-relay");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_buildinfo_endpoint() {
    let app = setup_app("http://127.0.0.1:9/");
    let response = app
        .oneshot(Request::builder().uri("/api/buildinfo").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert!(body["git_hash"].is_string());
    assert!(body["build_profile"].is_string());
}

#[tokio::test]
async fn test_index_serves_html() {
    let app = setup_app("http://127.0.0.1:9/");
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers().get("content-type").unwrap().to_str().unwrap();
    assert!(content_type.contains("text/html"));
}

#[tokio::test]
async fn test_app_js_drops_completions_from_before_reset() {
    let app = setup_app("http://127.0.0.1:9/");
    let response = app
        .oneshot(Request::builder().uri("/static/app.js").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers().get("content-type").unwrap().to_str().unwrap();
    assert!(content_type.contains("javascript"));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let script = String::from_utf8(bytes.to_vec()).unwrap();
    // Each analysis captures the session epoch; reset bumps it
    assert!(script.contains("const epoch = state.epoch;"));
    assert!(script.contains("state.epoch += 1;"));
    assert!(script.contains("if (epoch !== state.epoch"));
}

// =============================================================================
// Relay: successful forwarding
// =============================================================================

#[tokio::test]
async fn test_forwards_base64_image_and_mode() {
    let (url, recorder) = spawn_upstream(ok_upstream(json!({
        "status": "Success",
        "segregated_category": "PLASTIC",
        "confidence": 0.93
    })))
    .await;
    let app = setup_app(&url);

    let image: &[u8] = b"\xff\xd8\xff\xe0fake-jpeg";
    let response = app
        .oneshot(analyze_request(&[
            Part::Text("type", "segregation"),
            Part::File("bottle.jpg", image),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let forwarded = recorder.last();
    assert_eq!(forwarded["analysis_type"], "segregation");
    assert_eq!(forwarded["image"], "/9j/4GZha2UtanBlZw==");
    assert_eq!(recorder.hits(), 1);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["segregated_category"], "PLASTIC");
    assert_eq!(body["confidence"], 0.93);
    assert_eq!(body["fileName"], "bottle.jpg");
    assert_eq!(body["fileSize"], image.len());
    assert_eq!(body["analysisType"], "segregation");
}

#[tokio::test]
async fn test_fullness_two_megabyte_upload() {
    let (url, recorder) =
        spawn_upstream(ok_upstream(json!({ "bin_level": 95.5, "alert": true }))).await;
    let app = setup_app(&url);

    let image = vec![0xABu8; 2 * 1024 * 1024];
    let response = app
        .oneshot(analyze_request(&[
            Part::File("bin.jpg", &image),
            Part::Text("type", "fullness"),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(recorder.last()["analysis_type"], "fullness");

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["bin_level"], 95.5);
    assert_eq!(body["alert"], true);
    assert_eq!(body["fileSize"], 2 * 1024 * 1024);
}

// =============================================================================
// Relay: input validation (never forwarded)
// =============================================================================

#[tokio::test]
async fn test_unknown_mode_rejected_without_forwarding() {
    let (url, recorder) = spawn_upstream(ok_upstream(json!({}))).await;
    let app = setup_app(&url);

    let response = app
        .oneshot(analyze_request(&[
            Part::File("x.jpg", b"data"),
            Part::Text("type", "unknown"),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("unknown"));
    assert_eq!(recorder.hits(), 0);
}

#[tokio::test]
async fn test_upload_over_body_limit_rejected_without_forwarding() {
    let (url, recorder) = spawn_upstream(ok_upstream(json!({}))).await;
    let upstream = UpstreamClient::new(url.as_str(), Some(Duration::from_secs(10))).unwrap();
    let app = build_router(AppState::new(upstream, 1024));

    let image = vec![0u8; 4096];
    let response = app
        .oneshot(analyze_request(&[
            Part::Text("type", "fullness"),
            Part::File("big.jpg", &image[..]),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = extract_json(response.into_body()).await;
    assert!(body["error"].is_string());
    assert!(body.get("details").is_none());
    assert_eq!(recorder.hits(), 0);
}

#[tokio::test]
async fn test_missing_file_rejected() {
    let (url, recorder) = spawn_upstream(ok_upstream(json!({}))).await;
    let app = setup_app(&url);

    let response = app
        .oneshot(analyze_request(&[Part::Text("type", "fullness")]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "No file uploaded");
    assert_eq!(recorder.hits(), 0);
}

#[tokio::test]
async fn test_empty_file_counts_as_missing() {
    let (url, recorder) = spawn_upstream(ok_upstream(json!({}))).await;
    let app = setup_app(&url);

    let response = app
        .oneshot(analyze_request(&[
            Part::File("empty.jpg", b""),
            Part::Text("type", "fullness"),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(recorder.hits(), 0);
}

#[tokio::test]
async fn test_missing_mode_rejected() {
    let (url, recorder) = spawn_upstream(ok_upstream(json!({}))).await;
    let app = setup_app(&url);

    let response = app
        .oneshot(analyze_request(&[Part::File("x.jpg", b"data")]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(recorder.hits(), 0);
}

#[tokio::test]
async fn test_non_multipart_rejected() {
    let app = setup_app("http://127.0.0.1:9/");
    let request = Request::builder()
        .method("POST")
        .uri("/api/analyze")
        .header("content-type", "application/json")
        .body(Body::from("{}"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert!(body["error"].is_string());
}

// =============================================================================
// Relay: upstream failures
// =============================================================================

#[tokio::test]
async fn test_upstream_error_status_not_retried() {
    let (url, recorder) = spawn_upstream(Canned {
        status: StatusCode::SERVICE_UNAVAILABLE,
        body: json!({ "error": "Fill Estimation server-side error." }).to_string(),
    })
    .await;
    let app = setup_app(&url);

    let response = app
        .oneshot(analyze_request(&[
            Part::File("bin.jpg", b"data"),
            Part::Text("type", "fullness"),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "Failed to analyze image");
    assert!(body["details"].as_str().unwrap().contains("503"));
    assert_eq!(recorder.hits(), 1);
}

#[tokio::test]
async fn test_upstream_unreachable() {
    let app = setup_app(&unreachable_url().await);

    let response = app
        .oneshot(analyze_request(&[
            Part::File("bin.jpg", b"data"),
            Part::Text("type", "fullness"),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = extract_json(response.into_body()).await;
    assert!(body["details"].as_str().unwrap().contains("Network error"));
}

#[tokio::test]
async fn test_upstream_non_json_body() {
    let (url, _recorder) = spawn_upstream(Canned {
        status: StatusCode::OK,
        body: "<html>oops</html>".to_string(),
    })
    .await;
    let app = setup_app(&url);

    let response = app
        .oneshot(analyze_request(&[
            Part::File("x.jpg", b"data"),
            Part::Text("type", "segregation"),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = extract_json(response.into_body()).await;
    assert!(body["details"].as_str().unwrap().contains("Invalid upstream response"));
}

// =============================================================================
// Reconcile endpoint
// =============================================================================

async fn post_reconcile(body: Value) -> (StatusCode, Value) {
    let app = setup_app("http://127.0.0.1:9/");
    let request = Request::builder()
        .method("POST")
        .uri("/api/reconcile")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    (status, extract_json(response.into_body()).await)
}

#[tokio::test]
async fn test_reconcile_bin_level_payload() {
    let (status, body) = post_reconcile(json!({
        "mode": "fullness",
        "payload": { "bin_level": 95.5, "alert": true, "fileName": "bin.jpg" }
    }))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["fillPct"], 95.5);
    assert_eq!(body["result"]["alert"], true);
    assert_eq!(body["result"]["source"], "upstream");
    assert!(body["display"]["lines"]
        .as_array()
        .unwrap()
        .contains(&json!("95.5% Full")));
    assert!(body["display"]["alertBanner"].is_string());
}

#[tokio::test]
async fn test_reconcile_failed_gives_fallback() {
    let (status, body) = post_reconcile(json!({
        "mode": "segregation",
        "failed": true,
        "cause": "Relay returned 500"
    }))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["source"], "fallback");
    assert_eq!(body["result"]["statusOk"], false);
    assert!(body["display"]["degradedBanner"].is_string());
}

#[tokio::test]
async fn test_reconcile_invalid_mode() {
    let (status, body) = post_reconcile(json!({ "mode": "compost", "payload": {} })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}
