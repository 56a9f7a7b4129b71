//! End-to-end router tests: requests in, envelopes out.

use std::collections::BTreeSet;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt as _;

use sis_auth::SessionKeys;
use sis_service::ControlPlane;
use sis_storage::FsStorage;

fn app() -> (tempfile::TempDir, Router, ControlPlane<FsStorage>) {
    let dir = tempfile::tempdir().unwrap();
    let store = FsStorage::new(dir.path()).unwrap();
    let plane = ControlPlane::new(store, SessionKeys::new(b"router-test-secret", 3600));
    plane.ensure_roles_seeded().unwrap();
    let router = sis_http::router(plane.clone());
    (dir, router, plane)
}

/// Mint a session for an operator holding exactly `perms`.
fn token_with(plane: &ControlPlane<FsStorage>, perms: &[&str]) -> String {
    let perms: BTreeSet<String> = perms.iter().map(|p| p.to_string()).collect();
    plane.sessions().issue("tester", &perms).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

fn with_bearer(mut req: Request<Body>, token: &str) -> Request<Body> {
    req.headers_mut().insert(
        "authorization",
        format!("Bearer {token}").parse().unwrap(),
    );
    req
}

fn with_device(mut req: Request<Body>, device_id: &str, device_token: &str) -> Request<Body> {
    req.headers_mut()
        .insert("x-device-id", device_id.parse().unwrap());
    req.headers_mut()
        .insert("x-device-token", device_token.parse().unwrap());
    req
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn bootstrap_login_and_whoami() {
    let (_dir, app, _plane) = app();

    let (status, body) = send(
        &app,
        post_json("/auth/bootstrap", &json!({"user": "admin", "pass": "hunter22"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let seed = body["otp_seed"].as_str().unwrap().to_string();

    // Second bootstrap is refused.
    let (status, body) = send(
        &app,
        post_json("/auth/bootstrap", &json!({"user": "x", "pass": "y"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "already-initialized");

    // Full login with a freshly derived one-time code.
    let otp = sis_auth::totp::current_code(&sis_auth::decode_otp_seed(&seed).unwrap());
    let (status, body) = send(
        &app,
        post_json(
            "/auth/login",
            &json!({"user": "admin", "pass": "hunter22", "otp": otp}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        with_bearer(
            Request::builder().uri("/auth/me").body(Body::empty()).unwrap(),
            &token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"], "admin");
    assert!(body["perms"].as_array().unwrap().len() >= 10);
}

#[tokio::test]
async fn wrong_one_time_code_is_401_otp() {
    let (_dir, app, _plane) = app();
    send(
        &app,
        post_json("/auth/bootstrap", &json!({"user": "admin", "pass": "pw"})),
    )
    .await;

    let (status, body) = send(
        &app,
        post_json(
            "/auth/login",
            &json!({"user": "admin", "pass": "pw", "otp": "000000"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "otp");
}

#[tokio::test]
async fn lock_command_round_trip() {
    let (_dir, app, plane) = app();

    let (status, enroll) = send(&app, post_json("/devices/enroll", &json!({"room": "b12"}))).await;
    assert_eq!(status, StatusCode::OK);
    let device_id = enroll["device_id"].as_str().unwrap().to_string();
    let device_token = enroll["device_token"].as_str().unwrap().to_string();

    let token = token_with(&plane, &["device.control"]);
    let (status, _) = send(
        &app,
        with_bearer(
            post_json(
                "/devices/commands/enqueue",
                &json!({"deviceId": device_id, "command": {"action": "lock"}}),
            ),
            &token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let poll = || {
        with_device(
            post_json("/devices/commands/poll", &json!({})),
            &device_id,
            &device_token,
        )
    };

    let (status, body) = send(&app, poll()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["commands"], json!([{"action": "lock"}]));

    // An immediate second poll drains nothing.
    let (_, body) = send(&app, poll()).await;
    assert_eq!(body["commands"], json!([]));
}

#[tokio::test]
async fn missing_and_insufficient_credentials() {
    let (_dir, app, plane) = app();

    // No credentials at all.
    let (status, body) = send(
        &app,
        post_json("/devices/broadcast", &json!({"message": "hi"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "auth");

    // Valid session, wrong permission: rejected before any queue work.
    let token = token_with(&plane, &["device.view"]);
    let (status, body) = send(
        &app,
        with_bearer(post_json("/devices/broadcast", &json!({"message": "hi"})), &token),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    // Bad device pair.
    let (status, body) = send(
        &app,
        with_device(post_json("/devices/checkin", &json!({})), "dev-x", "nope"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "device-auth");
}

#[tokio::test]
async fn enqueue_to_unknown_device_is_404() {
    let (_dir, app, plane) = app();
    let token = token_with(&plane, &["device.control"]);

    let (status, body) = send(
        &app,
        with_bearer(
            post_json(
                "/devices/commands/enqueue",
                &json!({"deviceId": "dev-ghost", "command": {}}),
            ),
            &token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "device-not-found");
}

#[tokio::test]
async fn file_push_pull_download_round_trip() {
    let (_dir, app, plane) = app();

    let (_, enroll) = send(&app, post_json("/devices/enroll", &json!({}))).await;
    let device_id = enroll["device_id"].as_str().unwrap().to_string();
    let device_token = enroll["device_token"].as_str().unwrap().to_string();

    let payload = b"report contents \x00\x01";
    let encoded = {
        use base64::Engine as _;
        base64::engine::general_purpose::STANDARD.encode(payload)
    };

    let token = token_with(&plane, &["device.control"]);
    let (status, body) = send(
        &app,
        with_bearer(
            post_json(
                "/files/push",
                &json!({"target": device_id, "name": "report.bin", "content_base64": encoded}),
            ),
            &token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let file_id = body["file_id"].as_str().unwrap().to_string();

    // Device drains its pending mailbox once.
    let (status, body) = send(
        &app,
        with_device(
            Request::builder().uri("/files/pending").body(Body::empty()).unwrap(),
            &device_id,
            &device_token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["files"][0]["file_id"], file_id.as_str());
    assert_eq!(body["files"][0]["name"], "report.bin");

    // Download is public and byte-identical.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/files/download/{file_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(bytes.as_ref(), payload);

    // Unknown id.
    let (status, body) = send(
        &app,
        Request::builder()
            .uri("/files/download/nope")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "file-not-found");
}

#[tokio::test]
async fn policy_overlay_and_transparency() {
    let (_dir, app, plane) = app();
    let editor = token_with(&plane, &["policy.edit"]);

    let (status, _) = send(
        &app,
        with_bearer(
            post_json(
                "/policies/set",
                &json!({"scope": "default", "policy": {"screen_time": {"max_minutes": 60}, "wifi": {"psk": "s3cret"}}}),
            ),
            &editor,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        with_bearer(
            post_json(
                "/policies/set",
                &json!({"scope": "device", "deviceId": "dev-1", "policy": {"screen_time": {"max_minutes": 30}}}),
            ),
            &editor,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Operator view of the merged documents.
    let viewer = token_with(&plane, &[]);
    let (status, body) = send(
        &app,
        with_bearer(
            Request::builder()
                .uri("/devices/policies?deviceId=dev-1")
                .body(Body::empty())
                .unwrap(),
            &viewer,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["screen_time"]["max_minutes"], 30);

    let (_, body) = send(
        &app,
        with_bearer(
            Request::builder()
                .uri("/devices/policies?deviceId=dev-2")
                .body(Body::empty())
                .unwrap(),
            &viewer,
        ),
    )
    .await;
    assert_eq!(body["screen_time"]["max_minutes"], 60);

    // The public transparency view never leaks unrelated keys.
    let (status, body) = send(
        &app,
        Request::builder()
            .uri("/policies/view?deviceId=dev-1")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["screen_time"]["max_minutes"], 30);
    assert!(body.get("wifi").is_none());
}

#[tokio::test]
async fn telemetry_upload_and_view() {
    let (_dir, app, plane) = app();

    let (_, enroll) = send(&app, post_json("/devices/enroll", &json!({}))).await;
    let device_id = enroll["device_id"].as_str().unwrap().to_string();
    let device_token = enroll["device_token"].as_str().unwrap().to_string();

    for n in 0..3 {
        let (status, _) = send(
            &app,
            with_device(
                post_json("/telemetry/upload", &json!({"event": {"n": n}})),
                &device_id,
                &device_token,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let viewer = token_with(&plane, &["device.view"]);
    let (status, body) = send(
        &app,
        with_bearer(
            Request::builder()
                .uri(format!("/telemetry/{device_id}"))
                .body(Body::empty())
                .unwrap(),
            &viewer,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let entries = body["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["event"]["n"], 0);

    // A device with no telemetry reads back as empty, not an error.
    let (status, body) = send(
        &app,
        with_bearer(
            Request::builder()
                .uri("/telemetry/dev-quiet")
                .body(Body::empty())
                .unwrap(),
            &viewer,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entries"], json!([]));
}

#[tokio::test]
async fn device_fetches_its_own_policy() {
    let (_dir, app, plane) = app();

    let (_, enroll) = send(&app, post_json("/devices/enroll", &json!({}))).await;
    let device_id = enroll["device_id"].as_str().unwrap().to_string();
    let device_token = enroll["device_token"].as_str().unwrap().to_string();

    let editor = token_with(&plane, &["policy.edit"]);
    send(
        &app,
        with_bearer(
            post_json(
                "/policies/set",
                &json!({"scope": "device", "deviceId": device_id, "policy": {"exam_mode": true}}),
            ),
            &editor,
        ),
    )
    .await;

    // The device's own credentials select its document; no query needed.
    let (status, body) = send(
        &app,
        with_device(
            Request::builder()
                .uri("/devices/policies")
                .body(Body::empty())
                .unwrap(),
            &device_id,
            &device_token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["exam_mode"], true);
}
