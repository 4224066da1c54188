//! HTTP API tests driven through the router in-process.
//!
//! Provider outcomes come from cassettes in `test_fixtures`, so no test
//! touches the network.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use serde_json::Value;
use tower::ServiceExt;

use photogen::config::{Config, Settings};
use photogen::context::ServiceContext;
use photogen::{server, PhotoService};

const BOUNDARY: &str = "photogen-test-boundary";

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_fixtures")
}

fn settings_with(config: &Config) -> Settings {
    config.resolve_with(|_| None).unwrap()
}

fn app(settings: &Settings, cassette: Option<&Path>) -> Router {
    let ctx = match cassette {
        Some(path) => ServiceContext::replaying(settings, path).unwrap(),
        None => ServiceContext::live(settings),
    };
    let service = Arc::new(PhotoService::from_context(ctx, settings));
    server::build_router(service, &settings.server.allowed_origins)
}

fn replay_app(cassette: &str) -> Router {
    let settings = settings_with(&Config::default());
    app(&settings, Some(&fixtures_dir().join(cassette)))
}

fn jpeg(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([180, 40, 40])))
        .write_to(&mut buf, ImageFormat::Jpeg)
        .unwrap();
    buf.into_inner()
}

fn multipart_body(image: Option<&[u8]>, golfer: Option<&str>) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(bytes) = image {
        let head = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"image\"; filename=\"me.jpg\"\r\n\
             Content-Type: image/jpeg\r\n\r\n"
        );
        body.extend_from_slice(head.as_bytes());
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    if let Some(name) = golfer {
        let field = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"golfer\"\r\n\r\n{name}\r\n"
        );
        body.extend_from_slice(field.as_bytes());
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn post_generate(app: Router, body: Vec<u8>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/photo/generate")
        .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn empty_image_is_image_required() {
    let app = replay_app("providers_down.cassette.yaml");
    let (status, json) = post_generate(app, multipart_body(Some(&[]), Some("Tiger Woods"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "image_required");
}

#[tokio::test]
async fn missing_image_wins_over_unknown_golfer() {
    let app = replay_app("providers_down.cassette.yaml");
    let (status, json) = post_generate(app, multipart_body(None, Some("Nobody"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "image_required");
}

#[tokio::test]
async fn unknown_golfer_is_rejected() {
    let (status, json) = post_generate(
        replay_app("providers_down.cassette.yaml"),
        multipart_body(Some(&jpeg(16, 16)), Some("Unknown Person")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "invalid_golfer");
}

#[tokio::test]
async fn corrupt_image_is_invalid_image() {
    let (status, json) = post_generate(
        replay_app("providers_down.cassette.yaml"),
        multipart_body(Some(b"definitely not an image"), Some("Tiger Woods")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "invalid_image");
}

#[tokio::test]
async fn upload_over_limit_is_too_large() {
    let mut config = Config::default();
    config.server.max_upload_bytes = 1024;
    let app = app(&settings_with(&config), None);

    let (status, json) =
        post_generate(app, multipart_body(Some(&vec![0u8; 2048]), Some("Tiger Woods"))).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json["error"], "image_too_large");
}

#[tokio::test]
async fn body_over_transport_limit_is_too_large() {
    let mut config = Config::default();
    config.server.max_upload_bytes = 1024;
    let app = app(&settings_with(&config), None);

    let (status, json) =
        post_generate(app, multipart_body(Some(&vec![0u8; 256 * 1024]), Some("Tiger Woods"))).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json["error"], "image_too_large");
}

#[tokio::test]
async fn all_providers_down_falls_back_to_card() {
    let (status, json) = post_generate(
        replay_app("providers_down.cassette.yaml"),
        multipart_body(Some(&jpeg(2048, 1024)), Some("Greg Norman")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["provider"], "fallback");
    assert_eq!(json["reason"], "upstream_rejected");
    assert!(json["imageUrl"].as_str().unwrap().starts_with("data:image/png;base64,"));
}

#[tokio::test]
async fn no_credentials_falls_back_with_missing_credentials() {
    let app = app(&settings_with(&Config::default()), None);
    let (status, json) =
        post_generate(app, multipart_body(Some(&jpeg(64, 48)), Some("Rory McIlroy"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["provider"], "fallback");
    assert_eq!(json["reason"], "missing_credentials");
}

#[tokio::test]
async fn bypassed_providers_fall_back_with_all_bypassed() {
    let mut config = Config::default();
    config.providers.openai.bypass = true;
    let cassette = fixtures_dir().join("openai_success.cassette.yaml");
    let app = app(&settings_with(&config), Some(&cassette));

    let (status, json) =
        post_generate(app, multipart_body(Some(&jpeg(64, 48)), Some("Tiger Woods"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["provider"], "fallback");
    assert_eq!(json["reason"], "all_bypassed");
}

#[tokio::test]
async fn malformed_provider_response_is_reported() {
    let (status, json) = post_generate(
        replay_app("malformed_response.cassette.yaml"),
        multipart_body(Some(&jpeg(64, 48)), Some("John Daly")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["provider"], "fallback");
    assert_eq!(json["reason"], "invalid_upstream_response");
}

#[tokio::test]
async fn provider_success_is_attributed() {
    let (status, json) = post_generate(
        replay_app("openai_success.cassette.yaml"),
        multipart_body(Some(&jpeg(64, 48)), Some("Tiger Woods")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["provider"], "openai");
    assert!(json.get("reason").is_none());
    assert_eq!(json["imageUrl"], "data:image/png;base64,iVBORw0KGgoAAAANSUhEUg==");
}

#[tokio::test]
async fn health_lists_provider_plan() {
    let app = replay_app("openai_success.cassette.yaml");
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["status"], "ok");
    let providers = json["providers"].as_array().unwrap();
    assert_eq!(providers.len(), 2);
    assert_eq!(providers[0]["id"], "openai");
    assert_eq!(providers[0]["enabled"], true);
    assert_eq!(providers[1]["id"], "stability");
    assert_eq!(providers[1]["enabled"], false);
}
