//! HTTP surface: router, handlers and graceful shutdown.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::error::{CodecError, PhotoError};
use crate::model::{FailureReason, GenerationRequest, ProviderConfig};
use crate::service::PhotoService;

/// Room for multipart boundaries and the `golfer` field on top of the image.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

impl IntoResponse for PhotoError {
    fn into_response(self) -> Response {
        let status = match self {
            PhotoError::ImageRequired
            | PhotoError::InvalidSubject(_)
            | PhotoError::BadRequest(_)
            | PhotoError::Decode(CodecError::Decode(_)) => StatusCode::BAD_REQUEST,
            PhotoError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            PhotoError::Decode(_)
            | PhotoError::Config(_)
            | PhotoError::Io(_)
            | PhotoError::Internal(_) => {
                error!(error = %self, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(serde_json::json!({ "error": self.code() }))).into_response()
    }
}

/// Body of a successful generate call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    /// `data:` URL of the image.
    pub image_url: String,
    /// Provider id or `"fallback"`.
    pub provider: &'static str,
    /// Present only on fallback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<FailureReason>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    providers: Vec<ProviderConfig>,
}

/// Build the application router.
pub fn build_router(service: Arc<PhotoService>, allowed_origins: &[String]) -> Router {
    let body_limit = service.max_upload_bytes() + MULTIPART_OVERHEAD;

    Router::new()
        .route("/api/photo/generate", post(generate_photo))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| {
            o.parse()
                .map_err(|e| warn!(origin = %o, error = %e, "ignoring invalid CORS origin"))
                .ok()
        })
        .collect();
    let allow_origin =
        if allowed_origins.is_empty() { AllowOrigin::any() } else { AllowOrigin::list(origins) };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60))
}

fn multipart_error(service: &PhotoService, e: &MultipartError) -> PhotoError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        PhotoError::TooLarge { limit: service.max_upload_bytes() }
    } else {
        PhotoError::BadRequest(e.body_text())
    }
}

/// POST /api/photo/generate
///
/// Multipart fields: `image` (file) and `golfer` (roster name).
async fn generate_photo(
    State(service): State<Arc<PhotoService>>,
    mut multipart: Multipart,
) -> Result<Json<GenerateResponse>, PhotoError> {
    let mut image_bytes = Vec::new();
    let mut golfer = String::new();

    let reject = |e: MultipartError| multipart_error(&service, &e);

    while let Some(field) = multipart.next_field().await.map_err(reject)? {
        match field.name() {
            Some("image") => image_bytes = field.bytes().await.map_err(reject)?.to_vec(),
            Some("golfer") => golfer = field.text().await.map_err(reject)?,
            _ => {}
        }
    }

    let result = service
        .generate(GenerationRequest { image_bytes, subject_name: golfer.trim().to_string() })
        .await?;

    Ok(Json(GenerateResponse {
        image_url: result.data_url(),
        provider: result.provider_label(),
        reason: result.reason(),
    }))
}

/// GET /health
async fn health(State(service): State<Arc<PhotoService>>) -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok", providers: service.plan() })
}

/// Bind and serve until Ctrl-C or SIGTERM.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or the server fails.
pub async fn serve(service: Arc<PhotoService>, config: &ServerConfig) -> Result<(), PhotoError> {
    let app = build_router(service, &config.allowed_origins);

    let address = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
