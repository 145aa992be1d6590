//! HTTP server exposing the recognition pipeline.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use license_ocr::core::OcrError;
use license_ocr::domain::{DocumentRecognitionResult, LicenseSide};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::ServiceConfig;
use crate::engine::{RecognizerEngine, SharedEngine};
use crate::metrics::Metrics;

/// Application state shared across handlers.
struct AppState {
    engine: SharedEngine,
    metrics: Metrics,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

/// Recognition request: the storage guid of the document photo.
#[derive(Debug, Deserialize)]
pub struct RecognizeRequest {
    pub guid: String,
    /// Caller-supplied correlation id; generated when absent.
    #[serde(default)]
    pub request_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecognizeResponse {
    pub success: bool,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<DocumentRecognitionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RecognizeResponse {
    fn ok(request_id: String, result: DocumentRecognitionResult) -> Self {
        Self {
            success: true,
            request_id,
            result: Some(result),
            error: None,
        }
    }

    fn error(request_id: String, message: String) -> Self {
        Self {
            success: false,
            request_id,
            result: None,
            error: Some(message),
        }
    }
}

/// Runs the HTTP server until shutdown.
pub async fn run_server(
    config: ServiceConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    info!("initializing recognition engine");
    let engine = Arc::new(RecognizerEngine::new(&config)?);

    let state = Arc::new(AppState {
        engine,
        metrics: Metrics::new(),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/api/v1/recognize", post(recognize_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| format!("invalid listen address: {e}"))?;

    info!("server listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server shutdown complete");
    Ok(())
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.metrics.snapshot())
}

async fn recognize_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RecognizeRequest>,
) -> impl IntoResponse {
    let request_id = request
        .request_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    info!(request_id = %request_id, guid = %request.guid, "processing recognition request");
    state.metrics.record_request();

    let fetch_start = Instant::now();
    let image = match state.engine.fetch_image(&request.guid).await {
        Ok(image) => image,
        Err(e) => {
            error!(request_id = %request_id, error = %e, "image load failed");
            state.metrics.record_image_load_failure();
            return (
                StatusCode::BAD_REQUEST,
                Json(RecognizeResponse::error(request_id, e.to_string())),
            );
        }
    };
    let fetch_ms = fetch_start.elapsed().as_millis() as u64;
    state.metrics.record_image_load_time(fetch_ms);
    info!(
        request_id = %request_id,
        width = image.width(),
        height = image.height(),
        fetch_ms,
        "image loaded"
    );

    let start = Instant::now();
    let result = match process(&state, image) {
        Ok(result) => result,
        Err(e) => {
            error!(request_id = %request_id, error = %e, "recognition failed");
            state.metrics.record_request_failure();
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(RecognizeResponse::error(request_id, e.to_string())),
            );
        }
    };

    info!(
        request_id = %request_id,
        found = result.is_document_found,
        side = ?result.side,
        processing_ms = start.elapsed().as_millis() as u64,
        "recognition completed"
    );
    (
        StatusCode::OK,
        Json(RecognizeResponse::ok(request_id, result)),
    )
}

/// Runs the pipeline and keeps the metrics in step with the outcome.
fn process(state: &AppState, image: image::RgbImage) -> Result<DocumentRecognitionResult, OcrError> {
    let outcome = state.engine.detect(image)?;
    if let Some(score) = RecognizerEngine::min_detection_score(&outcome) {
        state.metrics.set_detection_min_score(score);
    }
    if !outcome.is_correct {
        state.metrics.record_detection_failure();
    }
    let front = outcome.side == LicenseSide::Front;
    let result = state.engine.recognize_document(outcome)?;

    if result.is_document_found && front {
        let unrecognized = result.fields.iter().filter(|f| !f.is_recognized).count();
        state.metrics.record_recognition_failures(unrecognized as u64);
        let min_word_score = result
            .fields
            .iter()
            .filter(|f| f.is_recognized)
            .map(|f| f.text_score)
            .fold(1.0_f32, f32::min);
        state.metrics.set_recognition_min_score(min_word_score);
    }
    Ok(result)
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => error!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, starting graceful shutdown"),
        _ = terminate => info!("received SIGTERM, starting graceful shutdown"),
    }
}
