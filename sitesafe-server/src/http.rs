//! HTTP API and upload pages

use crate::error::ApiError;
use crate::render;
use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use base64::{engine::general_purpose, Engine as _};
use parking_lot::Mutex;
use serde::Serialize;
use sitesafe_core::{ClassCatalog, CountTable, Detection, SafetyVerdict, Severity};
use sitesafe_eye::processing::class_color_hex;
use sitesafe_eye::{InspectionPipeline, InspectionReport};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

/// Multipart field carrying the uploaded image
pub const IMAGE_FIELD: &str = "image";

/// Allowance over `max_upload_bytes` for multipart boundaries and part headers
const MULTIPART_ENVELOPE_BYTES: usize = 16 * 1024;

#[derive(Clone)]
pub struct ApiState {
    pipeline: Arc<Mutex<InspectionPipeline>>,
    detector: Arc<str>,
    catalog: Arc<ClassCatalog>,
    max_upload_bytes: usize,
}

impl ApiState {
    pub fn new(pipeline: InspectionPipeline, max_upload_bytes: usize) -> Self {
        let detector: Arc<str> = Arc::from(pipeline.detector_name());
        let catalog = Arc::new(pipeline.catalog().clone());
        Self {
            pipeline: Arc::new(Mutex::new(pipeline)),
            detector,
            catalog,
            max_upload_bytes,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub detector: String,
}

#[derive(Debug, Serialize)]
pub struct ClassEntry {
    pub id: usize,
    pub label: String,
    pub color: String,
}

#[derive(Debug, Serialize)]
pub struct ClassesResponse {
    pub classes: Vec<ClassEntry>,
}

#[derive(Debug, Serialize)]
pub struct InspectResponse {
    pub width: u32,
    pub height: u32,
    pub detections: Vec<Detection>,
    pub counts: CountTable,
    pub verdict: SafetyVerdict,
    pub severity: Severity,
    pub message: String,
    pub inference_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotated_png: Option<String>,
}

/// Create HTTP router with all routes
pub fn create_router(state: ApiState) -> Router {
    // The image itself is checked against max_upload_bytes in read_upload
    let body_limit = state.max_upload_bytes.saturating_add(MULTIPART_ENVELOPE_BYTES);

    Router::new()
        .route("/", get(index_handler))
        .route("/inspect", post(inspect_page_handler))
        .route("/api/v1/inspect", post(inspect_api_handler))
        .route("/api/v1/classes", get(classes_handler))
        .route("/health", get(health_handler))
        .route("/api/v1/health", get(health_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index_handler() -> Html<String> {
    Html(render::index_page())
}

async fn health_handler(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        detector: state.detector.to_string(),
    })
}

async fn classes_handler(State(state): State<ApiState>) -> Json<ClassesResponse> {
    let classes = state
        .catalog
        .iter()
        .enumerate()
        .map(|(id, label)| ClassEntry {
            id,
            label: label.to_string(),
            color: class_color_hex(id),
        })
        .collect();
    Json(ClassesResponse { classes })
}

async fn inspect_api_handler(
    State(state): State<ApiState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<InspectResponse>, ApiError> {
    let upload = read_upload(multipart, state.max_upload_bytes).await?;
    let report = run_inspection(&state, upload).await?;

    let annotated_png = report
        .annotated_png()?
        .map(|png| general_purpose::STANDARD.encode(png));

    Ok(Json(InspectResponse {
        width: report.width,
        height: report.height,
        severity: report.verdict.severity(),
        message: report.verdict.message().to_string(),
        detections: report.detections,
        counts: report.counts,
        verdict: report.verdict,
        inference_ms: report.inference_ms,
        annotated_png,
    }))
}

async fn inspect_page_handler(
    State(state): State<ApiState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let result = async {
        let upload = read_upload(multipart, state.max_upload_bytes).await?;
        let report = run_inspection(&state, upload).await?;
        let png = report.annotated_png()?;
        Ok::<_, ApiError>(render::report_page(&report, &state.catalog, png.as_deref()))
    }
    .await;

    match result {
        Ok(html) => Html(html).into_response(),
        Err(err) => {
            let status = err.status();
            (status, Html(render::error_page(&err.public_message()))).into_response()
        }
    }
}

/// Pull the image bytes out of the multipart body
async fn read_upload(
    multipart: Result<Multipart, MultipartRejection>,
    limit: usize,
) -> Result<Vec<u8>, ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err(ApiError::MissingImage),
            Err(e) => return Err(multipart_error(e.status(), e.body_text(), limit)),
        };

        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        if let Some(content_type) = field.content_type() {
            if !is_accepted_content_type(content_type) {
                return Err(ApiError::UnsupportedMediaType(content_type.to_string()));
            }
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e.status(), e.body_text(), limit))?;
        if bytes.is_empty() {
            return Err(ApiError::MissingImage);
        }
        if bytes.len() > limit {
            return Err(multipart_error(StatusCode::PAYLOAD_TOO_LARGE, String::new(), limit));
        }

        debug!("Received upload of {} bytes", bytes.len());
        return Ok(bytes.to_vec());
    }
}

fn multipart_error(status: StatusCode, text: String, limit: usize) -> ApiError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        warn!("Rejected upload over {} bytes", limit);
        ApiError::PayloadTooLarge { limit }
    } else {
        ApiError::BadRequest(text)
    }
}

/// Browsers label JPEG and PNG uploads as image/*; some clients send
/// a generic binary type instead
fn is_accepted_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    matches!(
        mime.as_str(),
        "image/jpeg" | "image/jpg" | "image/pjpeg" | "image/png" | "application/octet-stream"
    )
}

/// Run the pipeline off the async executor
async fn run_inspection(state: &ApiState, upload: Vec<u8>) -> Result<InspectionReport, ApiError> {
    let pipeline = state.pipeline.clone();
    let report = tokio::task::spawn_blocking(move || pipeline.lock().inspect_bytes(&upload))
        .await
        .map_err(|e| ApiError::Internal(format!("inspection task failed: {}", e)))??;

    info!(
        "Inspected {}x{} image: {} detections, {}",
        report.width,
        report.height,
        report.detections.len(),
        report.verdict.message()
    );
    Ok(report)
}
