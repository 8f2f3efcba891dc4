//! HTTP surface.
//!
//! One endpoint does the work: `POST /colorize` takes a multipart upload
//! whose first non-empty file field is the image and answers with the
//! colorized result as JPEG. Anything wrong with the upload itself
//! (missing field, undecodable or empty image) is a `400 Bad Request`;
//! failures past decode (inference, shape contracts, encoding) are a
//! `500 Internal Server Error`. A failed request never takes the process
//! down: the model is immutable after load, so no request can corrupt it
//! for the others. `GET /health` answers `200` for liveness probes.

use std::sync::Arc;

use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::Error;
use crate::image::{decode_image, encode_jpeg, JPEG_QUALITY};
use crate::model::ChromaModel;
use crate::pipeline;

/// Largest accepted request body (32 MiB).
const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

#[derive(Clone)]
struct AppState {
    model: Arc<dyn ChromaModel>,
}

/// Build the application router around a loaded model.
///
/// CORS is wide open (all origins, methods, and headers) for development;
/// restrict allowed origins when deploying.
pub fn router(model: Arc<dyn ChromaModel>) -> Router {
    Router::new()
        .route("/colorize", post(colorize_handler))
        .route("/health", get(|| async { StatusCode::OK }))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { model })
}

async fn colorize_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        let bytes = field.bytes().await?;
        if !bytes.is_empty() {
            upload = Some(bytes);
            break;
        }
    }
    let bytes = upload.ok_or(ApiError::MissingFile)?;

    // Decode, colorspace math, and inference are CPU-bound; keep them off
    // the async worker threads.
    let model = Arc::clone(&state.model);
    let jpeg = tokio::task::spawn_blocking(move || {
        let img = decode_image(&bytes)?;
        let colorized = pipeline::colorize(&img, model.as_ref())?;
        encode_jpeg(&colorized, JPEG_QUALITY)
    })
    .await
    .map_err(|_| ApiError::WorkerGone)??;

    Ok(([(header::CONTENT_TYPE, "image/jpeg")], jpeg).into_response())
}

/// Request-level failures and their HTTP mapping.
enum ApiError {
    /// No non-empty file field in the multipart body.
    MissingFile,
    /// Malformed multipart payload.
    Upload(MultipartError),
    /// The pipeline rejected or failed the request.
    Pipeline(Error),
    /// The blocking worker panicked or was cancelled.
    WorkerGone,
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::Upload(err)
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self::Pipeline(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::MissingFile => (
                StatusCode::BAD_REQUEST,
                "no file field in upload".to_string(),
            ),
            Self::Upload(err) => (StatusCode::BAD_REQUEST, format!("malformed upload: {err}")),
            Self::Pipeline(err @ (Error::ImageDecode { .. } | Error::EmptyImage { .. })) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            Self::Pipeline(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            Self::WorkerGone => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "colorization worker failed".to_string(),
            ),
        };

        if status.is_client_error() {
            tracing::warn!("request rejected: {message}");
        } else {
            tracing::error!("request failed: {message}");
        }

        (status, message).into_response()
    }
}
