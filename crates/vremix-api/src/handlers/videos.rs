//! Upload, download and cleanup handlers.

use axum::body::Body;
use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::Response;
use axum::Json;
use serde::Serialize;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::{error, info, warn};

use vremix_media::{describe, discard, process, remove_if_exists};
use vremix_models::{ProcessingParameters, VideoDescriptor};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::store::UploadSlot;

/// MIME type of every processed output.
pub const OUTPUT_MIME_TYPE: &str = "video/mp4";

/// Successful upload response.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub status: String,
    pub message: String,
    pub output_filename: String,
    pub video_info: VideoDescriptor,
}

/// Cleanup response; absence of the file is not an error.
#[derive(Debug, Serialize)]
pub struct CleanupResponse {
    pub status: String,
    pub message: String,
}

/// Accept a video upload, transform it and report the processed file.
///
/// Multipart fields: `video` (file, required), `rotation_angle` (float, default 2.0),
/// `frame_interval` (integer, default 10), `scale_factor` (float, default 1.03).
/// The uploaded input is deleted whether processing succeeds or fails.
pub async fn upload_video(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let mut params = ProcessingParameters::default();
    let mut slot: Option<UploadSlot> = None;

    let result = match receive_form(&state, &mut multipart, &mut params, &mut slot).await {
        Ok(()) => match &slot {
            Some(slot) => transform(&state, slot, &params).await,
            None => Err(ApiError::unprocessable("Missing required field: video")),
        },
        Err(e) => Err(e),
    };

    if let Some(slot) = &slot {
        discard(&slot.input_path).await;
    }

    match result {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            error!(error = %e, "Upload processing failed");
            Err(e)
        }
    }
}

/// Read all multipart fields, streaming the video to disk.
///
/// `slot` is set as soon as the input file is created so the caller can
/// remove it even when a later field fails.
async fn receive_form(
    state: &AppState,
    multipart: &mut Multipart,
    params: &mut ProcessingParameters,
    slot: &mut Option<UploadSlot>,
) -> ApiResult<()> {
    let limit = state.config.max_upload_size;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "video" => {
                if slot.is_some() {
                    return Err(ApiError::unprocessable("Only one video file may be uploaded"));
                }
                let allocated = state.store.allocate(field.file_name());
                let input_path = allocated.input_path.clone();
                *slot = Some(allocated);

                let bytes = save_field(field, &input_path, limit).await?;
                info!(input = %input_path.display(), bytes, "Upload saved");
            }
            "rotation_angle" => params.rotation_angle = parse_field(field, &name, limit).await?,
            "frame_interval" => params.frame_interval = parse_field(field, &name, limit).await?,
            "scale_factor" => params.scale_factor = parse_field(field, &name, limit).await?,
            other => warn!(field = other, "Ignoring unknown form field"),
        }
    }
    Ok(())
}

/// Stream a file field to `path`, returning the number of bytes written.
async fn save_field(mut field: Field<'_>, path: &std::path::Path, limit: u64) -> ApiResult<u64> {
    let mut file = File::create(path).await?;
    let mut written = 0u64;

    while let Some(chunk) = field.chunk().await.map_err(|e| multipart_error(e, limit))? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;

    Ok(written)
}

async fn parse_field<T: std::str::FromStr>(field: Field<'_>, name: &str, limit: u64) -> ApiResult<T> {
    let text = field.text().await.map_err(|e| multipart_error(e, limit))?;
    text.trim()
        .parse()
        .map_err(|_| ApiError::unprocessable(format!("Invalid value for {}: {:?}", name, text)))
}

/// Map a multipart read failure; `limit` is the configured upload ceiling.
fn multipart_error(e: MultipartError, limit: u64) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(format!("upload exceeds the {} byte limit", limit))
    } else {
        ApiError::unprocessable(e.body_text())
    }
}

/// Validate, run the pipeline and describe the result.
async fn transform(
    state: &AppState,
    slot: &UploadSlot,
    params: &ProcessingParameters,
) -> ApiResult<UploadResponse> {
    state.validator.validate(&slot.input_path).await?;

    process(state.engine.as_ref(), &slot.input_path, &slot.output_path, params).await?;

    let video_info = match describe(state.engine.as_ref(), &slot.output_path).await {
        Ok(info) => info,
        Err(e) => {
            discard(&slot.output_path).await;
            return Err(e.into());
        }
    };

    Ok(UploadResponse {
        status: "success".to_string(),
        message: "Video processing complete".to_string(),
        output_filename: slot.output_filename.clone(),
        video_info,
    })
}

/// Stream a processed file from the output store.
pub async fn download_video(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> ApiResult<Response> {
    let path = state.store.output_path(&filename)?;

    let file = match File::open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::not_found("file not found"))
        }
        Err(e) => return Err(e.into()),
    };

    let metadata = file.metadata().await?;
    if !metadata.is_file() {
        return Err(ApiError::not_found("file not found"));
    }

    let disposition = format!("attachment; filename=\"{}\"", filename.replace('"', "_"));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, OUTPUT_MIME_TYPE)
        .header(header::CONTENT_LENGTH, metadata.len())
        .header(header::CONTENT_DISPOSITION, disposition)
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| ApiError::internal(e.to_string()))
}

/// Delete a processed file from the output store.
pub async fn cleanup_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> ApiResult<Json<CleanupResponse>> {
    let path = state.store.output_path(&filename)?;
    let deleted = remove_if_exists(&path).await?;

    info!(filename = %filename, deleted, "Cleanup requested");

    Ok(Json(CleanupResponse {
        status: "success".to_string(),
        message: if deleted { "deleted" } else { "not found" }.to_string(),
    }))
}
