//! Upload handler

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::{AppError, AppResult, AppState};

const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
}

/// Replace the raw student table and re-run the pipeline.
///
/// The new raw table and both outputs are committed together; any failure
/// leaves all three tables as they were.
pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<UploadResponse>> {
    let mut multipart = multipart.map_err(|e| AppError::UploadRejected(e.body_text()))?;
    let data = read_file_field(&mut multipart).await?;

    tracing::info!("Received upload of {} bytes", data.len());

    // The guard moves into the blocking task so a dropped request cannot
    // release the lock before its commit finishes.
    let guard = state.upload_lock.clone().lock_owned().await;
    let store = state.store.clone();
    let pipeline = state.pipeline.clone();
    let report = tokio::task::spawn_blocking(move || {
        let result = pipeline.ingest(store.as_ref(), data);
        drop(guard);
        result
    })
    .await??;

    tracing::info!(
        run_id = %report.run_id,
        elapsed_ms = report.elapsed_ms(),
        "{}",
        report.summary()
    );

    Ok(Json(UploadResponse {
        success: true,
        message: format!("File processed successfully. {}", report.summary()),
    }))
}

async fn read_file_field(multipart: &mut Multipart) -> AppResult<Vec<u8>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(rejected)?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let bytes = field.bytes().await.map_err(rejected)?;

        if bytes.is_empty() {
            return Err(AppError::UploadRejected("No selected file".to_string()));
        }
        return Ok(bytes.to_vec());
    }

    Err(AppError::UploadRejected("No file part in the request".to_string()))
}

/// Body-limit overruns keep their 413; every other multipart failure is a bad request
fn rejected(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::UploadRejected(err.body_text())
    }
}
