//! Document upload and listing endpoints

use axum::{
    extract::{Multipart, State},
    Json,
};

use crate::error::{Error, Result};
use crate::ingestion::UploadedFile;
use crate::server::state::AppState;
use crate::types::{DocumentsResponse, ProcessResponse};

/// Collect uploaded files from a multipart body.
/// Browsers send an empty, unnamed part when no file is chosen; those are skipped.
pub async fn read_uploads(mut multipart: Multipart) -> Result<Vec<UploadedFile>> {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        Error::validation(format!("Failed to read multipart field: {}", e))
    })? {
        let filename = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => continue,
        };

        let data = field.bytes().await.map_err(|e| {
            Error::validation(format!("Failed to read {}: {}", filename, e))
        })?;

        tracing::info!("Received file: {} ({} bytes)", filename, data.len());
        files.push(UploadedFile::new(filename, data));
    }

    Ok(files)
}

/// GET /api/documents - Currently loaded documents
pub async fn list_documents(State(state): State<AppState>) -> Json<DocumentsResponse> {
    let session = state.session().lock().await;
    Json(DocumentsResponse {
        processed_files: session.processed_files().to_vec(),
        fragment_count: session.fragments().len(),
    })
}

/// POST /api/documents - Upload and process files, replacing the loaded set
pub async fn upload_documents(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ProcessResponse>> {
    let files = read_uploads(multipart).await?;

    let mut session = state.session().lock().await;
    let response = state.process_uploads(&mut session, files).await?;

    tracing::info!(
        "Processed {} file(s) into {} fragments in {}ms ({} failed)",
        response.processed_files.len(),
        response.fragment_count,
        response.processing_time_ms,
        response.errors.len()
    );

    Ok(Json(response))
}
