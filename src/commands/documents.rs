use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use tracing::info;

use crate::commands::upload::parse_multipart;
use crate::core::errors::AppResult;
use crate::core::types::StoreDocumentResponse;
use crate::parser::native_parser;
use crate::AppState;

/// Extracts and stores a single document for later ask/summarize calls.
/// Re-uploading identical bytes returns the existing id.
pub async fn upload_document(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<StoreDocumentResponse>> {
    let mut files = parse_multipart(multipart?, &["file"]).await?;
    let document = files.take("file")?;

    let (document, text) = tokio::task::spawn_blocking(move || {
        native_parser::extract_document(&document).map(|text| (document, text))
    })
    .await??;

    let document_id = state.orchestrator.register(&document, &text);
    info!(
        document_id = %document_id,
        filename = %document.filename,
        characters = text.char_count(),
        "document stored"
    );
    Ok(Json(StoreDocumentResponse {
        document_id,
        filename: document.filename,
        characters: text.char_count(),
    }))
}
