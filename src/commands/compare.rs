use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use tracing::info;

use crate::commands::upload::parse_multipart;
use crate::core::errors::AppResult;
use crate::core::types::CompareDocumentsResponse;
use crate::AppState;

pub async fn compare_documents(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<CompareDocumentsResponse>> {
    let mut files = parse_multipart(multipart?, &["document1", "document2"]).await?;
    let document_a = files.take("document1")?;
    let document_b = files.take("document2")?;
    info!(
        document1 = %document_a.filename,
        document2 = %document_b.filename,
        "comparing documents"
    );

    let outcome = state.orchestrator.compare(document_a, document_b).await?;
    let (document1_id, document2_id) = outcome.result.source_ids;
    Ok(Json(CompareDocumentsResponse {
        comparison_summary: outcome.result.narrative,
        changes: outcome.result.changes,
        document1_content: outcome.text_a.into_string(),
        document2_content: outcome.text_b.into_string(),
        document1_id,
        document2_id,
    }))
}
