use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::core::errors::AppResult;
use crate::core::types::{
    AskRequest, AskResponse, DocumentRef, ExplainRequest, ExplainResponse, SuggestionsResponse,
    SummaryResponse,
};
use crate::AppState;

// Bodies are taken as `Result` so malformed JSON gets the `{code, message}`
// error shape instead of axum's plain-text rejection.

pub async fn ask(
    State(state): State<AppState>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> AppResult<Json<AskResponse>> {
    let Json(request) = payload?;
    let answer = state
        .assistant
        .ask(&request.document_id, &request.question)
        .await?;
    Ok(Json(AskResponse { answer }))
}

pub async fn summarize(
    State(state): State<AppState>,
    payload: Result<Json<DocumentRef>, JsonRejection>,
) -> AppResult<Json<SummaryResponse>> {
    let Json(request) = payload?;
    let summary = state.assistant.summarize(&request.document_id).await?;
    Ok(Json(SummaryResponse { summary }))
}

pub async fn suggestions(
    State(state): State<AppState>,
    payload: Result<Json<DocumentRef>, JsonRejection>,
) -> AppResult<Json<SuggestionsResponse>> {
    let Json(request) = payload?;
    let suggestions = state
        .assistant
        .suggest_questions(&request.document_id)
        .await?;
    Ok(Json(SuggestionsResponse { suggestions }))
}

pub async fn explain(
    State(state): State<AppState>,
    payload: Result<Json<ExplainRequest>, JsonRejection>,
) -> AppResult<Json<ExplainResponse>> {
    let Json(request) = payload?;
    let explanation = state
        .assistant
        .explain(&request.text, request.document_id.as_deref())
        .await?;
    Ok(Json(ExplainResponse { explanation }))
}
