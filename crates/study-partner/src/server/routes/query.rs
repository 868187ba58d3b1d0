//! Question answering and conversation endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{AskResponse, ConversationResponse, QueryRequest};

/// POST /api/query - Ask a question about the loaded documents
pub async fn query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<AskResponse>> {
    tracing::info!("Query: \"{}\"", request.question);

    let mut session = state.session().lock().await;
    let response = state.answer(&mut session, &request.question).await?;

    tracing::info!(
        "Answered with {} source(s) in {}ms",
        response.sources.len(),
        response.processing_time_ms
    );

    Ok(Json(response))
}

/// GET /api/conversation - The conversation so far
pub async fn get_conversation(State(state): State<AppState>) -> Json<ConversationResponse> {
    let session = state.session().lock().await;
    Json(ConversationResponse {
        messages: session.conversation().to_vec(),
    })
}

/// DELETE /api/conversation - Clear the conversation
pub async fn clear_conversation(State(state): State<AppState>) -> StatusCode {
    state.session().lock().await.reset();
    StatusCode::NO_CONTENT
}
