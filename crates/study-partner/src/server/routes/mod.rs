//! Routes for the study partner server

pub mod documents;
pub mod page;
pub mod query;
pub mod settings;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use crate::server::state::AppState;

/// Build the JSON API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        .route("/info", get(info))
        .route(
            "/credential",
            put(settings::put_credential).delete(settings::delete_credential),
        )
        .route("/settings", get(settings::get_settings).put(settings::put_settings))
        // Uploads get the configured body limit
        .route(
            "/documents",
            get(documents::list_documents)
                .post(documents::upload_documents)
                .layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/query", post(query::query))
        .route(
            "/conversation",
            get(query::get_conversation).delete(query::clear_conversation),
        )
}

/// Build the browser form routes
pub fn page_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(page::index))
        .route("/credential", post(page::set_credential))
        .route("/settings", post(page::update_settings))
        .route(
            "/process",
            post(page::process).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/ask", post(page::ask))
        .route("/reset", post(page::reset))
}

/// API info endpoint
async fn info() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "name": "study-partner",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Chat with your study materials: upload PDFs, ask questions, get answers grounded in your notes",
        "endpoints": {
            "PUT /api/credential": "Set the completion API key",
            "DELETE /api/credential": "Forget the completion API key",
            "GET /api/settings": "Current settings and their bounds",
            "PUT /api/settings": "Update temperature, chunk size and relevant chunk count",
            "GET /api/documents": "Processed files and fragment count",
            "POST /api/documents": "Upload and process documents (replaces the loaded set)",
            "POST /api/query": "Ask a question about the loaded documents",
            "GET /api/conversation": "Conversation log",
            "DELETE /api/conversation": "Clear the conversation"
        }
    }))
}
