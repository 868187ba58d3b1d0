//! Browser-facing form handlers. Every action re-renders the page.

use axum::{
    extract::{Multipart, State},
    response::Html,
    Form,
};

use crate::error::Error;
use crate::server::render::{render_page, Notice};
use crate::server::state::AppState;
use crate::session::Session;
use crate::types::{CredentialRequest, QueryRequest, Settings};

use super::documents::read_uploads;

fn page(session: &Session, notices: &[Notice]) -> Html<String> {
    Html(render_page(session, notices))
}

/// GET /
pub async fn index(State(state): State<AppState>) -> Html<String> {
    let session = state.session().lock().await;
    page(&session, &[])
}

/// POST /credential
pub async fn set_credential(
    State(state): State<AppState>,
    Form(form): Form<CredentialRequest>,
) -> Html<String> {
    let mut session = state.session().lock().await;
    session.set_credential(form.api_key);

    let notice = if session.has_credential() {
        Notice::success("API key saved")
    } else {
        Notice::warning("API key cleared")
    };
    page(&session, &[notice])
}

/// POST /settings
pub async fn update_settings(
    State(state): State<AppState>,
    Form(settings): Form<Settings>,
) -> Html<String> {
    let mut session = state.session().lock().await;
    let notices = match session.update_settings(settings) {
        Ok(()) => Vec::new(),
        Err(e) => vec![Notice::error(e.to_string())],
    };
    page(&session, &notices)
}

/// POST /process
pub async fn process(State(state): State<AppState>, multipart: Multipart) -> Html<String> {
    let uploads = read_uploads(multipart).await;

    let mut session = state.session().lock().await;
    let result = match uploads {
        Ok(files) => state.process_uploads(&mut session, files).await,
        Err(e) => Err(e),
    };

    let mut notices = Vec::new();
    match result {
        Ok(response) => {
            notices.push(Notice::success(format!(
                "Successfully processed {} file(s) with {} chunks!",
                response.processed_files.len(),
                response.fragment_count
            )));
            notices.extend(
                response
                    .errors
                    .iter()
                    .map(|e| Notice::error(format!("{}: {}", e.filename, e.error))),
            );
        }
        Err(e) => {
            tracing::warn!("Processing failed: {}", e);
            notices.push(Notice::error(e.to_string()));
        }
    }
    page(&session, &notices)
}

/// POST /ask
pub async fn ask(State(state): State<AppState>, Form(form): Form<QueryRequest>) -> Html<String> {
    let mut session = state.session().lock().await;

    let notices = match state.answer(&mut session, &form.question).await {
        Ok(_) => Vec::new(),
        Err(e @ Error::Validation(_)) => vec![Notice::error(e.to_string())],
        Err(e) => {
            tracing::warn!("Answer generation failed: {}", e);
            vec![Notice::error(format!("Error generating response: {}", e))]
        }
    };
    page(&session, &notices)
}

/// POST /reset
pub async fn reset(State(state): State<AppState>) -> Html<String> {
    let mut session = state.session().lock().await;
    session.reset();
    page(&session, &[])
}
