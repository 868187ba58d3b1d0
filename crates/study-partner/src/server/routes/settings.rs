//! Credential and settings endpoints

use axum::{extract::State, Json};
use serde::Serialize;

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::settings::{Bounds, CHUNK_SIZE_BOUNDS, TEMPERATURE_BOUNDS, TOP_K_BOUNDS};
use crate::types::{CredentialRequest, Settings};

/// Credential status. The key itself is never echoed.
#[derive(Debug, Serialize)]
pub struct CredentialStatus {
    pub has_credential: bool,
}

/// Current settings with their allowed ranges
#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub settings: Settings,
    pub bounds: SettingsBounds,
}

#[derive(Debug, Serialize)]
pub struct SettingsBounds {
    pub temperature: Bounds<f32>,
    pub chunk_size: Bounds<usize>,
    pub top_k: Bounds<usize>,
}

impl SettingsResponse {
    fn new(settings: Settings) -> Self {
        Self {
            settings,
            bounds: SettingsBounds {
                temperature: TEMPERATURE_BOUNDS,
                chunk_size: CHUNK_SIZE_BOUNDS,
                top_k: TOP_K_BOUNDS,
            },
        }
    }
}

/// PUT /api/credential - Set or clear the API key
pub async fn put_credential(
    State(state): State<AppState>,
    Json(request): Json<CredentialRequest>,
) -> Json<CredentialStatus> {
    let mut session = state.session().lock().await;
    session.set_credential(request.api_key);

    tracing::info!("API key {}", if session.has_credential() { "set" } else { "cleared" });

    Json(CredentialStatus {
        has_credential: session.has_credential(),
    })
}

/// DELETE /api/credential - Forget the API key
pub async fn delete_credential(State(state): State<AppState>) -> Json<CredentialStatus> {
    let mut session = state.session().lock().await;
    session.clear_credential();

    tracing::info!("API key cleared");

    Json(CredentialStatus {
        has_credential: session.has_credential(),
    })
}

/// GET /api/settings
pub async fn get_settings(State(state): State<AppState>) -> Json<SettingsResponse> {
    let session = state.session().lock().await;
    Json(SettingsResponse::new(session.settings()))
}

/// PUT /api/settings - Replace settings; rejected as a whole if any value is out of range
pub async fn put_settings(
    State(state): State<AppState>,
    Json(settings): Json<Settings>,
) -> Result<Json<SettingsResponse>> {
    let mut session = state.session().lock().await;
    session.update_settings(settings)?;

    tracing::info!(
        "Settings updated: temperature={:.1}, chunk_size={}, top_k={}",
        settings.temperature,
        settings.chunk_size,
        settings.top_k
    );

    Ok(Json(SettingsResponse::new(session.settings())))
}
