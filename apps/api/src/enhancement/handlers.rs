//! Axum route handlers for the Enhancement API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::enhancement::band::{Band, SUPPORTED_BANDS};
use crate::enhancement::enhancer::{enhance_sentence, EnhancementResult};
use crate::enhancement::session::{EnhancementSession, UserProfile};
use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhanceRequest {
    pub text: String,
    pub target_band: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub photo: Option<String>,
    pub target_band: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub profile: UserProfile,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDetailResponse {
    pub session_id: Uuid,
    pub profile: UserProfile,
    pub busy: bool,
    pub latest: Option<EnhancementResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBandRequest {
    pub target_band: f64,
}

#[derive(Debug, Deserialize)]
pub struct SessionEnhanceRequest {
    pub text: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/bands
///
/// The supported band scale, for target pickers.
pub async fn handle_list_bands() -> Json<Value> {
    Json(json!({ "bands": SUPPORTED_BANDS }))
}

/// POST /api/v1/enhance
///
/// One-shot enhancement without session state. Input validation happens
/// inside the core operation, before any model call.
pub async fn handle_enhance(
    State(state): State<AppState>,
    Json(request): Json<EnhanceRequest>,
) -> Result<Json<EnhancementResult>, AppError> {
    let result =
        enhance_sentence(state.model.as_ref(), &request.text, request.target_band).await?;
    Ok(Json(result))
}

/// POST /api/v1/sessions
///
/// Creates a session from a caller-supplied profile.
pub async fn handle_create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    if request.name.trim().is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }
    if request.email.trim().is_empty() {
        return Err(AppError::Validation("email cannot be empty".to_string()));
    }
    let target_band = parse_band(request.target_band)?;

    let profile = UserProfile {
        name: request.name,
        email: request.email,
        photo: request.photo,
        target_band,
    };
    let session_id = state
        .sessions
        .insert(EnhancementSession::new(state.model.clone(), profile.clone()))
        .await;

    Ok(Json(SessionResponse {
        session_id,
        profile,
    }))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionDetailResponse>, AppError> {
    let session = lookup(&state, session_id).await?;

    Ok(Json(SessionDetailResponse {
        session_id,
        profile: session.profile().await,
        busy: session.is_busy(),
        latest: session.latest().await,
    }))
}

/// PATCH /api/v1/sessions/:id/band
///
/// Changes the target band. Any outstanding enhancement is invalidated and
/// the previous result is cleared.
pub async fn handle_update_band(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<UpdateBandRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let band = parse_band(request.target_band)?;
    let session = lookup(&state, session_id).await?;

    session.set_target_band(band).await;

    Ok(Json(SessionResponse {
        session_id,
        profile: session.profile().await,
    }))
}

/// POST /api/v1/sessions/:id/enhance
///
/// Session-scoped enhancement with single-flight and stale-drop guarantees.
pub async fn handle_session_enhance(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SessionEnhanceRequest>,
) -> Result<Json<EnhancementResult>, AppError> {
    let session = lookup(&state, session_id).await?;
    let result = session.enhance(&request.text).await?;
    Ok(Json(result))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.remove(session_id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("session {session_id}")))
    }
}

async fn lookup(state: &AppState, session_id: Uuid) -> Result<std::sync::Arc<EnhancementSession>, AppError> {
    state
        .sessions
        .get(session_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("session {session_id}")))
}

fn parse_band(value: f64) -> Result<Band, AppError> {
    Band::new(value).map_err(|e| AppError::Validation(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enhance_request_uses_camel_case_wire_names() {
        let json = serde_json::json!({
            "text": "I go to school every day.",
            "targetBand": 7.0
        });
        let request: EnhanceRequest = serde_json::from_value(json).unwrap();
        assert_eq!(request.target_band, 7.0);
        assert!(!request.text.is_empty());
    }

    #[test]
    fn test_create_session_request_photo_is_optional() {
        let json = serde_json::json!({
            "name": "IELTS Student",
            "email": "student@example.com",
            "targetBand": 6.5
        });
        let request: CreateSessionRequest = serde_json::from_value(json).unwrap();
        assert!(request.photo.is_none());
        assert_eq!(request.target_band, 6.5);
    }

    #[test]
    fn test_session_detail_serializes_latest_under_camel_case() {
        let response = SessionDetailResponse {
            session_id: Uuid::new_v4(),
            profile: UserProfile {
                name: "IELTS Student".to_string(),
                email: "student@example.com".to_string(),
                photo: None,
                target_band: Band::new(7.0).unwrap(),
            },
            busy: false,
            latest: None,
        };
        let value = serde_json::to_value(&response).unwrap();
        assert!(value.get("sessionId").is_some());
        assert_eq!(value["profile"]["targetBand"], 7.0);
    }
}
