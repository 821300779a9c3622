use crate::{AppState, error::AppError};
use axum::{
    Json,
    extract::{Path, State},
};
use core_types::{Listener, NewListener, NewPitcher, Pitcher, ProfileUpdate, UserRole};
use std::sync::Arc;
use uuid::Uuid;

/// # POST /api/pitchers
/// Creates a pitcher profile and sends the welcome email (best effort).
pub async fn create_pitcher(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewPitcher>,
) -> Result<Json<Pitcher>, AppError> {
    new.validate()?;
    let pitcher = state.repo.create_pitcher(&new).await?;
    send_welcome(&state, UserRole::Pitcher, &pitcher.full_name, &pitcher.email).await;
    Ok(Json(pitcher))
}

/// # GET /api/pitchers/:pitcher_id
pub async fn get_pitcher(
    Path(pitcher_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Pitcher>, AppError> {
    let pitcher = state.repo.get_pitcher(pitcher_id).await?;
    Ok(Json(pitcher))
}

/// # GET /api/pitchers/by-slug/:slug
/// Fetches the pitcher behind a public profile page.
pub async fn get_pitcher_by_slug(
    Path(slug): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Pitcher>, AppError> {
    let pitcher = state.repo.get_pitcher_by_slug(&slug).await?;
    Ok(Json(pitcher))
}

/// # PUT /api/pitchers/:pitcher_id
pub async fn update_pitcher(
    Path(pitcher_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<Pitcher>, AppError> {
    update.validate()?;
    let pitcher = state.repo.update_pitcher(pitcher_id, &update).await?;
    Ok(Json(pitcher))
}

/// # POST /api/listeners
/// Creates a listener profile and sends the welcome email (best effort).
pub async fn create_listener(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewListener>,
) -> Result<Json<Listener>, AppError> {
    new.validate()?;
    let listener = state.repo.create_listener(&new).await?;
    send_welcome(&state, UserRole::Listener, &listener.full_name, &listener.email).await;
    Ok(Json(listener))
}

/// # GET /api/listeners/:listener_id
pub async fn get_listener(
    Path(listener_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Listener>, AppError> {
    let listener = state.repo.get_listener(listener_id).await?;
    Ok(Json(listener))
}

/// # GET /api/listeners/by-slug/:slug
pub async fn get_listener_by_slug(
    Path(slug): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Listener>, AppError> {
    let listener = state.repo.get_listener_by_slug(&slug).await?;
    Ok(Json(listener))
}

/// # PUT /api/listeners/:listener_id
pub async fn update_listener(
    Path(listener_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<Listener>, AppError> {
    update.validate()?;
    let listener = state.repo.update_listener(listener_id, &update).await?;
    Ok(Json(listener))
}

/// Signup must not fail because the mail provider is down; the welcome email
/// is logged and dropped on error.
async fn send_welcome(state: &AppState, role: UserRole, full_name: &str, email: &str) {
    let Some(mailer) = &state.mailer else {
        return;
    };
    if let Err(e) = mailer.send_signup_welcome(role, full_name, email).await {
        tracing::error!(error = ?e, %role, "Failed to send signup welcome email.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_pitcher_payload_parses() {
        let new: NewPitcher = serde_json::from_value(json!({
            "full_name": "Jane Doe",
            "email": "jane@example.com",
            "pitch": "Clean water for rural schools.",
            "donation": "25.00"
        }))
        .unwrap();
        assert!(new.validate().is_ok());
    }

    #[test]
    fn new_listener_payload_defaults_missing_intro() {
        let new: NewListener = serde_json::from_value(json!({
            "full_name": "John Smith",
            "email": "john@example.com",
            "donation": 10
        }))
        .unwrap();
        assert_eq!(new.intro, "");
    }

    #[test]
    fn profile_update_accepts_partial_payloads() {
        let update: ProfileUpdate =
            serde_json::from_value(json!({ "about": "New pitch text." })).unwrap();
        assert!(update.full_name.is_none());
        assert!(update.validate().is_ok());
    }
}
