use crate::{AppState, error::AppError};
use axum::{
    Json,
    extract::{Path, State},
};
use core_types::{Meeting, NewMeeting};
use std::sync::Arc;
use uuid::Uuid;

/// # POST /api/meetings
/// Stores a meeting request in the `pending` state. The requester's listener
/// must exist; the pitcher side may be an unregistered contact.
pub async fn create_meeting(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewMeeting>,
) -> Result<Json<Meeting>, AppError> {
    new.validate()?;
    // Fail with 404 before inserting, rather than bubbling a foreign-key error.
    state.repo.get_listener(new.listener_id).await?;
    let meeting = state.repo.create_meeting(&new).await?;
    Ok(Json(meeting))
}

/// # GET /api/meetings/:meeting_id
pub async fn get_meeting(
    Path(meeting_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Meeting>, AppError> {
    let meeting = state.repo.get_meeting(meeting_id).await?;
    Ok(Json(meeting))
}

#[cfg(test)]
mod tests {
    use core_types::NewMeeting;
    use serde_json::json;

    #[test]
    fn meeting_payload_requires_listener_id() {
        let result = serde_json::from_value::<NewMeeting>(json!({
            "source": "listener_page",
            "pitcher_name": "Jane Doe",
            "pitcher_email": "jane@example.com",
            "message": "Weekdays after 5pm"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn meeting_payload_parses_without_pitcher_id() {
        let new: NewMeeting = serde_json::from_value(json!({
            "source": "listener_page",
            "listener_id": "7f8a1f8c-1b2d-4c3e-9f10-000000000000",
            "pitcher_name": "Jane Doe",
            "pitcher_email": "jane@example.com",
            "message": "Weekdays after 5pm"
        }))
        .unwrap();
        assert!(new.pitcher_id.is_none());
        assert!(new.validate().is_ok());
    }
}
