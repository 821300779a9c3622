use crate::{AppState, error::AppError};
use axum::{Json, extract::State};
use core_types::{MeetingSource, UserRole};
use mailer::MeetingNotification;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value as JsonValue, json};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct MeetingNotifyRequest {
    pub source: MeetingSource,
    pub pitcher_name: String,
    pub pitcher_email: String,
    pub listener_name: String,
    pub listener_email: String,
    pub message: String,
    pub donation: Decimal,
}

/// # POST /api/notifications/meeting
/// Sends the meeting-arrangement email to both parties.
pub async fn send_meeting_notification(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MeetingNotifyRequest>,
) -> Result<Json<JsonValue>, AppError> {
    if request.message.trim().is_empty() {
        return Err(AppError::Validation("message must not be empty".to_string()));
    }

    let notification = MeetingNotification {
        source: request.source,
        pitcher_name: request.pitcher_name,
        pitcher_email: request.pitcher_email,
        listener_name: request.listener_name,
        listener_email: request.listener_email,
        message: request.message,
        donation: request.donation,
    };

    state
        .mailer()?
        .send_meeting_notification(&notification)
        .await?;

    Ok(Json(json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
pub struct SignupEmailRequest {
    pub full_name: String,
    pub email: String,
    pub role: UserRole,
}

/// # POST /api/notifications/signup
/// Re-sends the role-specific welcome email.
pub async fn send_signup_email(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SignupEmailRequest>,
) -> Result<Json<JsonValue>, AppError> {
    state
        .mailer()?
        .send_signup_welcome(request.role, &request.full_name, &request.email)
        .await?;

    Ok(Json(json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
pub struct PaymentConfirmEmailRequest {
    pub pitcher_name: String,
    pub pitcher_email: String,
    pub amount_paid: Decimal,
}

/// # POST /api/notifications/payment-confirmation
/// Sends a standalone payment confirmation. The ledger sends this
/// automatically after a credit; this route exists for manual re-sends.
pub async fn send_payment_confirmation(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PaymentConfirmEmailRequest>,
) -> Result<Json<JsonValue>, AppError> {
    state
        .mailer()?
        .send_payment_confirmation(
            &request.pitcher_name,
            &request.pitcher_email,
            request.amount_paid,
        )
        .await?;

    Ok(Json(json!({ "success": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meeting_notify_request_requires_all_fields() {
        let result = serde_json::from_value::<MeetingNotifyRequest>(json!({
            "source": "pitcher_page",
            "pitcher_name": "Jane Doe",
            "pitcher_email": "jane@example.com",
            "listener_name": "John Smith"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn signup_email_request_parses_role() {
        let request: SignupEmailRequest = serde_json::from_value(json!({
            "full_name": "Jane Doe",
            "email": "jane@example.com",
            "role": "pitcher"
        }))
        .unwrap();
        assert_eq!(request.role, UserRole::Pitcher);
    }
}
