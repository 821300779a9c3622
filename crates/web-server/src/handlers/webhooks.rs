use crate::{AppState, error::AppError};
use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::HeaderMap,
};
use core_types::FundEventType;
use database::DbError;
use ledger::error::LedgerError;
use payment_client::{PaymentGateway, TransmissionHeaders, stripe};
use rust_decimal::Decimal;
use serde_json::{Value as JsonValue, json};
use std::sync::Arc;
use uuid::Uuid;

fn require_header(headers: &HeaderMap, name: &str) -> Result<String, AppError> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .ok_or_else(|| AppError::Validation(format!("Missing or invalid header: {}", name)))
}

/// # POST /api/webhooks/paypal
/// Receives PayPal event deliveries. The signature is verified against the
/// processor before the event is trusted. Capture completions are only
/// logged here; the balance credit happens synchronously in the order
/// completion flow.
pub async fn paypal_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<JsonValue>, AppError> {
    let transmission = TransmissionHeaders {
        transmission_id: require_header(&headers, "paypal-transmission-id")?,
        transmission_time: require_header(&headers, "paypal-transmission-time")?,
        transmission_sig: require_header(&headers, "paypal-transmission-sig")?,
        cert_url: require_header(&headers, "paypal-cert-url")?,
        auth_algo: require_header(&headers, "paypal-auth-algo")?,
    };

    let event: JsonValue = serde_json::from_slice(&body)
        .map_err(|e| AppError::Validation(format!("Invalid webhook body: {}", e)))?;

    let verified = state.gateway.verify_webhook(&transmission, &event).await?;
    if !verified {
        return Err(AppError::Validation("Invalid webhook signature".to_string()));
    }

    if event["event_type"] == "PAYMENT.CAPTURE.COMPLETED" {
        let capture_id = event["resource"]["id"].as_str().unwrap_or_default();
        tracing::info!(capture_id, "Payment capture completed (webhook).");
    }

    Ok(Json(json!({ "status": "ok" })))
}

/// # POST /api/webhooks/stripe
/// Receives Stripe event deliveries. A completed checkout session credits
/// the pitcher named in the session metadata; replayed deliveries are
/// recognized by the session id and acknowledged without a second credit.
pub async fn stripe_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<JsonValue>, AppError> {
    let signature = require_header(&headers, "stripe-signature")?;
    stripe::verify_signature(
        &state.config.stripe.webhook_secret,
        &signature,
        &body,
        stripe::DEFAULT_TOLERANCE_SECS,
    )?;

    let event: stripe::StripeEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::Validation(format!("Invalid webhook body: {}", e)))?;

    if event.event_type != "checkout.session.completed" {
        return Ok(Json(json!({ "received": true })));
    }

    let session = event.data.object;
    let Some(pitcher_id) = session.metadata.get("pitcher_id") else {
        tracing::warn!(session_id = %session.id, "Checkout session has no pitcher_id metadata.");
        return Ok(Json(json!({ "received": true })));
    };
    let pitcher_id = Uuid::parse_str(pitcher_id)
        .map_err(|_| AppError::Validation("Invalid pitcher_id in session metadata".to_string()))?;
    let Some(amount_total) = session.amount_total else {
        tracing::warn!(session_id = %session.id, "Checkout session has no amount_total.");
        return Ok(Json(json!({ "received": true })));
    };

    // amount_total is in cents.
    let amount = Decimal::new(amount_total, 2);

    match state
        .ledger
        .record_funds(pitcher_id, amount, FundEventType::AddFund, &session.id)
        .await
    {
        Ok(credit) => {
            tracing::info!(
                session_id = %session.id,
                %pitcher_id,
                new_balance = %credit.new_balance,
                "Stripe checkout credited."
            );
        }
        // A redelivered event has already been recorded; acknowledge it so
        // the processor stops retrying.
        Err(LedgerError::Db(DbError::DuplicatePaymentRef(_))) => {
            tracing::info!(session_id = %session.id, "Replayed checkout session ignored.");
        }
        Err(e) => return Err(e.into()),
    }

    Ok(Json(json!({ "received": true })))
}
