use crate::{AppState, error::AppError};
use axum::{
    Json,
    extract::{Path, State},
};
use core_types::{FundEventType, FundHistoryRecord};
use database::FundCredit;
use ledger::CompletedOrder;
use payment_client::{OrderIntent, PaymentGateway, responses::OrderResponse};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub intent: OrderIntent,
    pub amount: Decimal,
}

/// # POST /api/orders
/// Creates a processor order for the given amount. The frontend follows the
/// returned `approve` link to collect payer approval.
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = state.gateway.create_order(request.intent, request.amount).await?;
    Ok(Json(order))
}

#[derive(Debug, Serialize)]
pub struct CaptureSummary {
    pub status: String,
    pub capture_id: Option<String>,
}

/// # POST /api/orders/:order_id/capture
/// Captures an approved order without touching any balance. Used by flows
/// that record the money elsewhere (e.g. escrow toward a meeting).
pub async fn capture_order(
    Path(order_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<CaptureSummary>, AppError> {
    let capture = state.gateway.capture_order(&order_id).await?;

    let capture_id = capture
        .purchase_units
        .first()
        .and_then(|unit| unit.payments.as_ref())
        .and_then(|payments| payments.captures.first())
        .map(|c| c.id.clone());

    Ok(Json(CaptureSummary {
        status: capture.status,
        capture_id,
    }))
}

#[derive(Debug, Deserialize)]
pub struct CompleteOrderRequest {
    pub pitcher_id: Uuid,
}

/// # POST /api/orders/:order_id/complete
/// The full sequence: capture the order, credit the pitcher's balance,
/// append the ledger row, and send the confirmation email.
pub async fn complete_order(
    Path(order_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<CompleteOrderRequest>,
) -> Result<Json<CompletedOrder>, AppError> {
    let completed = state
        .ledger
        .complete_order(&order_id, request.pitcher_id)
        .await?;
    Ok(Json(completed))
}

#[derive(Debug, Deserialize)]
pub struct FundUpdateRequest {
    pub pitcher_id: Uuid,
    pub payment_ref_id: String,
    pub amount: Decimal,
    pub event_type: FundEventType,
}

/// # POST /api/funds
/// Records an already-settled payment directly against a pitcher's balance.
pub async fn update_funds(
    State(state): State<Arc<AppState>>,
    Json(request): Json<FundUpdateRequest>,
) -> Result<Json<FundCredit>, AppError> {
    if request.payment_ref_id.trim().is_empty() {
        return Err(AppError::Validation(
            "payment_ref_id must not be empty".to_string(),
        ));
    }

    let credit = state
        .ledger
        .record_funds(
            request.pitcher_id,
            request.amount,
            request.event_type,
            &request.payment_ref_id,
        )
        .await?;

    Ok(Json(credit))
}

/// # GET /api/pitchers/:pitcher_id/funds
/// Fetches a pitcher's fund history, newest first.
pub async fn get_fund_history(
    Path(pitcher_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<FundHistoryRecord>>, AppError> {
    // Distinguish an unknown pitcher (404) from one with no history yet.
    state.repo.get_pitcher(pitcher_id).await?;
    let records = state.repo.get_fund_history(pitcher_id).await?;
    Ok(Json(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_order_request_parses() {
        let request: CreateOrderRequest =
            serde_json::from_value(json!({ "intent": "capture", "amount": "25.00" })).unwrap();
        assert_eq!(request.intent, OrderIntent::Capture);
        assert_eq!(request.amount.to_string(), "25.00");
    }

    #[test]
    fn create_order_request_rejects_missing_amount() {
        let result =
            serde_json::from_value::<CreateOrderRequest>(json!({ "intent": "capture" }));
        assert!(result.is_err());
    }

    #[test]
    fn fund_update_request_requires_every_field() {
        let result = serde_json::from_value::<FundUpdateRequest>(json!({
            "pitcher_id": "7f8a1f8c-1b2d-4c3e-9f10-000000000000",
            "amount": "25.00"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn fund_update_request_parses_event_type() {
        let request: FundUpdateRequest = serde_json::from_value(json!({
            "pitcher_id": "7f8a1f8c-1b2d-4c3e-9f10-000000000000",
            "payment_ref_id": "5O190127TN364715T",
            "amount": 25,
            "event_type": "add_fund"
        }))
        .unwrap();
        assert_eq!(request.event_type, FundEventType::AddFund);
    }
}
