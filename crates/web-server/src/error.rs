use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use database::DbError;
use ledger::error::LedgerError;
use mailer::error::MailerError;
use payment_client::error::PaymentError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid profile data: {0}")]
    Core(#[from] core_types::CoreError),
    #[error("Database error: {0}")]
    Db(#[from] DbError),
    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),
    #[error("Ledger error: {0}")]
    Ledger(LedgerError),
    #[error("Mailer error: {0}")]
    Mailer(#[from] MailerError),
}

/// Flattens the ledger's wrapped payment and database errors so that each
/// failure maps to one status code, no matter which layer surfaced it.
impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Payment(e) => AppError::Payment(e),
            LedgerError::Db(e) => AppError::Db(e),
            other => AppError::Ledger(other),
        }
    }
}

/// Converts our custom `AppError` into an HTTP response.
///
/// Client mistakes map to 400/404/409, processor refusals to 502, and
/// everything else to 500 with the detail kept in the logs.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Validation(message) => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            AppError::Core(core_err) => (StatusCode::BAD_REQUEST, core_err.to_string()),
            AppError::Db(DbError::NotFound) => {
                (StatusCode::NOT_FOUND, DbError::NotFound.to_string())
            }
            AppError::Db(db_err @ (DbError::DuplicatePaymentRef(_) | DbError::DuplicateProfile)) => {
                (StatusCode::CONFLICT, db_err.to_string())
            }
            AppError::Db(db_err) => {
                tracing::error!(error = ?db_err, "Database error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal database error occurred".to_string(),
                )
            }
            AppError::Payment(
                payment_err @ (PaymentError::InvalidAmount(_)
                | PaymentError::SignatureHeader(_)
                | PaymentError::SignatureMismatch
                | PaymentError::StaleWebhook(_)),
            ) => (StatusCode::BAD_REQUEST, payment_err.to_string()),
            AppError::Payment(payment_err) => {
                tracing::error!(error = ?payment_err, "Payment processor error.");
                (
                    StatusCode::BAD_GATEWAY,
                    "The payment processor rejected the request".to_string(),
                )
            }
            AppError::Ledger(ledger_err @ LedgerError::InvalidAmount(_)) => {
                (StatusCode::BAD_REQUEST, ledger_err.to_string())
            }
            AppError::Ledger(ledger_err @ LedgerError::CaptureIncomplete(_)) => {
                (StatusCode::CONFLICT, ledger_err.to_string())
            }
            AppError::Ledger(ledger_err) => {
                tracing::error!(error = ?ledger_err, "Ledger error.");
                (
                    StatusCode::BAD_GATEWAY,
                    "The capture result could not be processed".to_string(),
                )
            }
            AppError::Mailer(MailerError::NotConfigured) => (
                StatusCode::SERVICE_UNAVAILABLE,
                MailerError::NotConfigured.to_string(),
            ),
            AppError::Mailer(mailer_err) => {
                tracing::error!(error = ?mailer_err, "Mailer error.");
                (StatusCode::BAD_GATEWAY, "Email delivery failed".to_string())
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn validation_maps_to_bad_request() {
        let response = AppError::Validation("missing field".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unknown_pitcher_maps_to_not_found() {
        let response = AppError::Db(DbError::NotFound).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn duplicate_payment_ref_maps_to_conflict() {
        let response =
            AppError::Db(DbError::DuplicatePaymentRef("5O1".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn incomplete_capture_maps_to_conflict() {
        let err: AppError = LedgerError::CaptureIncomplete("DECLINED".to_string()).into();
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn ledger_wrapped_db_error_is_flattened() {
        let err: AppError = LedgerError::Db(DbError::NotFound).into();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn invalid_amount_maps_to_bad_request() {
        let err: AppError = LedgerError::InvalidAmount(Decimal::ZERO).into();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn stale_webhook_maps_to_bad_request() {
        let response = AppError::Payment(PaymentError::StaleWebhook(0)).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
