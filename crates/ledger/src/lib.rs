//! The balance ledger updater: the one place where a captured payment turns
//! into a balance credit.
//!
//! Every path that adds funds to a pitcher (order completion, direct fund
//! update, Stripe webhook) goes through [`FundsLedger`], which enforces the
//! capture-status gate, performs the atomic credit + audit-row append, and
//! then fires the confirmation email. Email failure never rolls back a
//! credit; the money has already moved at the processor.

use crate::error::LedgerError;
use core_types::FundEventType;
use database::{DbRepository, FundCredit};
use mailer::Mailer;
use payment_client::PaymentGateway;
use payment_client::responses::CaptureOrderResponse;
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

pub mod error;

/// The result of a full capture-and-credit sequence.
#[derive(Debug, Clone, Serialize)]
pub struct CompletedOrder {
    /// The processor's order reference, recorded as the ledger's payment ref.
    pub order_id: String,
    /// The processor's final order status (always "COMPLETED" on success).
    pub status: String,
    pub credit: FundCredit,
}

pub struct FundsLedger {
    gateway: Arc<dyn PaymentGateway>,
    repo: DbRepository,
    mailer: Option<Arc<Mailer>>,
}

impl FundsLedger {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        repo: DbRepository,
        mailer: Option<Arc<Mailer>>,
    ) -> Self {
        Self {
            gateway,
            repo,
            mailer,
        }
    }

    /// Captures an approved order with the processor, then credits the
    /// pitcher. The credit only happens after the status gate confirms the
    /// capture completed; a declined or pending capture mutates nothing.
    pub async fn complete_order(
        &self,
        order_id: &str,
        pitcher_id: Uuid,
    ) -> Result<CompletedOrder, LedgerError> {
        let capture = self.gateway.capture_order(order_id).await?;
        let amount = completed_capture_amount(&capture)?;

        tracing::info!(
            order_id = %capture.id,
            %pitcher_id,
            %amount,
            "Payment captured, crediting pitcher balance."
        );

        let credit = self
            .record_funds(pitcher_id, amount, FundEventType::AddFund, &capture.id)
            .await?;

        Ok(CompletedOrder {
            order_id: capture.id,
            status: capture.status,
            credit,
        })
    }

    /// Credits a pitcher balance directly from an already-settled payment
    /// reference (the direct fund-update route and processor webhooks).
    ///
    /// Rejects non-positive amounts before touching the database; relies on
    /// the repository for the unknown-pitcher and duplicate-reference checks.
    pub async fn record_funds(
        &self,
        pitcher_id: Uuid,
        amount: Decimal,
        event_type: FundEventType,
        payment_ref_id: &str,
    ) -> Result<FundCredit, LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(amount));
        }

        let credit = self
            .repo
            .credit_pitcher(pitcher_id, amount, event_type, payment_ref_id)
            .await?;

        tracing::info!(
            %pitcher_id,
            %amount,
            new_balance = %credit.new_balance,
            event_type = %event_type,
            "Ledger updated."
        );

        self.notify_credit(pitcher_id, amount).await;

        Ok(credit)
    }

    /// Best-effort payment confirmation email. Failures are logged and
    /// swallowed: the credit has already been committed.
    async fn notify_credit(&self, pitcher_id: Uuid, amount: Decimal) {
        let Some(mailer) = &self.mailer else {
            return;
        };

        let pitcher = match self.repo.get_pitcher(pitcher_id).await {
            Ok(pitcher) => pitcher,
            Err(e) => {
                tracing::error!(error = ?e, %pitcher_id, "Could not load pitcher for confirmation email.");
                return;
            }
        };

        if let Err(e) = mailer
            .send_payment_confirmation(&pitcher.full_name, &pitcher.email, amount)
            .await
        {
            tracing::error!(error = ?e, %pitcher_id, "Failed to send payment confirmation email.");
        }
    }
}

/// The capture-status gate: extracts the captured amount from a capture
/// result, refusing anything that is not a completed capture.
///
/// This is the only place the processor's amount is trusted, so every caller
/// inherits the same guarantee: a capture with `status != COMPLETED` never
/// reaches the ledger.
pub fn completed_capture_amount(capture: &CaptureOrderResponse) -> Result<Decimal, LedgerError> {
    if capture.status != "COMPLETED" {
        return Err(LedgerError::CaptureIncomplete(capture.status.clone()));
    }

    let first_capture = capture
        .purchase_units
        .first()
        .and_then(|unit| unit.payments.as_ref())
        .and_then(|payments| payments.captures.first())
        .ok_or(LedgerError::MissingCapture)?;

    Decimal::from_str(&first_capture.amount.value)
        .map_err(|_| LedgerError::UnparseableAmount(first_capture.amount.value.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn capture_json(status: &str, capture_status: &str, value: &str) -> CaptureOrderResponse {
        serde_json::from_str(&format!(
            r#"{{
                "id": "5O190127TN364715T",
                "status": "{status}",
                "purchase_units": [{{
                    "payments": {{
                        "captures": [{{
                            "id": "3C679366HH908993F",
                            "status": "{capture_status}",
                            "amount": {{ "currency_code": "USD", "value": "{value}" }}
                        }}]
                    }}
                }}]
            }}"#
        ))
        .unwrap()
    }

    #[test]
    fn completed_capture_yields_its_amount() {
        let capture = capture_json("COMPLETED", "COMPLETED", "25.00");
        assert_eq!(completed_capture_amount(&capture).unwrap(), dec!(25.00));
    }

    #[test]
    fn declined_capture_never_yields_an_amount() {
        let capture = capture_json("DECLINED", "DECLINED", "25.00");
        let result = completed_capture_amount(&capture);
        assert!(matches!(result, Err(LedgerError::CaptureIncomplete(s)) if s == "DECLINED"));
    }

    #[test]
    fn pending_capture_is_rejected() {
        let capture = capture_json("PENDING", "PENDING", "25.00");
        assert!(matches!(
            completed_capture_amount(&capture),
            Err(LedgerError::CaptureIncomplete(_))
        ));
    }

    #[test]
    fn capture_without_purchase_units_is_rejected() {
        let capture: CaptureOrderResponse = serde_json::from_str(
            r#"{ "id": "5O1", "status": "COMPLETED", "purchase_units": [] }"#,
        )
        .unwrap();
        assert!(matches!(
            completed_capture_amount(&capture),
            Err(LedgerError::MissingCapture)
        ));
    }

    #[test]
    fn garbage_amount_is_rejected() {
        let capture = capture_json("COMPLETED", "COMPLETED", "twenty-five");
        assert!(matches!(
            completed_capture_amount(&capture),
            Err(LedgerError::UnparseableAmount(_))
        ));
    }
}
