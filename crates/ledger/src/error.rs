use database::DbError;
use payment_client::error::PaymentError;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Fund amount must be positive, got {0}")]
    InvalidAmount(Decimal),

    #[error("Payment was not completed by the processor (status: {0})")]
    CaptureIncomplete(String),

    #[error("The capture result carried no finalized capture entry")]
    MissingCapture,

    #[error("The processor reported an unparseable capture amount: '{0}'")]
    UnparseableAmount(String),

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error(transparent)]
    Db(#[from] DbError),
}
