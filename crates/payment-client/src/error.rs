use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Failed to build the HTTP request: {0}")]
    Request(#[from] reqwest::Error),

    #[error("The payment processor returned an error: {0}")]
    Api(String),

    #[error("Failed to deserialize the processor response: {0}")]
    Deserialization(String),

    #[error("Order amount must be positive, got {0}")]
    InvalidAmount(Decimal),

    #[error("Malformed webhook signature header: {0}")]
    SignatureHeader(String),

    #[error("Webhook signature did not match any known signing secret")]
    SignatureMismatch,

    #[error("Webhook timestamp {0} is outside the accepted tolerance")]
    StaleWebhook(i64),
}
