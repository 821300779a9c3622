use crate::error::PaymentError;
use crate::responses::{
    ApiErrorResponse, CaptureOrderResponse, OrderResponse, VerifyWebhookResponse,
};
use async_trait::async_trait;
use configuration::PayPalConfig;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value as JsonValue;

pub mod error;
pub mod responses;
pub mod stripe;

// --- Public API ---
pub use responses::{Capture, LinkDescription, Money, Payments, PurchaseUnit};

/// The checkout intent requested by the client. Serialized lowercase on the
/// wire ("capture" / "authorize"); the processor wants it uppercased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderIntent {
    Capture,
    Authorize,
}

impl OrderIntent {
    pub fn as_processor_str(&self) -> &'static str {
        match self {
            OrderIntent::Capture => "CAPTURE",
            OrderIntent::Authorize => "AUTHORIZE",
        }
    }
}

/// The transmission headers PayPal attaches to every webhook delivery,
/// required verbatim by the verification endpoint.
#[derive(Debug, Clone)]
pub struct TransmissionHeaders {
    pub transmission_id: String,
    pub transmission_time: String,
    pub transmission_sig: String,
    pub cert_url: String,
    pub auth_algo: String,
}

/// The generic, abstract interface for a payment processor.
/// This trait is the contract the payment routes and the ledger use, allowing
/// the underlying implementation (live or mock) to be swapped out.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates an order for the given amount in USD.
    async fn create_order(
        &self,
        intent: OrderIntent,
        amount: Decimal,
    ) -> Result<OrderResponse, PaymentError>;

    /// Finalizes an approved order and returns the raw capture result.
    /// Callers must check `status == "COMPLETED"` before trusting any amount.
    async fn capture_order(&self, order_id: &str) -> Result<CaptureOrderResponse, PaymentError>;

    /// Asks the processor whether a webhook delivery is authentic.
    async fn verify_webhook(
        &self,
        headers: &TransmissionHeaders,
        event: &JsonValue,
    ) -> Result<bool, PaymentError>;
}

/// A concrete implementation of the `PaymentGateway` for the PayPal REST API.
#[derive(Clone)]
pub struct PayPalClient {
    client: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: String,
    webhook_id: String,
}

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access_token: String,
}

#[derive(Debug, Serialize)]
struct CreateOrderPayload<'a> {
    intent: &'a str,
    purchase_units: Vec<PurchaseUnitPayload>,
}

#[derive(Debug, Serialize)]
struct PurchaseUnitPayload {
    amount: AmountPayload,
}

#[derive(Debug, Serialize)]
struct AmountPayload {
    currency_code: &'static str,
    value: String,
}

#[derive(Debug, Serialize)]
struct VerifyWebhookPayload<'a> {
    auth_algo: &'a str,
    cert_url: &'a str,
    transmission_id: &'a str,
    transmission_sig: &'a str,
    transmission_time: &'a str,
    webhook_id: &'a str,
    webhook_event: &'a JsonValue,
}

impl PayPalClient {
    pub fn new(config: &PayPalConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.api_base_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            webhook_id: config.webhook_id.clone(),
        }
    }

    /// Exchanges the client credentials for a short-lived OAuth2 access token.
    /// PayPal tokens last hours; requesting one per call keeps the client
    /// stateless at the cost of an extra round trip.
    async fn access_token(&self) -> Result<String, PaymentError> {
        let url = format!("{}/v1/oauth2/token", self.base_url);

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let token: AccessTokenResponse = read_response(response).await?;
        Ok(token.access_token)
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, PaymentError> {
        let access_token = self.access_token().await?;
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .bearer_auth(access_token)
            .json(body)
            .send()
            .await?;

        read_response(response).await
    }
}

/// Reads a processor response, mapping non-2xx statuses to `PaymentError::Api`
/// with the processor's own error name and message when they can be decoded.
async fn read_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, PaymentError> {
    let status = response.status();
    let text = response.text().await?;

    if status.is_success() {
        serde_json::from_str::<T>(&text).map_err(|e| PaymentError::Deserialization(e.to_string()))
    } else {
        let detail = match serde_json::from_str::<ApiErrorResponse>(&text) {
            Ok(body) => format!("{} ({}): {}", status, body.name, body.message),
            Err(_) => format!("{}: {}", status, text),
        };
        Err(PaymentError::Api(detail))
    }
}

#[async_trait]
impl PaymentGateway for PayPalClient {
    async fn create_order(
        &self,
        intent: OrderIntent,
        amount: Decimal,
    ) -> Result<OrderResponse, PaymentError> {
        if amount <= Decimal::ZERO {
            return Err(PaymentError::InvalidAmount(amount));
        }

        // The processor expects a string with exactly two decimal places.
        let mut value = amount;
        value.rescale(2);

        let payload = CreateOrderPayload {
            intent: intent.as_processor_str(),
            purchase_units: vec![PurchaseUnitPayload {
                amount: AmountPayload {
                    currency_code: "USD",
                    value: value.to_string(),
                },
            }],
        };

        self.post_json("/v2/checkout/orders", &payload).await
    }

    async fn capture_order(&self, order_id: &str) -> Result<CaptureOrderResponse, PaymentError> {
        let path = format!("/v2/checkout/orders/{}/capture", order_id);
        // The capture endpoint requires an empty JSON body.
        self.post_json(&path, &serde_json::json!({})).await
    }

    async fn verify_webhook(
        &self,
        headers: &TransmissionHeaders,
        event: &JsonValue,
    ) -> Result<bool, PaymentError> {
        let payload = VerifyWebhookPayload {
            auth_algo: &headers.auth_algo,
            cert_url: &headers.cert_url,
            transmission_id: &headers.transmission_id,
            transmission_sig: &headers.transmission_sig,
            transmission_time: &headers.transmission_time,
            webhook_id: &self.webhook_id,
            webhook_event: event,
        };

        let verification: VerifyWebhookResponse = self
            .post_json("/v1/notifications/verify-webhook-signature", &payload)
            .await?;

        Ok(verification.verification_status == "SUCCESS")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn order_intent_parses_lowercase() {
        let intent: OrderIntent = serde_json::from_str("\"capture\"").unwrap();
        assert_eq!(intent, OrderIntent::Capture);
        assert_eq!(intent.as_processor_str(), "CAPTURE");
    }

    #[test]
    fn create_order_payload_formats_amount_with_two_decimals() {
        let mut value = dec!(25);
        value.rescale(2);
        assert_eq!(value.to_string(), "25.00");

        let mut value = dec!(9.5);
        value.rescale(2);
        assert_eq!(value.to_string(), "9.50");
    }

    #[test]
    fn order_payload_serializes_to_processor_shape() {
        let payload = CreateOrderPayload {
            intent: "CAPTURE",
            purchase_units: vec![PurchaseUnitPayload {
                amount: AmountPayload {
                    currency_code: "USD",
                    value: "25.00".to_string(),
                },
            }],
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["intent"], "CAPTURE");
        assert_eq!(json["purchase_units"][0]["amount"]["value"], "25.00");
    }
}
