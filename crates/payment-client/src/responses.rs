use serde::{Deserialize, Serialize};

// PayPal's REST responses are snake_case already, so no field renaming is
// needed. Only the fields the application reads are modeled; the processor
// sends many more.

/// The response from `POST /v2/checkout/orders`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResponse {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub links: Vec<LinkDescription>,
}

/// A HATEOAS link entry attached to order responses; the frontend follows
/// the `approve` link to send the payer through the processor's UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkDescription {
    pub href: String,
    pub rel: String,
    #[serde(default)]
    pub method: Option<String>,
}

/// The response from `POST /v2/checkout/orders/{id}/capture`.
///
/// The top-level `status` must be checked before trusting any nested amount;
/// a `DECLINED` or `PENDING` result still carries purchase units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureOrderResponse {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub purchase_units: Vec<PurchaseUnit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseUnit {
    #[serde(default)]
    pub payments: Option<Payments>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payments {
    #[serde(default)]
    pub captures: Vec<Capture>,
}

/// A single finalized capture within an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capture {
    pub id: String,
    pub status: String,
    pub amount: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Money {
    pub currency_code: String,
    /// The processor sends amounts as decimal strings, e.g. "25.00".
    pub value: String,
}

/// The response from `POST /v1/notifications/verify-webhook-signature`.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyWebhookResponse {
    pub verification_status: String,
}

/// Represents an error response body from the PayPal API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_response_deserializes_from_processor_json() {
        let json = r#"{
            "id": "5O190127TN364715T",
            "status": "COMPLETED",
            "purchase_units": [{
                "reference_id": "default",
                "payments": {
                    "captures": [{
                        "id": "3C679366HH908993F",
                        "status": "COMPLETED",
                        "amount": { "currency_code": "USD", "value": "25.00" }
                    }]
                }
            }]
        }"#;

        let capture: CaptureOrderResponse = serde_json::from_str(json).unwrap();
        assert_eq!(capture.status, "COMPLETED");
        let unit = &capture.purchase_units[0];
        let first = &unit.payments.as_ref().unwrap().captures[0];
        assert_eq!(first.amount.value, "25.00");
    }

    #[test]
    fn order_response_tolerates_missing_links() {
        let order: OrderResponse =
            serde_json::from_str(r#"{ "id": "8GB12345", "status": "CREATED" }"#).unwrap();
        assert!(order.links.is_empty());
    }

    #[test]
    fn declined_capture_keeps_its_status() {
        let json = r#"{ "id": "5O1", "status": "DECLINED", "purchase_units": [] }"#;
        let capture: CaptureOrderResponse = serde_json::from_str(json).unwrap();
        assert_eq!(capture.status, "DECLINED");
        assert!(capture.purchase_units.is_empty());
    }
}
