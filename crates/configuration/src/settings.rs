use serde::Deserialize;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub paypal: PayPalConfig,
    pub stripe: StripeConfig,
    pub email: EmailConfig,
}

/// Settings for the HTTP server itself.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// The interface to bind to (e.g., "0.0.0.0").
    pub host: String,
    pub port: u16,
    /// The public origin of the deployment, used in email links
    /// (e.g., "https://app.donatalk.com").
    pub public_base_url: String,
}

/// Credentials and endpoints for the PayPal REST API.
///
/// Point `api_base_url` at "https://api-m.sandbox.paypal.com" for testing and
/// "https://api-m.paypal.com" in production.
#[derive(Debug, Clone, Deserialize)]
pub struct PayPalConfig {
    pub api_base_url: String,
    pub client_id: String,
    pub client_secret: String,
    /// The webhook ID assigned by PayPal, required for signature verification.
    pub webhook_id: String,
}

/// Settings for the Stripe webhook intake.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeConfig {
    /// The endpoint signing secret ("whsec_...").
    pub webhook_secret: String,
}

/// Settings for the transactional email provider (SendGrid v3 API).
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    pub api_base_url: String,
    /// Leave empty to disable outbound email entirely.
    pub api_key: String,
    /// The verified sender address.
    pub from_address: String,
    /// Optional copy of every outbound mail for the operations inbox.
    pub bcc_address: Option<String>,
    /// The address both parties are asked to CC when confirming a meeting.
    pub support_address: String,
    /// The standing video-call link included in meeting-arrangement emails.
    pub meeting_link: String,
}

impl Config {
    /// Rejects configurations that would let the server start but fail on the
    /// first payment. Email credentials are deliberately not checked here;
    /// an empty API key only disables the mailer.
    pub fn validate(&self) -> Result<(), crate::error::ConfigError> {
        if self.paypal.client_id.is_empty() || self.paypal.client_secret.is_empty() {
            return Err(crate::error::ConfigError::ValidationError(
                "paypal.client_id and paypal.client_secret must be set".to_string(),
            ));
        }
        if self.server.public_base_url.is_empty() {
            return Err(crate::error::ConfigError::ValidationError(
                "server.public_base_url must be set".to_string(),
            ));
        }
        Ok(())
    }
}
