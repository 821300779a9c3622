use crate::error::MailerError;
use configuration::EmailConfig;
use core_types::UserRole;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Serialize;

pub mod error;
pub mod templates;

pub use templates::MeetingNotification;

/// The JSON payload for the SendGrid v3 `mail/send` endpoint.
#[derive(Debug, Serialize)]
struct MailSendPayload<'a> {
    personalizations: Vec<Personalization<'a>>,
    from: EmailAddress<'a>,
    subject: &'a str,
    content: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: Vec<EmailAddress<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bcc: Option<Vec<EmailAddress<'a>>>,
}

#[derive(Debug, Serialize)]
struct EmailAddress<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    content_type: &'a str,
    value: &'a str,
}

/// A client for sending transactional email through the SendGrid HTTP API.
pub struct Mailer {
    client: Client,
    api_base_url: String,
    api_key: String,
    from_address: String,
    bcc_address: Option<String>,
    support_address: String,
    meeting_link: String,
    public_base_url: String,
}

impl Mailer {
    /// Creates a new `Mailer`.
    ///
    /// Returns `None` if the API key is missing from the configuration,
    /// allowing the system to gracefully run without outbound email.
    pub fn new(config: &EmailConfig, public_base_url: &str) -> Option<Self> {
        if config.api_key.is_empty() {
            tracing::warn!("Mailer is not configured (missing API key); outbound email disabled.");
            return None;
        }
        Some(Self {
            client: Client::new(),
            api_base_url: config.api_base_url.clone(),
            api_key: config.api_key.clone(),
            from_address: config.from_address.clone(),
            bcc_address: config.bcc_address.clone(),
            support_address: config.support_address.clone(),
            meeting_link: config.meeting_link.clone(),
            public_base_url: public_base_url.to_string(),
        })
    }

    /// Sends one HTML email to the given recipients, BCCing the operations
    /// inbox when one is configured.
    pub async fn send(&self, to: &[&str], subject: &str, html: &str) -> Result<(), MailerError> {
        let url = format!("{}/v3/mail/send", self.api_base_url);

        let payload = MailSendPayload {
            personalizations: vec![Personalization {
                to: to.iter().map(|email| EmailAddress { email }).collect(),
                bcc: self
                    .bcc_address
                    .as_deref()
                    .map(|email| vec![EmailAddress { email }]),
            }],
            from: EmailAddress {
                email: &self.from_address,
            },
            subject,
            content: vec![Content {
                content_type: "text/html",
                value: html,
            }],
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to decode error response".to_string());
            return Err(MailerError::ApiError(error_text));
        }

        Ok(())
    }

    /// Welcome email after a profile signup.
    pub async fn send_signup_welcome(
        &self,
        role: UserRole,
        full_name: &str,
        email: &str,
    ) -> Result<(), MailerError> {
        let (subject, html) = templates::signup_welcome(role, full_name, &self.public_base_url);
        self.send(&[email], &subject, &html).await
    }

    /// Confirmation email after a captured payment credited a balance.
    pub async fn send_payment_confirmation(
        &self,
        pitcher_name: &str,
        pitcher_email: &str,
        amount: Decimal,
    ) -> Result<(), MailerError> {
        let (subject, html) =
            templates::payment_confirmation(pitcher_name, amount, &self.public_base_url);
        self.send(&[pitcher_email], &subject, &html).await
    }

    /// Meeting-arrangement email, sent to both parties at once.
    pub async fn send_meeting_notification(
        &self,
        notification: &MeetingNotification,
    ) -> Result<(), MailerError> {
        let (subject, html) = templates::meeting_notification(
            notification,
            &self.meeting_link,
            &self.support_address,
        );
        self.send(
            &[
                notification.pitcher_email.as_str(),
                notification.listener_email.as_str(),
            ],
            &subject,
            &html,
        )
        .await
    }
}
