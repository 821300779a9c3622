use thiserror::Error;

#[derive(Error, Debug)]
pub enum MailerError {
    #[error("Mail API request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Mail API returned an error: {0}")]
    ApiError(String),

    #[error("Mailer is not configured. Missing API key.")]
    NotConfigured,
}
