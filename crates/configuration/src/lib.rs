use crate::error::ConfigError;
use crate::settings::Config;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{EmailConfig, PayPalConfig, ServerConfig, StripeConfig};

/// Loads the application configuration from the `config.toml` file.
///
/// Secrets are layered on top from the environment with the `DONATALK`
/// prefix (e.g. `DONATALK__PAYPAL__CLIENT_SECRET`), so the checked-in file
/// never has to contain credentials.
pub fn load_config() -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        // Tells the builder to look for a file named `config.toml`
        .add_source(config::File::with_name("config.toml"))
        .add_source(
            config::Environment::with_prefix("DONATALK")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [server]
        host = "0.0.0.0"
        port = 3000
        public_base_url = "https://app.donatalk.test"

        [paypal]
        api_base_url = "https://api-m.sandbox.paypal.com"
        client_id = "client-id"
        client_secret = "client-secret"
        webhook_id = "WH-1"

        [stripe]
        webhook_secret = "whsec_test"

        [email]
        api_base_url = "https://api.sendgrid.com"
        api_key = ""
        from_address = "support@donatalk.test"
        support_address = "support@donatalk.test"
        meeting_link = "https://example.zoom.us/j/1"
    "#;

    fn parse(toml: &str) -> Config {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn sample_config_parses_and_validates() {
        let config = parse(SAMPLE);
        assert_eq!(config.server.port, 3000);
        assert!(config.email.bcc_address.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_paypal_credentials_fail_validation() {
        let config = parse(&SAMPLE.replace("client-secret", ""));
        assert!(config.validate().is_err());
    }
}
