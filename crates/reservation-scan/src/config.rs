use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use validator::Validate;

use crate::scan_types::ScanError;

/// Snapshot of environment variables a config is read from
pub type EnvVars = HashMap<String, String>;

/// Collect the process environment
pub fn env_vars() -> EnvVars {
    std::env::vars().collect()
}

fn lookup(vars: &EnvVars, key: &str) -> Option<String> {
    vars.get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn required(vars: &EnvVars, key: &str) -> Result<String, ScanError> {
    lookup(vars, key)
        .ok_or_else(|| ScanError::ConfigError(format!("{} environment variable not set", key)))
}

fn check(config: &impl Validate) -> Result<(), ScanError> {
    config
        .validate()
        .map_err(|e| ScanError::ConfigError(e.to_string()))
}

/// Connection settings for the Resy API
#[derive(Clone, Validate)]
pub struct ResyConfig {
    /// API root, e.g. `https://api.resy.com/4`
    #[validate(url(message = "Base URL must be a valid URL"))]
    pub base_url: String,

    /// Key sent in the `Authorization` header
    pub api_key: String,

    /// User agent sent with every request
    pub user_agent: String,

    /// Per-request timeout
    pub timeout: Duration,
}

impl ResyConfig {
    /// Build a config, failing when the key or base URL is empty
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self, ScanError> {
        let api_key = api_key.into();
        let base_url = base_url.into();

        if api_key.trim().is_empty() {
            return Err(ScanError::ConfigError("API key is required.".to_string()));
        }
        if base_url.trim().is_empty() {
            return Err(ScanError::ConfigError("Base URL is required.".to_string()));
        }

        let config = Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            user_agent: "Mozilla/5.0".to_string(),
            timeout: Duration::from_secs(30),
        };
        check(&config)?;

        Ok(config)
    }

    /// Read `BASE_URL` from `vars`; the key comes from the credential store
    pub fn from_vars(vars: &EnvVars, api_key: impl Into<String>) -> Result<Self, ScanError> {
        let base_url = lookup(vars, "BASE_URL")
            .ok_or_else(|| ScanError::ConfigError("Base URL is required.".to_string()))?;

        Self::new(api_key, base_url)
    }
}

impl fmt::Debug for ResyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResyConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"***")
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// SMTP relay and addressing for availability emails
#[derive(Clone, Validate)]
pub struct EmailConfig {
    /// Sender address, also the SMTP login
    #[validate(email(message = "SENDER_EMAIL is not a valid address"))]
    pub sender_email: String,

    /// SMTP password (an app password for Gmail)
    #[validate(length(min = 1, message = "SENDER_PASSWORD is empty"))]
    pub sender_password: String,

    /// Address that receives the notifications
    #[validate(email(message = "RECIPIENT_EMAIL is not a valid address"))]
    pub recipient_email: String,

    /// Relay host
    #[validate(length(min = 1, message = "SMTP_SERVER is empty"))]
    pub smtp_server: String,

    /// Relay submission port
    #[validate(range(min = 1, message = "SMTP_PORT must be a valid port"))]
    pub smtp_port: u16,
}

impl EmailConfig {
    /// Default relay when `SMTP_SERVER` is unset
    pub const DEFAULT_SMTP_SERVER: &'static str = "smtp.gmail.com";

    /// Default STARTTLS submission port
    pub const DEFAULT_SMTP_PORT: u16 = 587;

    /// Read the email settings from `vars`
    pub fn from_vars(vars: &EnvVars) -> Result<Self, ScanError> {
        let sender_email = required(vars, "SENDER_EMAIL")?;
        let sender_password = required(vars, "SENDER_PASSWORD")?;
        let recipient_email = required(vars, "RECIPIENT_EMAIL")?;

        let smtp_server =
            lookup(vars, "SMTP_SERVER").unwrap_or_else(|| Self::DEFAULT_SMTP_SERVER.to_string());

        let smtp_port = match lookup(vars, "SMTP_PORT") {
            Some(port) => port.parse::<u16>().map_err(|e| {
                ScanError::ConfigError(format!("Invalid SMTP_PORT '{}': {}", port, e))
            })?,
            None => Self::DEFAULT_SMTP_PORT,
        };

        let config = Self {
            sender_email,
            sender_password,
            recipient_email,
            smtp_server,
            smtp_port,
        };
        check(&config)?;

        Ok(config)
    }
}

impl fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailConfig")
            .field("sender_email", &self.sender_email)
            .field("sender_password", &"***")
            .field("recipient_email", &self.recipient_email)
            .field("smtp_server", &self.smtp_server)
            .field("smtp_port", &self.smtp_port)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> EnvVars {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn email_vars() -> EnvVars {
        vars(&[
            ("SENDER_EMAIL", "sender@example.com"),
            ("SENDER_PASSWORD", "password"),
            ("RECIPIENT_EMAIL", "recipient@example.com"),
            ("SMTP_SERVER", "smtp.example.com"),
            ("SMTP_PORT", "2525"),
        ])
    }

    #[test]
    fn test_email_config_from_vars() {
        let config = EmailConfig::from_vars(&email_vars()).unwrap();

        assert_eq!(config.sender_email, "sender@example.com");
        assert_eq!(config.sender_password, "password");
        assert_eq!(config.recipient_email, "recipient@example.com");
        assert_eq!(config.smtp_server, "smtp.example.com");
        assert_eq!(config.smtp_port, 2525);
    }

    #[test]
    fn test_email_config_defaults_relay() {
        let mut vars = email_vars();
        vars.remove("SMTP_SERVER");
        vars.remove("SMTP_PORT");

        let config = EmailConfig::from_vars(&vars).unwrap();

        assert_eq!(config.smtp_server, "smtp.gmail.com");
        assert_eq!(config.smtp_port, 587);
    }

    #[test]
    fn test_email_config_missing_recipient() {
        let mut vars = email_vars();
        vars.remove("RECIPIENT_EMAIL");

        let err = EmailConfig::from_vars(&vars).unwrap_err();

        assert!(matches!(err, ScanError::ConfigError(_)));
        assert!(err.to_string().contains("RECIPIENT_EMAIL"));
    }

    #[test]
    fn test_email_config_rejects_bad_values() {
        let mut bad_port = email_vars();
        bad_port.insert("SMTP_PORT".into(), "smtp".into());
        assert!(matches!(
            EmailConfig::from_vars(&bad_port),
            Err(ScanError::ConfigError(_))
        ));

        let mut bad_sender = email_vars();
        bad_sender.insert("SENDER_EMAIL".into(), "not-an-address".into());
        assert!(matches!(
            EmailConfig::from_vars(&bad_sender),
            Err(ScanError::ConfigError(_))
        ));
    }

    #[test]
    fn test_email_config_debug_hides_password() {
        let config = EmailConfig::from_vars(&email_vars()).unwrap();
        assert!(!format!("{:?}", config).contains("password\""));
    }

    #[test]
    fn test_resy_config_requires_key_and_url() {
        let err = ResyConfig::new("", "https://api.resy.com/4").unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: API key is required.");

        let err = ResyConfig::new("test_api_key", "").unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: Base URL is required.");

        let err = ResyConfig::from_vars(&vars(&[]), "test_api_key").unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: Base URL is required.");
    }

    #[test]
    fn test_resy_config_from_vars() {
        let config = ResyConfig::from_vars(
            &vars(&[("BASE_URL", "https://api.resy.com/4/")]),
            "test_api_key",
        )
        .unwrap();

        assert_eq!(config.base_url, "https://api.resy.com/4");
        assert_eq!(config.api_key, "test_api_key");
        assert!(!format!("{:?}", config).contains("test_api_key"));
    }
}
