//! Environment-driven configuration.
//!
//! Everything the site needs at runtime comes from environment variables,
//! with local-development defaults. Mail settings mirror the hosting
//! provider's env sheet: transport selection flags first, then SMTP
//! credentials, then recipient lists.

use std::path::PathBuf;

/// Parse the usual truthy env spellings: "1", "true", "yes", "on".
pub fn env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(v) => matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

pub fn env_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_u16(key: &str, default: u16) -> u16 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Transport selection and addressing for outbound email.
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// Log the message as JSON instead of sending (no network).
    pub local_json: bool,
    /// Send through a throwaway test mailbox account.
    pub test_mailbox: bool,
    /// Send through the HTTP email API instead of SMTP.
    pub use_email_api: bool,

    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_user: String,
    pub smtp_pass: String,
    pub smtp_from: String,
    pub smtp_log: bool,

    /// Raw recipient lists, comma/semicolon separated.
    pub contact_to: String,
    pub contact_cc: String,
    pub contact_bcc: String,
    pub contact_from: String,

    pub resend_api_key: String,
}

impl MailConfig {
    pub fn from_env() -> Self {
        let smtp_from = env_str("SMTP_FROM", "");
        let smtp_user = env_str("SMTP_USER", "");
        let default_from = if !smtp_from.is_empty() {
            smtp_from.clone()
        } else if !smtp_user.is_empty() {
            smtp_user.clone()
        } else {
            "no-reply@localhost".to_string()
        };

        Self {
            local_json: env_bool("MAIL_LOCAL_JSON", false),
            test_mailbox: env_bool("MAIL_TEST", false),
            use_email_api: env_bool("USE_EMAIL_API", false),
            smtp_host: env_str("SMTP_HOST", "smtp.office365.com"),
            smtp_port: env_u16("SMTP_PORT", 587),
            smtp_user,
            smtp_pass: env_str("SMTP_PASS", ""),
            smtp_from,
            smtp_log: env_bool("SMTP_LOG", false),
            contact_to: env_str("CONTACT_TO", "custsupport@localhost"),
            contact_cc: env_str("CONTACT_CC", ""),
            contact_bcc: env_str("CONTACT_BCC", ""),
            contact_from: env_str("CONTACT_FROM", &default_from),
            resend_api_key: env_str("RESEND_API_KEY", ""),
        }
    }

    /// Envelope sender for SMTP sends.
    pub fn envelope_from(&self) -> String {
        if !self.smtp_from.is_empty() {
            self.smtp_from.clone()
        } else if !self.smtp_user.is_empty() {
            self.smtp_user.clone()
        } else {
            "no-reply@localhost".to_string()
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Directory holding products.json and studies.json.
    pub data_dir: PathBuf,
    /// Directory served under /images.
    pub static_dir: PathBuf,
    /// Public hostname used in email footers.
    pub site_host: String,
    pub mail: MailConfig,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: env_u16("PORT", 3000),
            data_dir: PathBuf::from(env_str("DATA_DIR", "data")),
            static_dir: PathBuf::from(env_str("STATIC_DIR", "static")),
            site_host: env_str("SITE_HOST", "orthosite.example.com"),
            mail: MailConfig::from_env(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_bool_accepts_common_truthy_spellings() {
        std::env::set_var("ORTHOSITE_TEST_FLAG_A", "yes");
        std::env::set_var("ORTHOSITE_TEST_FLAG_B", "0");
        assert!(env_bool("ORTHOSITE_TEST_FLAG_A", false));
        assert!(!env_bool("ORTHOSITE_TEST_FLAG_B", true));
        assert!(env_bool("ORTHOSITE_TEST_FLAG_MISSING", true));
    }

    #[test]
    fn envelope_from_falls_back_to_user_then_localhost() {
        let mut cfg = MailConfig {
            local_json: true,
            test_mailbox: false,
            use_email_api: false,
            smtp_host: String::new(),
            smtp_port: 587,
            smtp_user: "ops@example.com".into(),
            smtp_pass: String::new(),
            smtp_from: String::new(),
            smtp_log: false,
            contact_to: String::new(),
            contact_cc: String::new(),
            contact_bcc: String::new(),
            contact_from: String::new(),
            resend_api_key: String::new(),
        };
        assert_eq!(cfg.envelope_from(), "ops@example.com");
        cfg.smtp_from = "Orders <orders@example.com>".into();
        assert_eq!(cfg.envelope_from(), "Orders <orders@example.com>");
    }
}
