//! Outbound email with runtime transport selection.
//!
//! Mode precedence (first configured flag wins):
//! 1. local JSON: serialize the message and log it, no network
//! 2. test mailbox: throwaway account on an Ethereal-style service,
//!    falling back to local JSON if provisioning or sending fails
//! 3. HTTP email API (Resend)
//! 4. production SMTP (STARTTLS relay)

pub mod resend;
pub mod smtp;

use serde::Serialize;
use thiserror::Error;

use crate::config::MailConfig;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid address: {0}")]
    Address(String),
    #[error("email API key missing")]
    MissingApiKey,
    #[error("email API error: {0}")]
    Api(String),
    #[error("SMTP error: {0}")]
    Smtp(String),
}

/// A fully addressed message, transport-agnostic. `html` turns the send
/// into multipart/alternative.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OutboundEmail {
    pub from: String,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub reply_to: Option<String>,
    pub subject: String,
    pub text: String,
    pub html: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendOutcome {
    pub transport: &'static str,
    pub message_id: Option<String>,
    pub preview_url: Option<String>,
}

pub struct Mailer {
    cfg: MailConfig,
    http: reqwest::Client,
}

impl Mailer {
    pub fn new(cfg: MailConfig) -> Self {
        Self {
            cfg,
            http: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &MailConfig {
        &self.cfg
    }

    pub async fn send(&self, mail: &OutboundEmail) -> Result<SendOutcome, MailError> {
        if self.cfg.local_json {
            return self.send_local_json(mail);
        }

        if self.cfg.test_mailbox {
            match smtp::send_via_test_mailbox(&self.http, mail).await {
                Ok(outcome) => return Ok(outcome),
                Err(e) => {
                    tracing::warn!("test mailbox send failed, logging instead: {}", e);
                    return self.send_local_json(mail);
                }
            }
        }

        if self.cfg.use_email_api {
            return resend::send(&self.http, &self.cfg.resend_api_key, mail).await;
        }

        smtp::send_via_relay(&self.cfg, mail).await
    }

    fn send_local_json(&self, mail: &OutboundEmail) -> Result<SendOutcome, MailError> {
        let payload = serde_json::to_string(mail)
            .unwrap_or_else(|e| format!("{{\"serialize_error\":\"{}\"}}", e));
        tracing::info!(payload = %payload, "outbound email (local JSON transport)");
        Ok(SendOutcome {
            transport: "local-json",
            message_id: None,
            preview_url: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_cfg() -> MailConfig {
        MailConfig {
            local_json: true,
            test_mailbox: false,
            use_email_api: false,
            smtp_host: String::new(),
            smtp_port: 587,
            smtp_user: String::new(),
            smtp_pass: String::new(),
            smtp_from: String::new(),
            smtp_log: false,
            contact_to: "support@example.com".into(),
            contact_cc: String::new(),
            contact_bcc: String::new(),
            contact_from: "Site <no-reply@example.com>".into(),
            resend_api_key: String::new(),
        }
    }

    #[tokio::test]
    async fn local_json_mode_never_touches_the_network() {
        let mailer = Mailer::new(local_cfg());
        let outcome = mailer
            .send(&OutboundEmail {
                from: "Site <no-reply@example.com>".into(),
                to: vec!["support@example.com".into()],
                subject: "hello".into(),
                text: "body".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(outcome.transport, "local-json");
        assert!(outcome.preview_url.is_none());
    }

    #[tokio::test]
    async fn api_mode_without_key_is_an_error() {
        let mut cfg = local_cfg();
        cfg.local_json = false;
        cfg.use_email_api = true;
        let mailer = Mailer::new(cfg);
        let err = mailer
            .send(&OutboundEmail::default())
            .await
            .expect_err("missing key");
        assert!(matches!(err, MailError::MissingApiKey));
    }
}
