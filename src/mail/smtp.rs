//! SMTP transports: the production STARTTLS relay and the Ethereal-style
//! test mailbox (throwaway account provisioned over HTTP, preview URL
//! parsed from the server's MSGID token).

use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::response::Response;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::Deserialize;

use crate::config::MailConfig;
use crate::mail::{MailError, OutboundEmail, SendOutcome};

fn parse_mailbox(s: &str) -> Result<Mailbox, MailError> {
    s.trim()
        .parse::<Mailbox>()
        .map_err(|e| MailError::Address(format!("{}: {}", s, e)))
}

fn build_message(mail: &OutboundEmail) -> Result<Message, MailError> {
    let mut builder = Message::builder()
        .from(parse_mailbox(&mail.from)?)
        .subject(mail.subject.clone());

    for addr in &mail.to {
        builder = builder.to(parse_mailbox(addr)?);
    }
    for addr in &mail.cc {
        builder = builder.cc(parse_mailbox(addr)?);
    }
    for addr in &mail.bcc {
        builder = builder.bcc(parse_mailbox(addr)?);
    }
    if let Some(reply_to) = &mail.reply_to {
        builder = builder.reply_to(parse_mailbox(reply_to)?);
    }

    let message = match &mail.html {
        Some(html) => builder.multipart(MultiPart::alternative_plain_html(
            mail.text.clone(),
            html.clone(),
        )),
        None => builder.body(mail.text.clone()),
    };
    message.map_err(|e| MailError::Smtp(e.to_string()))
}

/// Production relay: STARTTLS on the configured host/port with LOGIN
/// credentials.
pub async fn send_via_relay(
    cfg: &MailConfig,
    mail: &OutboundEmail,
) -> Result<SendOutcome, MailError> {
    let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.smtp_host)
        .map_err(|e| MailError::Smtp(e.to_string()))?
        .port(cfg.smtp_port)
        .credentials(Credentials::new(cfg.smtp_user.clone(), cfg.smtp_pass.clone()))
        .build();

    let message = build_message(mail)?;
    let response = transport
        .send(message)
        .await
        .map_err(|e| MailError::Smtp(e.to_string()))?;

    if cfg.smtp_log {
        tracing::info!(response = ?response, "SMTP response");
    }
    if !response.is_positive() {
        return Err(MailError::Smtp(format!(
            "server did not accept the message: {:?}",
            response
        )));
    }

    Ok(SendOutcome {
        transport: "smtp",
        message_id: None,
        preview_url: None,
    })
}

// ============================================================================
// Test mailbox (Ethereal-style)
// ============================================================================

const TEST_ACCOUNT_URL: &str = "https://api.nodemailer.com/user";
const TEST_WEB_URL: &str = "https://ethereal.email";

#[derive(Debug, Deserialize)]
struct TestSmtp {
    host: String,
    port: u16,
    secure: bool,
}

#[derive(Debug, Deserialize)]
struct TestAccount {
    user: String,
    pass: String,
    smtp: TestSmtp,
    #[serde(default)]
    web: String,
}

async fn create_test_account(http: &reqwest::Client) -> Result<TestAccount, MailError> {
    let resp = http
        .post(TEST_ACCOUNT_URL)
        .json(&serde_json::json!({
            "requestor": "orthosite",
            "version": "0.1"
        }))
        .send()
        .await
        .map_err(|e| MailError::Api(e.to_string()))?;

    if !resp.status().is_success() {
        return Err(MailError::Api(format!(
            "test account request failed: {}",
            resp.status()
        )));
    }
    resp.json::<TestAccount>()
        .await
        .map_err(|e| MailError::Api(e.to_string()))
}

/// The server acknowledges accepted test messages with a
/// `[STATUS=new MSGID=...]` suffix; the MSGID is the mailbox's message
/// page id.
fn preview_url(web: &str, response: &Response) -> Option<String> {
    let line = response.first_line()?;
    let rest = line.split("MSGID=").nth(1)?;
    let id: String = rest
        .chars()
        .take_while(|c| !c.is_whitespace() && *c != ']')
        .collect();
    if id.is_empty() {
        return None;
    }
    Some(format!("{}/message/{}", web.trim_end_matches('/'), id))
}

pub async fn send_via_test_mailbox(
    http: &reqwest::Client,
    mail: &OutboundEmail,
) -> Result<SendOutcome, MailError> {
    let account = create_test_account(http).await?;
    tracing::info!(user = %account.user, "using test mailbox account");

    let builder = if account.smtp.secure {
        AsyncSmtpTransport::<Tokio1Executor>::relay(&account.smtp.host)
    } else {
        AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&account.smtp.host)
    }
    .map_err(|e| MailError::Smtp(e.to_string()))?;

    let transport = builder
        .port(account.smtp.port)
        .credentials(Credentials::new(account.user.clone(), account.pass.clone()))
        .build();

    let message = build_message(mail)?;
    let response = transport
        .send(message)
        .await
        .map_err(|e| MailError::Smtp(e.to_string()))?;

    let web = if account.web.is_empty() {
        TEST_WEB_URL
    } else {
        &account.web
    };
    let preview = preview_url(web, &response);
    if let Some(url) = &preview {
        tracing::info!(preview = %url, "test mailbox preview");
    }

    Ok(SendOutcome {
        transport: "test-mailbox",
        message_id: None,
        preview_url: preview,
    })
}
