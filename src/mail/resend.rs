//! Resend HTTP email API. Used when `USE_EMAIL_API` is set, which lets the
//! site deliver mail from hosts where outbound SMTP is blocked.

use serde::Serialize;

use crate::mail::{MailError, OutboundEmail, SendOutcome};

const API_URL: &str = "https://api.resend.com/emails";

fn no_addresses(v: &&[String]) -> bool {
    v.is_empty()
}

#[derive(Serialize)]
struct Payload<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<&'a str>,
    #[serde(skip_serializing_if = "no_addresses")]
    cc: &'a [String],
    #[serde(skip_serializing_if = "no_addresses")]
    bcc: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
}

pub async fn send(
    http: &reqwest::Client,
    api_key: &str,
    mail: &OutboundEmail,
) -> Result<SendOutcome, MailError> {
    if api_key.is_empty() {
        return Err(MailError::MissingApiKey);
    }

    let payload = Payload {
        from: &mail.from,
        to: &mail.to,
        subject: &mail.subject,
        text: &mail.text,
        html: mail.html.as_deref(),
        cc: &mail.cc,
        bcc: &mail.bcc,
        reply_to: mail.reply_to.as_deref(),
    };

    let resp = http
        .post(API_URL)
        .bearer_auth(api_key)
        .json(&payload)
        .send()
        .await
        .map_err(|e| MailError::Api(e.to_string()))?;

    let status = resp.status();
    let body: serde_json::Value = resp.json().await.unwrap_or_default();

    if !status.is_success() {
        let detail = body
            .get("message")
            .and_then(|m| m.as_str())
            .map(String::from)
            .unwrap_or_else(|| body.to_string());
        return Err(MailError::Api(format!("{}: {}", status, detail)));
    }

    Ok(SendOutcome {
        transport: "email-api",
        message_id: body.get("id").and_then(|v| v.as_str()).map(String::from),
        preview_url: None,
    })
}
