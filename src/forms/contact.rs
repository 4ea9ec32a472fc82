//! Contact form: validation and email building.
//!
//! The honeypot field (`fax`) is handled by the route: a filled honeypot
//! pretends success without sending anything.

use serde::Deserialize;

use crate::config::MailConfig;
use crate::forms::{escape_html, looks_like_email, split_addresses};
use crate::mail::OutboundEmail;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub company: String,
    pub phone: String,
    pub subject: String,
    pub interest: String,
    pub message: String,
    /// Honeypot. Humans never see it; bots fill it.
    pub fax: String,
}

impl ContactForm {
    fn trimmed(&self) -> ContactForm {
        ContactForm {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            company: self.company.trim().to_string(),
            phone: self.phone.trim().to_string(),
            subject: self.subject.trim().to_string(),
            interest: self.interest.trim().to_string(),
            message: self.message.trim().to_string(),
            fax: self.fax.trim().to_string(),
        }
    }

    pub fn is_honeypot_tripped(&self) -> bool {
        !self.fax.trim().is_empty()
    }
}

pub fn validate(form: &ContactForm) -> Result<(), &'static str> {
    if form.name.trim().is_empty()
        || form.email.trim().is_empty()
        || form.message.trim().is_empty()
    {
        return Err("Please check the required fields and try again.");
    }
    if !looks_like_email(form.email.trim()) {
        return Err("Please enter a valid email address.");
    }
    Ok(())
}

pub fn subject_line(form: &ContactForm) -> String {
    let topic = form.subject.trim();
    if topic.is_empty() {
        "Website contact".to_string()
    } else {
        format!("Website contact — {}", topic)
    }
}

fn or_dash(s: &str) -> &str {
    if s.is_empty() {
        "—"
    } else {
        s
    }
}

pub fn text_body(form: &ContactForm, subject: &str, msg_ref: &str, site_host: &str) -> String {
    let f = form.trimmed();
    [
        format!("From: {} <{}>", f.name, f.email),
        format!("Company: {}", or_dash(&f.company)),
        format!("Phone: {}", or_dash(&f.phone)),
        format!("Interest: {}", or_dash(&f.interest)),
        format!("Subject: {}", subject),
        String::new(),
        f.message.clone(),
        String::new(),
        format!("Ref: {}", msg_ref),
        format!("— Sent from {}/contact —", site_host),
    ]
    .join("\n")
}

pub fn html_body(form: &ContactForm, subject: &str, msg_ref: &str, site_host: &str) -> String {
    let f = form.trimmed();
    format!(
        "<p><b>From:</b> {} &lt;{}&gt;</p>\n\
         <p><b>Company:</b> {}</p>\n\
         <p><b>Phone:</b> {}</p>\n\
         <p><b>Interest:</b> {}</p>\n\
         <p><b>Subject:</b> {}</p>\n\
         <hr>\n\
         <p>{}</p>\n\
         <hr>\n\
         <p style=\"color:#64748b;font-size:12px\">Submitted via {}/contact • Ref {}</p>",
        escape_html(&f.name),
        escape_html(&f.email),
        or_dash(&escape_html(&f.company)).to_string(),
        or_dash(&escape_html(&f.phone)).to_string(),
        or_dash(&escape_html(&f.interest)).to_string(),
        escape_html(subject),
        escape_html(&f.message).replace('\n', "<br>"),
        escape_html(site_host),
        escape_html(msg_ref),
    )
}

/// Assemble the support email for a validated submission.
pub fn build_email(
    form: &ContactForm,
    msg_ref: &str,
    cfg: &MailConfig,
    site_host: &str,
) -> OutboundEmail {
    let f = form.trimmed();
    let subject = subject_line(&f);

    OutboundEmail {
        from: cfg.contact_from.clone(),
        to: split_addresses(&cfg.contact_to),
        cc: split_addresses(&cfg.contact_cc),
        bcc: split_addresses(&cfg.contact_bcc),
        reply_to: Some(format!("{} <{}>", f.name, f.email)),
        subject: format!("{} ({})", subject, msg_ref),
        text: text_body(&f, &subject, msg_ref, site_host),
        html: Some(html_body(&f, &subject, msg_ref, site_host)),
    }
}
