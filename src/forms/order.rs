//! Order-request form: validation and the two outbound emails (support
//! order sheet, customer confirmation).

use serde::Deserialize;

use crate::config::MailConfig;
use crate::forms::split_addresses;
use crate::mail::OutboundEmail;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrderForm {
    pub company: String,
    pub contact_name: String,
    pub email: String,
    pub phone: String,
    pub ship_address1: String,
    pub ship_address2: String,
    pub ship_city: String,
    pub ship_state: String,
    pub ship_zip: String,
    pub ship_country: String,
    pub po_number: String,
    pub ship_method: String,
    /// CSV rows of item number / quantity, pasted or built client-side.
    pub order_items: String,
    pub notes: String,
    /// Honeypot.
    pub fax: String,
}

impl OrderForm {
    pub fn is_honeypot_tripped(&self) -> bool {
        !self.fax.trim().is_empty()
    }
}

pub fn validate(form: &OrderForm) -> Result<(), &'static str> {
    let required = [
        &form.contact_name,
        &form.email,
        &form.ship_address1,
        &form.ship_city,
        &form.ship_state,
        &form.ship_zip,
        &form.order_items,
    ];
    if required.iter().any(|f| f.trim().is_empty()) {
        return Err("Please fill all required fields.");
    }
    Ok(())
}

pub fn subject_line(form: &OrderForm) -> String {
    let who = if form.company.trim().is_empty() {
        form.contact_name.trim()
    } else {
        form.company.trim()
    };
    format!("Website order: {}", who)
}

/// The human-readable order sheet sent to customer support.
pub fn order_text(form: &OrderForm, site_host: &str) -> String {
    let f = form;
    let country = if f.ship_country.trim().is_empty() {
        "USA"
    } else {
        f.ship_country.trim()
    };
    let method = if f.ship_method.trim().is_empty() {
        "UPS Ground (default)"
    } else {
        f.ship_method.trim()
    };
    let notes = if f.notes.trim().is_empty() {
        "(none)"
    } else {
        f.notes.trim()
    };

    [
        "New website order request".to_string(),
        "================================".to_string(),
        String::new(),
        "Customer".to_string(),
        "--------------------------------".to_string(),
        format!("Company:       {}", f.company.trim()),
        format!("Contact:       {}", f.contact_name.trim()),
        format!("Email:         {}", f.email.trim()),
        format!("Phone:         {}", f.phone.trim()),
        String::new(),
        "Shipping".to_string(),
        "--------------------------------".to_string(),
        format!("Address 1:     {}", f.ship_address1.trim()),
        format!("Address 2:     {}", f.ship_address2.trim()),
        format!(
            "City/State:    {}, {} {}",
            f.ship_city.trim(),
            f.ship_state.trim(),
            f.ship_zip.trim()
        ),
        format!("Country:       {}", country),
        String::new(),
        "Order Details".to_string(),
        "--------------------------------".to_string(),
        format!("PO Number:     {}", f.po_number.trim()),
        format!("Ship Method:   {}", method),
        String::new(),
        "Items (CSV):".to_string(),
        f.order_items.trim().to_string(),
        String::new(),
        "Notes".to_string(),
        "--------------------------------".to_string(),
        notes.to_string(),
        String::new(),
        format!("— Sent from {} ordering form —", site_host),
    ]
    .join("\n")
}

/// Short confirmation back to the customer. Deliberately content-free
/// beyond the acknowledgement: no items, no addresses.
pub fn confirmation_text(form: &OrderForm, support_address: &str) -> String {
    let contact = {
        let t = form.contact_name.trim();
        if t.is_empty() {
            "there"
        } else {
            t
        }
    };
    [
        format!("Hi {},", contact),
        String::new(),
        "Thanks for your order request — we've received it.".to_string(),
        "A member of our Customer Service team will reach out shortly to confirm details (items, sizes, quantities) and shipping.".to_string(),
        String::new(),
        "If you need to add or change anything, just reply to this email.".to_string(),
        String::new(),
        "Best,".to_string(),
        "Customer Service".to_string(),
        support_address.to_string(),
        String::new(),
    ]
    .join("\n")
}

/// Support email plus the customer confirmation.
pub fn build_emails(
    form: &OrderForm,
    cfg: &MailConfig,
    site_host: &str,
) -> (OutboundEmail, OutboundEmail) {
    let to = split_addresses(&cfg.contact_to);
    let support_address = to.first().cloned().unwrap_or_else(|| cfg.envelope_from());

    let support = OutboundEmail {
        from: cfg.contact_from.clone(),
        to,
        reply_to: Some(form.email.trim().to_string()),
        subject: subject_line(form),
        text: order_text(form, site_host),
        ..Default::default()
    };

    let confirmation = OutboundEmail {
        from: cfg.contact_from.clone(),
        to: vec![form.email.trim().to_string()],
        subject: "We received your order request".to_string(),
        text: confirmation_text(form, &support_address),
        ..Default::default()
    };

    (support, confirmation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn form() -> OrderForm {
        OrderForm {
            company: "Westside Clinic".into(),
            contact_name: "Sam Lee".into(),
            email: "sam@clinic.example".into(),
            ship_address1: "100 Main St".into(),
            ship_city: "Miami".into(),
            ship_state: "FL".into(),
            ship_zip: "33101".into(),
            order_items: "TS-100-S,2\nWR-10-L,1".into(),
            ..Default::default()
        }
    }

    fn cfg() -> MailConfig {
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

    #[test]
    fn required_fields_are_enforced() {
        assert!(validate(&form()).is_ok());
        let mut f = form();
        f.ship_zip = String::new();
        assert_eq!(validate(&f).unwrap_err(), "Please fill all required fields.");
    }

    #[test]
    fn subject_prefers_company_over_contact() {
        assert_eq!(subject_line(&form()), "Website order: Westside Clinic");
        let mut f = form();
        f.company = String::new();
        assert_eq!(subject_line(&f), "Website order: Sam Lee");
    }

    #[test]
    fn order_text_defaults_country_method_and_notes() {
        let text = order_text(&form(), "example.com");
        assert!(text.contains("Country:       USA"));
        assert!(text.contains("Ship Method:   UPS Ground (default)"));
        assert!(text.contains("TS-100-S,2"));
        assert!(text.contains("(none)"));
        assert!(text.contains("City/State:    Miami, FL 33101"));
    }

    #[test]
    fn confirmation_mentions_no_order_content() {
        let text = confirmation_text(&form(), "support@example.com");
        assert!(text.starts_with("Hi Sam Lee,"));
        assert!(!text.contains("TS-100"));
        assert!(!text.contains("Main St"));
        assert!(text.contains("support@example.com"));
    }

    #[test]
    fn emails_route_support_and_customer() {
        let (support, confirmation) = build_emails(&form(), &cfg(), "example.com");
        assert_eq!(support.to, vec!["support@example.com"]);
        assert_eq!(support.reply_to.as_deref(), Some("sam@clinic.example"));
        assert_eq!(confirmation.to, vec!["sam@clinic.example"]);
        assert_eq!(confirmation.subject, "We received your order request");
    }
}
