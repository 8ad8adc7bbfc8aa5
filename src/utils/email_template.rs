use chrono::Utc;
use chrono_tz::Europe::London;

use crate::models::lead_models::LeadSubmission;

const DEFAULT_PAGE_URL: &str = "retail.data-jam.com";

pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#039;")
}

/// Business type label for the notification email. Unknown values pass
/// through raw; a missing value renders as a placeholder.
pub fn format_business_type(business_type: Option<&str>) -> String {
    match business_type {
        Some("retail-shop") => "Retail Shop".into(),
        Some("cafe-restaurant") => "Cafe / Restaurant".into(),
        Some("salon-barbershop") => "Salon / Barbershop".into(),
        Some("gym-studio") => "Gym / Fitness Studio".into(),
        Some("gallery-museum") => "Gallery / Museum".into(),
        Some("other") => "Other".into(),
        Some(raw) if !raw.is_empty() => raw.into(),
        _ => "-".into(),
    }
}

pub fn format_interest(interest: Option<&str>) -> String {
    match interest {
        Some("demo") => "See a Demo".into(),
        Some("trial") => "Start a Trial".into(),
        Some("pricing") => "Pricing Information".into(),
        Some("multi-location") => "Multi-Location Setup".into(),
        Some("general") => "General Question".into(),
        Some(raw) if !raw.is_empty() => raw.into(),
        _ => "-".into(),
    }
}

fn escaped_or_dash(value: Option<&str>) -> String {
    match value {
        Some(text) if !text.is_empty() => escape_html(text),
        _ => "-".into(),
    }
}

fn table_row(label: &str, value: &str) -> String {
    format!(
        "<tr>\n\
         <td style=\"padding: 8px; border: 1px solid #ddd; font-weight: bold;\">{label}</td>\n\
         <td style=\"padding: 8px; border: 1px solid #ddd;\">{value}</td>\n\
         </tr>"
    )
}

/// Render the internal lead notification email. All user-supplied text is
/// escaped; fields arrive already length-clamped.
pub fn build_email_html(lead: &LeadSubmission) -> String {
    let name = escaped_or_dash(lead.name.as_deref());
    let email = escaped_or_dash(lead.email.as_deref());
    let company = escaped_or_dash(lead.company.as_deref());
    let message = escaped_or_dash(lead.message.as_deref());
    let page_url = match lead.page_url.as_deref() {
        Some(url) if !url.is_empty() => escape_html(url),
        _ => DEFAULT_PAGE_URL.into(),
    };
    let business_type = escape_html(&format_business_type(lead.business_type.as_deref()));
    let interest = escape_html(&format_interest(lead.interest.as_deref()));
    let marketing_optin = if lead.marketing_optin == Some(true) { "Yes" } else { "No" };
    let submitted_at = Utc::now().with_timezone(&London).format("%d/%m/%Y, %H:%M:%S");

    format!(
        "<h2 style=\"color: #E62F6E;\">New Retail Lead</h2>\n\
         <p>A new lead has been submitted on <strong>retail.data-jam.com</strong> (Footfall Analytics for SMBs)</p>\n\
         <table style=\"border-collapse: collapse; width: 100%; max-width: 500px;\">\n\
         {name_row}\n\
         {email_row}\n\
         {company_row}\n\
         {type_row}\n\
         {interest_row}\n\
         {message_row}\n\
         {optin_row}\n\
         </table>\n\
         <p style=\"margin-top: 20px; padding: 10px; background: #f5f5f5; border-left: 4px solid #E62F6E;\">\n\
         <strong>Lead Source:</strong> Retail Website (SMB Footfall)<br>\n\
         <strong>Submitted from:</strong> {page_url}<br>\n\
         <strong>Time:</strong> {submitted_at}\n\
         </p>",
        name_row = table_row("Name", &name),
        email_row = table_row("Email", &format!("<a href=\"mailto:{email}\">{email}</a>")),
        company_row = table_row("Business Name", &company),
        type_row = table_row("Business Type", &business_type),
        interest_row = table_row("Interest", &interest),
        message_row = table_row("Message", &message),
        optin_row = table_row("Marketing Opt-in", marketing_optin),
    )
}
