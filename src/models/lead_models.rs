use serde::{Deserialize, Serialize};

/// Raw lead submission from the marketing site contact form. Every field is
/// untrusted: lengths are clamped before any downstream use and text is
/// HTML-escaped before it reaches the notification email.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeadSubmission {
    pub name: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub message: Option<String>,
    pub page_url: Option<String>,
    #[serde(rename = "type")]
    pub business_type: Option<String>,
    pub interest: Option<String>,
    pub marketing_optin: Option<bool>,
}

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_EMAIL_LEN: usize = 254;
pub const MAX_COMPANY_LEN: usize = 100;
pub const MAX_MESSAGE_LEN: usize = 2000;
pub const MAX_PAGE_URL_LEN: usize = 500;

impl LeadSubmission {
    /// Enforce per-field length limits before anything else touches the data.
    pub fn clamp_field_lengths(&mut self) {
        truncate_chars(&mut self.name, MAX_NAME_LEN);
        truncate_chars(&mut self.email, MAX_EMAIL_LEN);
        truncate_chars(&mut self.company, MAX_COMPANY_LEN);
        truncate_chars(&mut self.message, MAX_MESSAGE_LEN);
        truncate_chars(&mut self.page_url, MAX_PAGE_URL_LEN);
    }

    /// The only hard validation: an email must be present and contain '@'.
    pub fn has_valid_email(&self) -> bool {
        self.email.as_deref().is_some_and(|email| email.contains('@'))
    }
}

fn truncate_chars(field: &mut Option<String>, max_chars: usize) {
    if let Some(value) = field {
        if let Some((idx, _)) = value.char_indices().nth(max_chars) {
            value.truncate(idx);
        }
    }
}

/// Per-branch outcome of the notification fan-out. The two flags are
/// independent; a degraded provider never fails the request as a whole.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchResult {
    pub email: bool,
    pub hubspot: bool,
}
