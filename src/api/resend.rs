use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::env;

use crate::models::lead_models::LeadSubmission;
use crate::utils::email_template::{build_email_html, format_interest};

pub const RESEND_API_URL: &str = "https://api.resend.com";

const FROM_ADDRESS: &str = "Data Jam Leads <leads@data-jam.com>";
const NOTIFY_EMAILS: [&str; 2] = ["arran@data-jam.com", "rhea@data-jam.com"];

/// Outbound email side of the lead fan-out. Mocked in handler tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LeadMailer: Send + Sync {
    async fn send_lead_alert(&self, lead: &LeadSubmission) -> Result<()>;
}

pub struct ResendMailer {
    client: Client,
    api_key: String,
    base_url: String,
}

impl ResendMailer {
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url,
        }
    }

    /// Returns None when RESEND_API_KEY is unset, which disables the email
    /// branch without failing startup.
    pub fn from_env() -> Option<Self> {
        env::var("RESEND_API_KEY")
            .ok()
            .map(|key| Self::new(key, RESEND_API_URL.to_string()))
    }
}

fn lead_subject(lead: &LeadSubmission) -> String {
    format!(
        "[RETAIL] New Lead: {} - {}",
        lead.name.as_deref().unwrap_or("-"),
        format_interest(lead.interest.as_deref())
    )
}

#[async_trait]
impl LeadMailer for ResendMailer {
    async fn send_lead_alert(&self, lead: &LeadSubmission) -> Result<()> {
        let response = self
            .client
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "from": FROM_ADDRESS,
                "to": NOTIFY_EMAILS,
                "subject": lead_subject(lead),
                "html": build_email_html(lead),
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Resend returned {}: {}", status, body));
        }
        Ok(())
    }
}
