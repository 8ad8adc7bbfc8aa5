use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::env;

use crate::models::lead_models::LeadSubmission;

pub const HUBSPOT_API_URL: &str = "https://api.hubapi.com";

const LEAD_SOURCE: &str = "retail-website";

/// What the upsert ended up doing, for operator logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertAction {
    Created,
    Updated,
}

/// CRM side of the lead fan-out. Mocked in handler tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LeadCrm: Send + Sync {
    async fn upsert_contact(&self, lead: &LeadSubmission) -> Result<UpsertAction>;
}

pub struct HubSpotCrm {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Deserialize)]
struct ContactSearchResponse {
    #[serde(default)]
    results: Vec<ContactRecord>,
}

#[derive(Deserialize)]
struct ContactRecord {
    id: String,
}

impl HubSpotCrm {
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url,
        }
    }

    /// Returns None when HUBSPOT_API_KEY is unset, which disables the CRM
    /// branch without failing startup.
    pub fn from_env() -> Option<Self> {
        env::var("HUBSPOT_API_KEY")
            .ok()
            .map(|key| Self::new(key, HUBSPOT_API_URL.to_string()))
    }

    async fn find_contact_by_email(&self, email: &str) -> Result<Option<String>> {
        let response = self
            .client
            .post(format!("{}/crm/v3/objects/contacts/search", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "filterGroups": [{
                    "filters": [{
                        "propertyName": "email",
                        "operator": "EQ",
                        "value": email,
                    }]
                }]
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("HubSpot search returned {}: {}", status, body));
        }

        let search: ContactSearchResponse = response.json().await?;
        Ok(search.results.into_iter().next().map(|contact| contact.id))
    }
}

#[async_trait]
impl LeadCrm for HubSpotCrm {
    async fn upsert_contact(&self, lead: &LeadSubmission) -> Result<UpsertAction> {
        let email = lead.email.as_deref().unwrap_or_default();
        let properties = contact_properties(lead);

        // Check-then-act: two concurrent submissions for the same email can
        // both miss here and create duplicate contacts. Known limitation.
        let existing_id = self.find_contact_by_email(email).await?;

        let (request, action) = match existing_id {
            Some(id) => (
                self.client
                    .patch(format!("{}/crm/v3/objects/contacts/{}", self.base_url, id)),
                UpsertAction::Updated,
            ),
            None => (
                self.client
                    .post(format!("{}/crm/v3/objects/contacts", self.base_url)),
                UpsertAction::Created,
            ),
        };

        let response = request
            .bearer_auth(&self.api_key)
            .json(&json!({ "properties": properties }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("HubSpot upsert returned {}: {}", status, body));
        }
        Ok(action)
    }
}

/// First space splits first name from the rest; a single token is all
/// first name.
fn split_name(name: Option<&str>) -> (String, String) {
    match name {
        Some(full) => match full.split_once(' ') {
            Some((first, rest)) => (first.to_string(), rest.to_string()),
            None => (full.to_string(), String::new()),
        },
        None => (String::new(), String::new()),
    }
}

fn contact_properties(lead: &LeadSubmission) -> Value {
    let (firstname, lastname) = split_name(lead.name.as_deref());
    let mut properties = json!({
        "email": lead.email.as_deref().unwrap_or_default(),
        "firstname": firstname,
        "lastname": lastname,
        "company": lead.company.as_deref().unwrap_or_default(),
        "lifecyclestage": "lead",
        "hs_lead_status": "NEW",
        "lead_source": LEAD_SOURCE,
    });

    // Tri-state: the property is only written for an explicit boolean.
    if let Some(optin) = lead.marketing_optin {
        properties["marketing_opt_in"] = Value::String(optin.to_string());
    }
    properties
}
