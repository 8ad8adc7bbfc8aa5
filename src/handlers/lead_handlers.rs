use axum::{
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::models::lead_models::{DispatchResult, LeadSubmission};
use crate::AppState;

/// Lead intake endpoint. Validates and sanitizes the submission, then fans
/// out best-effort to email and CRM. Downstream failures are logged and
/// folded into the per-branch result flags; they never fail the request.
pub async fn notify_lead(
    State(state): State<Arc<AppState>>,
    method: Method,
    body: String,
) -> Response {
    if method != Method::POST {
        return (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed").into_response();
    }

    let mut lead: LeadSubmission = match serde_json::from_str(&body) {
        Ok(lead) => lead,
        Err(e) => {
            tracing::error!("Failed to parse lead submission: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response();
        }
    };

    lead.clamp_field_lengths();

    if !lead.has_valid_email() {
        return (StatusCode::BAD_REQUEST, "Invalid email").into_response();
    }

    let mut results = DispatchResult::default();

    if let Some(mailer) = &state.mailer {
        match mailer.send_lead_alert(&lead).await {
            Ok(()) => results.email = true,
            Err(e) => tracing::error!("Resend error: {}", e),
        }
    }

    if let Some(crm) = &state.crm {
        match crm.upsert_contact(&lead).await {
            Ok(action) => {
                results.hubspot = true;
                tracing::info!("HubSpot contact {:?}", action);
            }
            Err(e) => tracing::error!("HubSpot error: {}", e),
        }
    }

    (
        StatusCode::OK,
        Json(json!({ "success": true, "results": results })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::hubspot::{LeadCrm, MockLeadCrm, UpsertAction};
    use crate::api::resend::{LeadMailer, MockLeadMailer};
    use anyhow::anyhow;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn state_with(
        mailer: Option<MockLeadMailer>,
        crm: Option<MockLeadCrm>,
    ) -> Arc<AppState> {
        Arc::new(AppState {
            mailer: mailer.map(|m| Arc::new(m) as Arc<dyn LeadMailer>),
            crm: crm.map(|c| Arc::new(c) as Arc<dyn LeadCrm>),
        })
    }

    async fn response_parts(response: Response) -> (StatusCode, String) {
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn non_post_method_is_rejected_without_parsing() {
        // Mocks with no expectations panic if called.
        let state = state_with(Some(MockLeadMailer::new()), Some(MockLeadCrm::new()));
        let response = notify_lead(State(state), Method::GET, "not json".into()).await;

        let (status, body) = response_parts(response).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body, "Method not allowed");
    }

    #[tokio::test]
    async fn unparsable_body_returns_internal_error() {
        let state = state_with(Some(MockLeadMailer::new()), Some(MockLeadCrm::new()));
        let response = notify_lead(State(state), Method::POST, "{not json".into()).await;

        let (status, body) = response_parts(response).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Internal error");
    }

    #[tokio::test]
    async fn missing_email_returns_400_and_skips_fan_out() {
        let state = state_with(Some(MockLeadMailer::new()), Some(MockLeadCrm::new()));
        let body = json!({ "name": "Jo Smith" }).to_string();
        let response = notify_lead(State(state), Method::POST, body).await;

        let (status, body) = response_parts(response).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Invalid email");
    }

    #[tokio::test]
    async fn email_without_at_sign_returns_400() {
        let state = state_with(None, None);
        let body = json!({ "email": "not-an-email" }).to_string();
        let response = notify_lead(State(state), Method::POST, body).await;

        let (status, _) = response_parts(response).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn both_branches_succeeding_reports_both_true() {
        let mut mailer = MockLeadMailer::new();
        mailer
            .expect_send_lead_alert()
            .times(1)
            .returning(|_| Ok(()));
        let mut crm = MockLeadCrm::new();
        crm.expect_upsert_contact()
            .times(1)
            .returning(|_| Ok(UpsertAction::Created));

        let state = state_with(Some(mailer), Some(crm));
        let body = json!({
            "name": "Jo Smith",
            "email": "jo@x.com",
            "company": "Jo's Cafe",
            "interest": "demo",
            "type": "cafe-restaurant",
            "marketing_optin": true,
        })
        .to_string();
        let response = notify_lead(State(state), Method::POST, body).await;

        let (status, body) = response_parts(response).await;
        assert_eq!(status, StatusCode::OK);
        let payload: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(payload["success"], true);
        assert_eq!(payload["results"]["email"], true);
        assert_eq!(payload["results"]["hubspot"], true);
    }

    #[tokio::test]
    async fn email_failure_does_not_block_crm_or_the_request() {
        let mut mailer = MockLeadMailer::new();
        mailer
            .expect_send_lead_alert()
            .times(1)
            .returning(|_| Err(anyhow!("provider down")));
        let mut crm = MockLeadCrm::new();
        crm.expect_upsert_contact()
            .times(1)
            .returning(|_| Ok(UpsertAction::Updated));

        let state = state_with(Some(mailer), Some(crm));
        let body = json!({ "email": "jo@x.com" }).to_string();
        let response = notify_lead(State(state), Method::POST, body).await;

        let (status, body) = response_parts(response).await;
        assert_eq!(status, StatusCode::OK);
        let payload: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(payload["results"]["email"], false);
        assert_eq!(payload["results"]["hubspot"], true);
    }

    #[tokio::test]
    async fn crm_failure_still_returns_success() {
        let mut crm = MockLeadCrm::new();
        crm.expect_upsert_contact()
            .times(1)
            .returning(|_| Err(anyhow!("search 500")));

        let state = state_with(None, Some(crm));
        let body = json!({ "email": "jo@x.com" }).to_string();
        let response = notify_lead(State(state), Method::POST, body).await;

        let (status, body) = response_parts(response).await;
        assert_eq!(status, StatusCode::OK);
        let payload: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(payload["results"]["email"], false);
        assert_eq!(payload["results"]["hubspot"], false);
    }

    #[tokio::test]
    async fn unconfigured_providers_leave_both_flags_false() {
        let state = state_with(None, None);
        let body = json!({ "email": "jo@x.com" }).to_string();
        let response = notify_lead(State(state), Method::POST, body).await;

        let (status, body) = response_parts(response).await;
        assert_eq!(status, StatusCode::OK);
        let payload: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(payload["success"], true);
        assert_eq!(payload["results"]["email"], false);
        assert_eq!(payload["results"]["hubspot"], false);
    }

    #[tokio::test]
    async fn fan_out_sees_length_clamped_fields() {
        let mut crm = MockLeadCrm::new();
        crm.expect_upsert_contact()
            .times(1)
            .withf(|lead| {
                lead.name.as_deref().map(|n| n.chars().count()) == Some(100)
                    && lead.message.as_deref().map(|m| m.chars().count()) == Some(2000)
            })
            .returning(|_| Ok(UpsertAction::Created));

        let state = state_with(None, Some(crm));
        let body = json!({
            "email": "jo@x.com",
            "name": "n".repeat(150),
            "message": "m".repeat(3000),
        })
        .to_string();
        let response = notify_lead(State(state), Method::POST, body).await;

        let (status, _) = response_parts(response).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn router_rejects_get_on_notify_lead() {
        let state = state_with(None, None);
        let app = crate::app(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/notify-lead")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
