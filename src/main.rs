use axum::{
    routing::{any, get},
    Router,
};
use dotenvy::dotenv;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

mod handlers {
    pub mod lead_handlers;
}
mod api {
    pub mod hubspot;
    pub mod resend;
}
mod models {
    pub mod lead_models;
}
mod utils {
    pub mod email_template;
}

use api::hubspot::{HubSpotCrm, LeadCrm};
use api::resend::{LeadMailer, ResendMailer};
use handlers::lead_handlers;

async fn health_check() -> &'static str {
    "OK"
}

/// Provider ports for the lead fan-out. A branch whose credential is not
/// configured stays None and is skipped, leaving its result flag false.
pub struct AppState {
    pub mailer: Option<Arc<dyn LeadMailer>>,
    pub crm: Option<Arc<dyn LeadCrm>>,
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/notify-lead", any(lead_handlers::notify_lead))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(
            CorsLayer::new()
                .allow_methods([axum::http::Method::POST, axum::http::Method::OPTIONS])
                .allow_origin(Any)
                .allow_headers([axum::http::header::CONTENT_TYPE]),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let mailer = ResendMailer::from_env()
        .map(|mailer| Arc::new(mailer) as Arc<dyn LeadMailer>);
    if mailer.is_none() {
        tracing::warn!("RESEND_API_KEY not set; email notifications disabled");
    }

    let crm = HubSpotCrm::from_env().map(|crm| Arc::new(crm) as Arc<dyn LeadCrm>);
    if crm.is_none() {
        tracing::warn!("HUBSPOT_API_KEY not set; HubSpot sync disabled");
    }

    let state = Arc::new(AppState { mailer, crm });
    let app = app(state);

    use tokio::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:3000").await.unwrap();
    axum::serve(listener, app.into_make_service()).await.unwrap();
}
