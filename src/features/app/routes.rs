use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::features::app::handlers;
use crate::features::app::services::AppShellHandle;

/// Create routes for the app: HTML pages plus the JSON/SSE API
pub fn routes(handle: AppShellHandle) -> Router {
    Router::new()
        // HTML pages; every form post redirects back to `/`
        .route("/", get(handlers::index))
        .route("/tab", post(handlers::select_tab_form))
        .route("/role", post(handlers::select_role_form))
        .route("/report", post(handlers::submit_report_form))
        .route("/reports/{id}/resolve", post(handlers::resolve_report_form))
        .route("/session/retry", post(handlers::retry_sign_in_form))
        // JSON API
        .route("/api/app", get(handlers::get_app))
        .route("/api/app/tab", put(handlers::select_tab))
        .route("/api/app/role", put(handlers::select_role))
        .route("/api/app/draft", patch(handlers::update_draft))
        .route("/api/app/submit", post(handlers::submit_report))
        .route("/api/app/events", get(handlers::app_events))
        .route("/api/reports/{id}/resolve", post(handlers::resolve_report))
        .route("/api/session/retry", post(handlers::retry_sign_in))
        .with_state(handle)
}
