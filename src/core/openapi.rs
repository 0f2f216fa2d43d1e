use utoipa::{Modify, OpenApi};

use crate::features::app::{dtos as app_dtos, handlers as app_handlers, models as app_models};
use crate::features::reports::models as reports_models;
use crate::features::session::models as session_models;
use crate::shared::types::ApiResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        // App
        app_handlers::get_app,
        app_handlers::select_tab,
        app_handlers::select_role,
        app_handlers::update_draft,
        app_handlers::submit_report,
        app_handlers::app_events,
        // Reports
        app_handlers::resolve_report,
        // Session
        app_handlers::retry_sign_in,
    ),
    components(
        schemas(
            // App
            app_models::AppSnapshot,
            app_models::Screen,
            app_models::Tab,
            app_models::Role,
            app_models::FormView,
            app_models::ReportCard,
            app_dtos::SelectTabDto,
            app_dtos::SelectRoleDto,
            app_dtos::DraftUpdateDto,
            // Reports
            reports_models::Report,
            reports_models::ReportStatus,
            // Session
            session_models::Identity,
            // Envelope
            ApiResponse<app_models::AppSnapshot>,
        )
    ),
    tags(
        (name = "app", description = "Navigation, role, report form and live snapshot stream"),
        (name = "reports", description = "Actions on reports in the feed"),
        (name = "session", description = "Anonymous session"),
    ),
    info(
        title = "CivicEye API",
        version = "0.1.0",
        description = "Citizen issue reporting client",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
