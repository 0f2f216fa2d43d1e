use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    response::{
        sse::{Event, KeepAlive},
        Sse,
    },
    Json,
};
use tokio_stream::wrappers::WatchStream;
use tokio_stream::{Stream, StreamExt};

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::app::dtos::{DraftUpdateDto, SelectRoleDto, SelectTabDto};
use crate::features::app::models::AppSnapshot;
use crate::features::app::services::AppShellHandle;
use crate::features::app::state::Intent;
use crate::shared::types::ApiResponse;

/// Current app state
#[utoipa::path(
    get,
    path = "/api/app",
    responses(
        (status = 200, description = "Current app snapshot", body = ApiResponse<AppSnapshot>)
    ),
    tag = "app"
)]
pub async fn get_app(State(handle): State<AppShellHandle>) -> Json<ApiResponse<AppSnapshot>> {
    Json(ApiResponse::success(Some(handle.current()), None))
}

/// Switch the active tab
#[utoipa::path(
    put,
    path = "/api/app/tab",
    request_body = SelectTabDto,
    responses(
        (status = 200, description = "Tab switched", body = ApiResponse<AppSnapshot>),
        (status = 400, description = "Unknown tab"),
        (status = 503, description = "App runtime stopped")
    ),
    tag = "app"
)]
pub async fn select_tab(
    State(handle): State<AppShellHandle>,
    AppJson(dto): AppJson<SelectTabDto>,
) -> Result<Json<ApiResponse<AppSnapshot>>> {
    let snapshot = handle.dispatch(Intent::SelectTab(dto.tab)).await?;
    Ok(Json(ApiResponse::success(Some(snapshot), None)))
}

/// Switch the UI role. Only changes which controls are shown.
#[utoipa::path(
    put,
    path = "/api/app/role",
    request_body = SelectRoleDto,
    responses(
        (status = 200, description = "Role switched", body = ApiResponse<AppSnapshot>),
        (status = 400, description = "Unknown role"),
        (status = 503, description = "App runtime stopped")
    ),
    tag = "app"
)]
pub async fn select_role(
    State(handle): State<AppShellHandle>,
    AppJson(dto): AppJson<SelectRoleDto>,
) -> Result<Json<ApiResponse<AppSnapshot>>> {
    let snapshot = handle.dispatch(Intent::SelectRole(dto.role)).await?;
    Ok(Json(ApiResponse::success(Some(snapshot), None)))
}

/// Edit fields of the report draft
#[utoipa::path(
    patch,
    path = "/api/app/draft",
    request_body = DraftUpdateDto,
    responses(
        (status = 200, description = "Draft updated", body = ApiResponse<AppSnapshot>),
        (status = 400, description = "Invalid body"),
        (status = 503, description = "App runtime stopped")
    ),
    tag = "app"
)]
pub async fn update_draft(
    State(handle): State<AppShellHandle>,
    AppJson(dto): AppJson<DraftUpdateDto>,
) -> Result<Json<ApiResponse<AppSnapshot>>> {
    let mut snapshot = handle.current();
    for intent in dto.into_intents() {
        snapshot = handle.dispatch(intent).await?;
    }
    Ok(Json(ApiResponse::success(Some(snapshot), None)))
}

/// Submit the current draft.
///
/// Ignored while a submission is in flight or when description or location
/// is empty; the returned snapshot tells which happened.
#[utoipa::path(
    post,
    path = "/api/app/submit",
    responses(
        (status = 200, description = "Submit handled", body = ApiResponse<AppSnapshot>),
        (status = 503, description = "App runtime stopped")
    ),
    tag = "app"
)]
pub async fn submit_report(
    State(handle): State<AppShellHandle>,
) -> Result<Json<ApiResponse<AppSnapshot>>> {
    let snapshot = handle.dispatch(Intent::Submit).await?;
    let message = snapshot
        .form
        .submitting
        .then(|| "Submitting report".to_string());
    Ok(Json(ApiResponse::success(Some(snapshot), message)))
}

/// Mark a report resolved
#[utoipa::path(
    post,
    path = "/api/reports/{id}/resolve",
    params(
        ("id" = String, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Resolve handled", body = ApiResponse<AppSnapshot>),
        (status = 503, description = "App runtime stopped")
    ),
    tag = "reports"
)]
pub async fn resolve_report(
    State(handle): State<AppShellHandle>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<AppSnapshot>>> {
    let snapshot = handle.dispatch(Intent::Resolve(id)).await?;
    Ok(Json(ApiResponse::success(Some(snapshot), None)))
}

/// Retry anonymous sign-in after a failure
#[utoipa::path(
    post,
    path = "/api/session/retry",
    responses(
        (status = 200, description = "Retry handled", body = ApiResponse<AppSnapshot>),
        (status = 503, description = "App runtime stopped")
    ),
    tag = "session"
)]
pub async fn retry_sign_in(
    State(handle): State<AppShellHandle>,
) -> Result<Json<ApiResponse<AppSnapshot>>> {
    let snapshot = handle.dispatch(Intent::RetrySignIn).await?;
    Ok(Json(ApiResponse::success(Some(snapshot), None)))
}

/// Stream app snapshots as server-sent events.
///
/// Sends the current snapshot first, then one `snapshot` event per change.
#[utoipa::path(
    get,
    path = "/api/app/events",
    responses(
        (status = 200, description = "Stream of `snapshot` events (text/event-stream)")
    ),
    tag = "app"
)]
pub async fn app_events(
    State(handle): State<AppShellHandle>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let stream = WatchStream::new(handle.watch()).map(|snapshot| {
        let event = Event::default()
            .event("snapshot")
            .json_data(&snapshot)
            .unwrap_or_else(|e| {
                tracing::error!("Failed to serialize snapshot event: {}", e);
                Event::default().event("error").data("serialization failed")
            });
        Ok::<_, Infallible>(event)
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}
