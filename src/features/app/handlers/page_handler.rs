use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
};

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppForm;
use crate::features::app::dtos::{ReportFormDto, SelectRoleDto, SelectTabDto};
use crate::features::app::services::AppShellHandle;
use crate::features::app::state::Intent;
use crate::shared::templates::render_template;

/// Render the screen for the current state
pub async fn index(State(handle): State<AppShellHandle>) -> Result<Html<String>> {
    let snapshot = handle.current();
    let html = render_template(snapshot.screen.template_name(), &snapshot).map_err(|e| {
        tracing::error!("Failed to render {:?} screen: {}", snapshot.screen, e);
        AppError::Internal(e.to_string())
    })?;
    Ok(Html(html))
}

pub async fn select_tab_form(
    State(handle): State<AppShellHandle>,
    AppForm(dto): AppForm<SelectTabDto>,
) -> Result<Redirect> {
    handle.dispatch(Intent::SelectTab(dto.tab)).await?;
    Ok(Redirect::to("/"))
}

pub async fn select_role_form(
    State(handle): State<AppShellHandle>,
    AppForm(dto): AppForm<SelectRoleDto>,
) -> Result<Redirect> {
    handle.dispatch(Intent::SelectRole(dto.role)).await?;
    Ok(Redirect::to("/"))
}

/// Copy the posted fields into the draft, then submit it
pub async fn submit_report_form(
    State(handle): State<AppShellHandle>,
    AppForm(dto): AppForm<ReportFormDto>,
) -> Result<Redirect> {
    for intent in dto.into_intents() {
        handle.dispatch(intent).await?;
    }
    Ok(Redirect::to("/"))
}

pub async fn resolve_report_form(
    State(handle): State<AppShellHandle>,
    Path(id): Path<String>,
) -> Result<Redirect> {
    handle.dispatch(Intent::Resolve(id)).await?;
    Ok(Redirect::to("/"))
}

pub async fn retry_sign_in_form(State(handle): State<AppShellHandle>) -> Result<Redirect> {
    handle.dispatch(Intent::RetrySignIn).await?;
    Ok(Redirect::to("/"))
}
