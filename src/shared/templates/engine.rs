use minijinja::{AutoEscape, Environment};
use serde::Serialize;
use std::sync::OnceLock;
use thiserror::Error;

/// Global template environment
static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

/// Templates compiled into the binary, keyed by their path under `templates/`
const TEMPLATES: &[(&str, &str)] = &[
    (
        "app/layout.jinja",
        include_str!("../../../templates/app/layout.jinja"),
    ),
    (
        "app/loading.jinja",
        include_str!("../../../templates/app/loading.jinja"),
    ),
    (
        "app/home.jinja",
        include_str!("../../../templates/app/home.jinja"),
    ),
    (
        "app/report.jinja",
        include_str!("../../../templates/app/report.jinja"),
    ),
    (
        "app/feed.jinja",
        include_str!("../../../templates/app/feed.jinja"),
    ),
];

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template '{0}' not found")]
    NotFound(String),

    #[error("Failed to render template: {0}")]
    RenderError(String),
}

fn init_environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::Html);

    for &(name, source) in TEMPLATES {
        if let Err(e) = env.add_template(name, source) {
            tracing::warn!("Failed to load template {}: {}", name, e);
        } else {
            tracing::debug!("Loaded template: {}", name);
        }
    }

    env
}

fn get_environment() -> &'static Environment<'static> {
    TEMPLATE_ENV.get_or_init(init_environment)
}

/// Render a template with any serializable context
pub fn render_template<S: Serialize>(
    template_name: &str,
    ctx: &S,
) -> Result<String, TemplateError> {
    let template = get_environment()
        .get_template(template_name)
        .map_err(|_| TemplateError::NotFound(template_name.to_string()))?;

    template
        .render(ctx)
        .map_err(|e| TemplateError::RenderError(e.to_string()))
}

#[cfg(test)]
pub fn template_exists(template_name: &str) -> bool {
    get_environment().get_template(template_name).is_ok()
}
