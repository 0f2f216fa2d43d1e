//! Server-side HTML views.
//!
//! Pages are Jinja2 templates under `templates/app/`, compiled into the
//! binary and rendered with HTML auto-escaping.

pub mod engine;

pub use engine::render_template;
