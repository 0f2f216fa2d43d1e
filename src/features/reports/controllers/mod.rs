mod feed_controller;
mod form_controller;
mod resolution;

pub use feed_controller::FeedState;
pub use form_controller::ReportForm;
pub use resolution::{decide_resolution, ResolveDecision};
