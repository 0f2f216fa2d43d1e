mod navigation;
mod view;

pub use navigation::{Role, Tab};
pub use view::{AppSnapshot, FormView, ReportCard, Screen};
