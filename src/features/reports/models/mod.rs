mod report;
mod report_draft;

pub use report::{NewReport, Report, ReportId, ReportPatch, ReportStatus};
pub use report_draft::{DraftField, ReportDraft};
