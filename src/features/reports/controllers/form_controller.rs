use crate::features::reports::models::{DraftField, NewReport, ReportDraft};

/// Report form controller: the draft plus the in-flight and success flags.
///
/// Flow: `begin_submit` -> (`submit_succeeded` -> `success_window_elapsed`)
/// or `submit_failed`. The in-flight flag stays set through the success
/// window and is only cleared when the window elapses.
#[derive(Debug, Clone, Default)]
pub struct ReportForm {
    draft: ReportDraft,
    submitting: bool,
    show_success: bool,
}

impl ReportForm {
    pub fn draft(&self) -> &ReportDraft {
        &self.draft
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn is_showing_success(&self) -> bool {
        self.show_success
    }

    pub fn edit(&mut self, field: DraftField, value: String) {
        self.draft.set(field, value);
    }

    /// Start a submission. Returns the record to create, or `None` when a
    /// required field is empty or a submission is already in flight.
    pub fn begin_submit(&mut self) -> Option<NewReport> {
        if self.submitting || !self.draft.is_submittable() {
            return None;
        }
        self.submitting = true;
        Some(self.draft.to_new_report())
    }

    pub fn submit_succeeded(&mut self) {
        self.show_success = true;
        self.draft = ReportDraft::default();
    }

    /// The draft is kept so the user can retry by hand
    pub fn submit_failed(&mut self) {
        self.submitting = false;
    }

    /// Close the success window. Returns whether a window was open.
    pub fn success_window_elapsed(&mut self) -> bool {
        if !self.show_success {
            return false;
        }
        self.show_success = false;
        self.submitting = false;
        true
    }

    /// Drop the draft when leaving the form, unless it is being submitted
    pub fn discard_draft(&mut self) {
        if !self.submitting {
            self.draft = ReportDraft::default();
        }
    }
}
