//! App state: the session, feed, form, and navigation controllers composed
//! into one value with a single pure transition function.
//!
//! `AppState::handle` consumes an `AppEvent` and returns the `Effect`s the
//! runtime must perform against the identity provider and the report store.
//! Nothing in here performs I/O, so every flow can be driven in tests by
//! feeding events directly.

use crate::features::app::models::{AppSnapshot, FormView, ReportCard, Role, Screen, Tab};
use crate::features::reports::controllers::{
    decide_resolution, FeedState, ReportForm, ResolveDecision,
};
use crate::features::reports::models::{DraftField, NewReport, Report, ReportId};
use crate::features::session::models::Identity;
use crate::features::session::{SessionChange, SessionState};
use crate::shared::constants::REPORT_CATEGORIES;

/// User actions coming from the view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    SelectTab(Tab),
    SelectRole(Role),
    EditDraft(DraftField, String),
    Submit,
    Resolve(ReportId),
    RetrySignIn,
}

/// Everything that can change app state
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    Started,
    Intent(Intent),
    IdentityChanged(Option<Identity>),
    SignInFailed(String),
    Snapshot(Vec<Report>),
    ReportCreated(ReportId),
    CreateFailed(String),
    ReportResolved(ReportId),
    ResolveFailed { id: ReportId, message: String },
    SuccessWindowElapsed,
}

/// Work for the runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SignIn,
    OpenFeed,
    CloseFeed,
    CreateReport(NewReport),
    ArmSuccessTimer,
    ResolveReport(ReportId),
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    session: SessionState,
    feed: FeedState,
    form: ReportForm,
    tab: Tab,
    role: Role,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&mut self, event: AppEvent) -> Vec<Effect> {
        match event {
            AppEvent::Started => vec![Effect::SignIn],
            AppEvent::Intent(intent) => self.handle_intent(intent),
            AppEvent::IdentityChanged(identity) => self.identity_changed(identity),
            AppEvent::SignInFailed(message) => {
                self.session.sign_in_failed(message);
                vec![]
            }
            AppEvent::Snapshot(reports) => {
                if !self.feed.apply_snapshot(reports) {
                    tracing::debug!("Dropped snapshot delivered while feed is closed");
                }
                vec![]
            }
            AppEvent::ReportCreated(id) => {
                tracing::debug!("Report {} created, showing confirmation", id);
                self.form.submit_succeeded();
                vec![Effect::ArmSuccessTimer]
            }
            AppEvent::CreateFailed(_) => {
                self.form.submit_failed();
                vec![]
            }
            AppEvent::ReportResolved(id) => {
                tracing::debug!("Report {} resolved", id);
                vec![]
            }
            AppEvent::ResolveFailed { .. } => vec![],
            AppEvent::SuccessWindowElapsed => {
                if self.form.success_window_elapsed() {
                    self.tab = Tab::View;
                }
                vec![]
            }
        }
    }

    fn handle_intent(&mut self, intent: Intent) -> Vec<Effect> {
        match intent {
            Intent::SelectTab(tab) => {
                if self.tab == Tab::Report && tab != Tab::Report {
                    self.form.discard_draft();
                }
                self.tab = tab;
                vec![]
            }
            Intent::SelectRole(role) => {
                self.role = role;
                vec![]
            }
            Intent::EditDraft(field, value) => {
                self.form.edit(field, value);
                vec![]
            }
            Intent::Submit => match self.form.begin_submit() {
                Some(report) => vec![Effect::CreateReport(report)],
                None => vec![],
            },
            Intent::Resolve(id) => {
                if self.role == Role::Citizen {
                    tracing::warn!(
                        "Resolve of report {} requested while role is citizen; role is not enforced",
                        id
                    );
                }
                match decide_resolution(&self.feed, &id) {
                    ResolveDecision::Issue(id) => vec![Effect::ResolveReport(id)],
                    ResolveDecision::AlreadyResolved => {
                        tracing::debug!("Report {} already resolved, skipping update", id);
                        vec![]
                    }
                }
            }
            Intent::RetrySignIn => {
                if self.session.begin_retry() {
                    vec![Effect::SignIn]
                } else {
                    vec![]
                }
            }
        }
    }

    fn identity_changed(&mut self, identity: Option<Identity>) -> Vec<Effect> {
        match self.session.identity_changed(identity) {
            SessionChange::Started => {
                self.feed.open();
                vec![Effect::OpenFeed]
            }
            SessionChange::Switched => {
                self.feed.close();
                self.feed.open();
                vec![Effect::CloseFeed, Effect::OpenFeed]
            }
            SessionChange::Ended => {
                self.feed.close();
                vec![Effect::CloseFeed]
            }
            SessionChange::Unchanged => vec![],
        }
    }

    /// Project the current state into what the view renders
    pub fn snapshot(&self) -> AppSnapshot {
        let loading = self.session.is_loading();
        let screen = if loading {
            Screen::Loading
        } else {
            match self.tab {
                Tab::Home => Screen::Home,
                Tab::Report => Screen::Report,
                Tab::View => Screen::View,
            }
        };

        let draft = self.form.draft();
        let reports = self
            .feed
            .reports()
            .iter()
            .map(|report| ReportCard {
                can_resolve: self.role == Role::Official && report.is_pending(),
                report: report.clone(),
            })
            .collect();

        AppSnapshot {
            screen,
            tab: self.tab,
            role: self.role,
            heading: self.role.heading().to_string(),
            loading,
            identity: self.session.identity().cloned(),
            sign_in_error: self.session.sign_in_error().map(String::from),
            form: FormView {
                description: draft.description.clone(),
                location: draft.location.clone(),
                category: draft.category.clone(),
                categories: REPORT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
                submitting: self.form.is_submitting(),
                show_success: self.form.is_showing_success(),
            },
            reports,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::reports::models::{ReportDraft, ReportStatus};
    use crate::shared::test_helpers::report_at;

    fn signed_in() -> AppState {
        let mut state = AppState::new();
        state.handle(AppEvent::Started);
        state.handle(AppEvent::IdentityChanged(Some(Identity::anonymous("u1"))));
        state
    }

    fn fill_draft(state: &mut AppState, description: &str, location: &str) {
        state.handle(AppEvent::Intent(Intent::EditDraft(
            DraftField::Description,
            description.to_string(),
        )));
        state.handle(AppEvent::Intent(Intent::EditDraft(
            DraftField::Location,
            location.to_string(),
        )));
    }

    #[test]
    fn test_start_signs_in_and_loads() {
        let mut state = AppState::new();
        assert_eq!(state.handle(AppEvent::Started), vec![Effect::SignIn]);
        assert_eq!(state.snapshot().screen, Screen::Loading);

        let effects = state.handle(AppEvent::IdentityChanged(Some(Identity::anonymous("u1"))));

        assert_eq!(effects, vec![Effect::OpenFeed]);
        assert_eq!(state.snapshot().screen, Screen::Home);
    }

    #[test]
    fn test_null_identity_clears_loading_without_feed() {
        let mut state = AppState::new();
        state.handle(AppEvent::Started);

        let effects = state.handle(AppEvent::IdentityChanged(None));

        assert!(effects.is_empty());
        assert!(!state.snapshot().loading);
        assert!(!state.feed.apply_snapshot(Vec::new()));
    }

    #[test]
    fn test_session_end_and_switch_manage_feed() {
        let mut state = signed_in();
        state.handle(AppEvent::Snapshot(vec![report_at("a", Some(1))]));

        assert_eq!(
            state.handle(AppEvent::IdentityChanged(Some(Identity::anonymous("u2")))),
            vec![Effect::CloseFeed, Effect::OpenFeed]
        );
        assert!(state.feed.reports().is_empty());

        assert_eq!(
            state.handle(AppEvent::IdentityChanged(None)),
            vec![Effect::CloseFeed]
        );
        assert!(!state.feed.apply_snapshot(Vec::new()));
    }

    #[test]
    fn test_submit_with_empty_field_issues_nothing() {
        let mut state = signed_in();
        fill_draft(&mut state, "Pothole on Main St", "");

        assert!(state.handle(AppEvent::Intent(Intent::Submit)).is_empty());
        assert!(!state.form.is_submitting());
    }

    #[test]
    fn test_successful_submission_flow() {
        let mut state = signed_in();
        state.handle(AppEvent::Intent(Intent::SelectTab(Tab::Report)));
        fill_draft(&mut state, "Pothole on Main St", "Main St & 5th");

        let effects = state.handle(AppEvent::Intent(Intent::Submit));
        assert_eq!(
            effects,
            vec![Effect::CreateReport(NewReport::pending(
                "Pothole on Main St".to_string(),
                "Main St & 5th".to_string(),
                "Infrastructure".to_string(),
            ))]
        );

        assert_eq!(
            state.handle(AppEvent::ReportCreated("r1".to_string())),
            vec![Effect::ArmSuccessTimer]
        );
        assert_eq!(state.form.draft(), &ReportDraft::default());
        assert!(state.snapshot().form.show_success);
        assert_eq!(state.tab, Tab::Report);

        state.handle(AppEvent::SuccessWindowElapsed);

        assert_eq!(state.tab, Tab::View);
        assert!(!state.form.is_submitting());
        assert!(!state.form.is_showing_success());
    }

    #[test]
    fn test_failed_submission_keeps_draft_and_tab() {
        let mut state = signed_in();
        state.handle(AppEvent::Intent(Intent::SelectTab(Tab::Report)));
        fill_draft(&mut state, "Broken bench", "Park");
        state.handle(AppEvent::Intent(Intent::Submit));

        state.handle(AppEvent::CreateFailed("permission denied".to_string()));

        assert_eq!(state.tab, Tab::Report);
        assert!(!state.form.is_submitting());
        assert_eq!(state.form.draft().description, "Broken bench");
        assert_eq!(state.form.draft().location, "Park");
    }

    #[test]
    fn test_leaving_form_discards_draft() {
        let mut state = signed_in();
        state.handle(AppEvent::Intent(Intent::SelectTab(Tab::Report)));
        fill_draft(&mut state, "Broken bench", "Park");

        state.handle(AppEvent::Intent(Intent::SelectTab(Tab::Home)));

        assert_eq!(state.form.draft(), &ReportDraft::default());
    }

    #[test]
    fn test_resolve_gating_is_display_only() {
        let mut state = signed_in();
        state.handle(AppEvent::Snapshot(vec![report_at("abc123", Some(1))]));
        assert!(!state.snapshot().reports[0].can_resolve);

        // Citizens are not stopped from invoking the action directly
        assert_eq!(
            state.handle(AppEvent::Intent(Intent::Resolve("abc123".to_string()))),
            vec![Effect::ResolveReport("abc123".to_string())]
        );

        state.handle(AppEvent::Intent(Intent::SelectRole(Role::Official)));
        let snapshot = state.snapshot();
        assert!(snapshot.reports[0].can_resolve);
        assert_eq!(snapshot.heading, "Manage Issues");
    }

    #[test]
    fn test_resolve_on_resolved_is_noop() {
        let mut state = signed_in();
        let mut resolved = report_at("abc123", Some(1));
        resolved.status = ReportStatus::Resolved;
        state.handle(AppEvent::Snapshot(vec![resolved]));
        state.handle(AppEvent::Intent(Intent::SelectRole(Role::Official)));

        assert!(state
            .handle(AppEvent::Intent(Intent::Resolve("abc123".to_string())))
            .is_empty());
        assert!(!state.snapshot().reports[0].can_resolve);
    }

    #[test]
    fn test_retry_after_sign_in_failure() {
        let mut state = AppState::new();
        state.handle(AppEvent::Started);
        state.handle(AppEvent::IdentityChanged(None));
        state.handle(AppEvent::SignInFailed("offline".to_string()));
        assert_eq!(state.snapshot().sign_in_error.as_deref(), Some("offline"));

        assert_eq!(
            state.handle(AppEvent::Intent(Intent::RetrySignIn)),
            vec![Effect::SignIn]
        );
        assert!(state.snapshot().sign_in_error.is_none());
    }
}
