use crate::features::session::models::Identity;

/// What an identity event did to the session, as seen by downstream controllers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionChange {
    /// An identity appeared where there was none
    Started,
    /// The identity was replaced by a different one
    Switched,
    /// The identity went away
    Ended,
    /// Same identity (or still none)
    Unchanged,
}

/// Session controller state: the current identity plus the loading flag that
/// holds until the first identity event arrives.
#[derive(Debug, Clone)]
pub struct SessionState {
    identity: Option<Identity>,
    loading: bool,
    sign_in_error: Option<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            identity: None,
            loading: true,
            sign_in_error: None,
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn sign_in_error(&self) -> Option<&str> {
        self.sign_in_error.as_deref()
    }

    /// Apply an identity event. Any event, including `None`, clears loading.
    pub fn identity_changed(&mut self, identity: Option<Identity>) -> SessionChange {
        self.loading = false;

        let change = match (&self.identity, &identity) {
            (None, Some(_)) => SessionChange::Started,
            (Some(_), None) => SessionChange::Ended,
            (Some(current), Some(next)) if current.uid != next.uid => SessionChange::Switched,
            _ => SessionChange::Unchanged,
        };

        if identity.is_some() {
            self.sign_in_error = None;
        }
        self.identity = identity;

        change
    }

    /// Record a failed anonymous sign-in. The session stays without identity.
    pub fn sign_in_failed(&mut self, message: String) {
        self.sign_in_error = Some(message);
    }

    /// Whether a manual sign-in retry makes sense, clearing the recorded failure if so
    pub fn begin_retry(&mut self) -> bool {
        if self.identity.is_some() {
            return false;
        }
        self.sign_in_error = None;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_until_first_event() {
        let mut session = SessionState::new();
        assert!(session.is_loading());

        let change = session.identity_changed(None);

        assert_eq!(change, SessionChange::Unchanged);
        assert!(!session.is_loading());
        assert!(session.identity().is_none());
    }

    #[test]
    fn test_identity_transitions() {
        let mut session = SessionState::new();

        assert_eq!(
            session.identity_changed(Some(Identity::anonymous("u1"))),
            SessionChange::Started
        );
        assert_eq!(
            session.identity_changed(Some(Identity::anonymous("u1"))),
            SessionChange::Unchanged
        );
        assert_eq!(
            session.identity_changed(Some(Identity::anonymous("u2"))),
            SessionChange::Switched
        );
        assert_eq!(session.identity_changed(None), SessionChange::Ended);
    }

    #[test]
    fn test_sign_in_failure_and_retry() {
        let mut session = SessionState::new();
        session.identity_changed(None);
        session.sign_in_failed("network down".to_string());
        assert_eq!(session.sign_in_error(), Some("network down"));

        assert!(session.begin_retry());
        assert!(session.sign_in_error().is_none());

        session.identity_changed(Some(Identity::anonymous("u1")));
        assert!(!session.begin_retry());
    }
}
