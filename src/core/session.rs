//! Session state: who is signed in and the transient notice flags the front
//! end renders after each auth-affecting intent.

use crate::api::Identity;

/// The observable phase of the session, derived from the state fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    Anonymous,
    Authenticating,
    Authenticated,
    AuthFailed,
}

/// Invariant: `success == true` implies `error == None`. Every mutator below
/// maintains it; there is no way to set both at once.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub identity: Option<Identity>,
    pub loading: bool,
    pub error: Option<String>,
    pub success: bool,
    pub message: String,
}

impl SessionState {
    /// Seed the session from whatever the store held at startup.
    pub fn restored(identity: Option<Identity>) -> Self {
        Self {
            identity,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> AuthPhase {
        if self.loading {
            AuthPhase::Authenticating
        } else if self.identity.is_some() {
            AuthPhase::Authenticated
        } else if self.error.is_some() {
            AuthPhase::AuthFailed
        } else {
            AuthPhase::Anonymous
        }
    }

    /// Entering an auth attempt clears the previous outcome.
    pub fn begin_auth(&mut self) {
        self.loading = true;
        self.error = None;
        self.success = false;
        self.message.clear();
    }

    pub fn auth_succeeded(&mut self, identity: Identity, message: Option<String>) {
        self.loading = false;
        self.success = true;
        self.error = None;
        self.message = message.unwrap_or_else(|| "Login successful!".to_string());
        self.identity = Some(identity);
    }

    /// A completed signup leaves the session anonymous but flags success so
    /// the front end can steer toward login.
    pub fn register_succeeded(&mut self, message: Option<String>) {
        self.loading = false;
        self.success = true;
        self.error = None;
        if let Some(message) = message {
            self.message = message;
        }
    }

    pub fn auth_failed(&mut self, error: String) {
        self.loading = false;
        self.success = false;
        self.identity = None;
        self.error = Some(error);
    }

    /// Mark the start of a non-auth request that reports through the shared
    /// loading/error flags (sending a message does).
    pub fn begin_request(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub fn request_finished(&mut self) {
        self.loading = false;
    }

    /// Record a failure that does not affect who is signed in.
    pub fn note_error(&mut self, error: String) {
        self.success = false;
        self.error = Some(error);
    }

    pub fn signed_out(&mut self) {
        self.identity = None;
    }

    /// Reset the notice flags; idempotent, callable in any phase.
    pub fn clear_notice(&mut self) {
        self.message.clear();
        self.error = None;
        self.success = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity {
            id: "u1".to_string(),
            full_name: "Alice".to_string(),
            username: "alice".to_string(),
            gender: None,
            profile_photo: None,
            token: None,
        }
    }

    #[test]
    fn phases_follow_the_transition_table() {
        let mut state = SessionState::default();
        assert_eq!(state.phase(), AuthPhase::Anonymous);

        state.begin_auth();
        assert_eq!(state.phase(), AuthPhase::Authenticating);

        state.auth_failed("Login failed.".to_string());
        assert_eq!(state.phase(), AuthPhase::AuthFailed);

        state.begin_auth();
        state.auth_succeeded(identity(), None);
        assert_eq!(state.phase(), AuthPhase::Authenticated);

        state.signed_out();
        state.clear_notice();
        assert_eq!(state.phase(), AuthPhase::Anonymous);
    }

    #[test]
    fn success_and_error_are_mutually_exclusive() {
        let mut state = SessionState::default();
        state.auth_succeeded(identity(), Some("Welcome back!".to_string()));
        assert!(state.success);
        assert_eq!(state.error, None);
        assert_eq!(state.message, "Welcome back!");

        state.note_error("Failed to fetch users.".to_string());
        assert!(!state.success);
        assert_eq!(state.error.as_deref(), Some("Failed to fetch users."));

        state.auth_failed("Login failed.".to_string());
        assert!(!state.success);
        assert!(state.error.is_some());
    }

    #[test]
    fn restored_identity_starts_authenticated_without_flags() {
        let state = SessionState::restored(Some(identity()));
        assert_eq!(state.phase(), AuthPhase::Authenticated);
        assert!(!state.success);
        assert_eq!(state.error, None);
        assert!(state.message.is_empty());
    }

    #[test]
    fn clear_notice_is_idempotent() {
        let mut state = SessionState::restored(Some(identity()));
        state.auth_failed("oops".to_string());
        state.clear_notice();
        let snapshot = format!("{state:?}");
        state.clear_notice();
        assert_eq!(format!("{state:?}"), snapshot);
    }
}
