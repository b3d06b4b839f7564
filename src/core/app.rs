//! The orchestrator: one state container that owns the session, directory,
//! and conversation sub-states and reconciles them against the gateway.
//!
//! Intents take `&mut self`, so they serialize naturally; no intent mutates
//! another sub-state's cache except sign-out, which clears everything at
//! once. The front end reads the public sub-state fields as snapshots and
//! never mutates them directly.

use crate::api::{ApiError, ApiResult, ChatApi, FileUpload, Identity, Message, RegisterForm};
use crate::core::conversation::ConversationState;
use crate::core::directory::DirectoryState;
use crate::core::session::SessionState;
use crate::core::session_store::SessionStore;

pub struct ChatApp {
    api: Box<dyn ChatApi>,
    store: SessionStore,
    pub session: SessionState,
    pub directory: DirectoryState,
    pub conversation: ConversationState,
}

impl ChatApp {
    /// Seed the session from the store; a corrupt file has already been
    /// self-healed into "anonymous" by the time we see it.
    pub fn new(api: Box<dyn ChatApi>, store: SessionStore) -> Self {
        let identity = store.load();
        if let Some(identity) = &identity {
            api.set_session_token(identity.token.clone());
        }
        Self {
            api,
            store,
            session: SessionState::restored(identity),
            directory: DirectoryState::default(),
            conversation: ConversationState::default(),
        }
    }

    pub async fn register(&mut self, form: &RegisterForm) {
        self.session.begin_auth();
        match self.api.register(form).await {
            Ok(message) => self.session.register_succeeded(message),
            Err(err) => self.session.auth_failed(err.to_string()),
        }
    }

    pub async fn login(&mut self, username: &str, password: &str) {
        self.session.begin_auth();
        match self.api.login(username, password).await {
            Ok(payload) => {
                self.persist_identity(&payload.identity);
                self.api.set_session_token(payload.identity.token.clone());
                self.session.auth_succeeded(payload.identity, payload.message);
            }
            Err(err) => self.session.auth_failed(err.to_string()),
        }
    }

    pub async fn logout(&mut self) {
        match self.api.logout().await {
            Ok(()) => self.finish_sign_out(),
            Err(err) => self.session.note_error(err.to_string()),
        }
    }

    /// Drop the session without a network call, for when the server is
    /// unreachable but the user wants out anyway.
    pub fn sign_out_locally(&mut self) {
        self.finish_sign_out();
    }

    /// Validate the current credential against `/me`. A server rejection
    /// means the session is dead and gets cleared; a network failure proves
    /// nothing and leaves state untouched.
    pub async fn refresh_identity(&mut self) {
        match self.api.current_user().await {
            Ok(payload) => {
                let mut identity = payload.identity;
                if identity.token.is_none() {
                    // /me echoes the user record without the token; keep the
                    // one we already hold.
                    identity.token = self
                        .session
                        .identity
                        .as_ref()
                        .and_then(|current| current.token.clone());
                }
                self.persist_identity(&identity);
                self.api.set_session_token(identity.token.clone());
                self.session.identity = Some(identity);
            }
            Err(ApiError::Server(_)) => self.finish_sign_out(),
            Err(ApiError::Network) => {}
        }
    }

    pub async fn load_users(&mut self) {
        self.directory.begin_load();
        match self.api.list_users().await {
            Ok(entries) => self.directory.loaded(entries),
            Err(err) => {
                self.directory.load_failed();
                self.session.note_error(err.to_string());
            }
        }
    }

    /// Make `peer_id` the active conversation and fetch its messages.
    /// Re-opening the already-active conversation is a no-op.
    pub async fn open_conversation(&mut self, peer_id: &str) {
        if self.conversation.is_active(peer_id) {
            return;
        }
        self.conversation.begin_switch(peer_id);
        let result = self.api.list_messages(peer_id).await;
        self.apply_fetch(peer_id, result);
    }

    /// Apply a completed message fetch, fenced by peer id: a completion for
    /// a peer who is no longer active is discarded so a late arrival cannot
    /// overwrite the conversation the user switched to.
    fn apply_fetch(&mut self, peer_id: &str, result: ApiResult<Vec<Message>>) {
        if !self.conversation.is_active(peer_id) {
            tracing::debug!(%peer_id, "dropping fetch result for inactive conversation");
            return;
        }
        match result {
            Ok(messages) => self.conversation.fetch_finished(messages),
            Err(err) => {
                self.conversation.fetch_failed();
                self.session.note_error(err.to_string());
            }
        }
    }

    /// Send to the active conversation. No peer, or nothing to send, is a
    /// silent no-op. The message is appended only after the server confirms;
    /// there is no speculative "sending" entry.
    pub async fn send(&mut self, body: Option<&str>, file: Option<&FileUpload>) {
        let Some(peer_id) = self.conversation.peer_id.clone() else {
            return;
        };
        let text = body.map(str::trim).filter(|text| !text.is_empty());
        if text.is_none() && file.is_none() {
            return;
        }

        self.session.begin_request();
        match self.api.send_message(&peer_id, text, file).await {
            Ok(message) => {
                self.session.request_finished();
                self.conversation.append(message);
            }
            Err(err) => {
                self.session.request_finished();
                self.session.note_error(err.to_string());
            }
        }
    }

    pub fn clear_notice(&mut self) {
        self.session.clear_notice();
    }

    fn persist_identity(&self, identity: &Identity) {
        // Losing the write costs the next restart a login, not this session.
        if let Err(err) = self.store.save(identity) {
            tracing::warn!(error = %err, "failed to persist session");
        }
    }

    fn finish_sign_out(&mut self) {
        self.session.signed_out();
        self.directory.clear();
        self.conversation.clear();
        self.store.clear();
        self.api.set_session_token(None);
    }
}
