//! The active conversation's message cache.
//!
//! Messages belong to exactly one peer at a time: switching peers clears the
//! sequence before the new fetch resolves, and a fetch that completes for a
//! peer who is no longer active is dropped by the orchestrator (see
//! [`crate::core::app`]).

use crate::api::Message;

#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    pub peer_id: Option<String>,
    pub messages: Vec<Message>,
    pub loading: bool,
}

impl ConversationState {
    pub fn is_active(&self, peer_id: &str) -> bool {
        self.peer_id.as_deref() == Some(peer_id)
    }

    /// Make `peer_id` the active conversation. Old messages disappear
    /// immediately so the previous peer's chat is never visible under the
    /// new header, not even while the fetch is in flight.
    pub fn begin_switch(&mut self, peer_id: &str) {
        self.peer_id = Some(peer_id.to_string());
        self.messages.clear();
        self.loading = true;
    }

    pub fn fetch_finished(&mut self, messages: Vec<Message>) {
        self.loading = false;
        self.messages = messages;
    }

    /// Unlike the directory, a failed fetch leaves the conversation empty.
    pub fn fetch_failed(&mut self) {
        self.loading = false;
        self.messages.clear();
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn clear(&mut self) {
        self.peer_id = None;
        self.messages.clear();
        self.loading = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_message(body: &str) -> Message {
        Message {
            message: Some(body.to_string()),
            ..Message::default()
        }
    }

    #[test]
    fn switching_peers_clears_messages_before_the_fetch_resolves() {
        let mut state = ConversationState::default();
        state.begin_switch("u1");
        state.fetch_finished(vec![text_message("hi"), text_message("there")]);

        state.begin_switch("u2");
        assert!(state.messages.is_empty());
        assert!(state.loading);
        assert!(state.is_active("u2"));
        assert!(!state.is_active("u1"));
    }

    #[test]
    fn failed_fetch_discards_messages() {
        let mut state = ConversationState::default();
        state.begin_switch("u1");
        state.fetch_finished(vec![text_message("hi")]);

        state.begin_switch("u1");
        state.fetch_failed();
        assert!(state.messages.is_empty());
        assert!(!state.loading);
    }

    #[test]
    fn append_keeps_api_order_with_the_new_tail() {
        let mut state = ConversationState::default();
        state.begin_switch("u1");
        state.fetch_finished(vec![text_message("a"), text_message("b")]);
        state.append(text_message("c"));
        let bodies: Vec<_> = state
            .messages
            .iter()
            .filter_map(|m| m.message.as_deref())
            .collect();
        assert_eq!(bodies, ["a", "b", "c"]);
    }
}
