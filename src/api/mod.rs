//! Wire payloads and the gateway trait used by the chat client.
//!
//! Everything the server sends or receives is defined here as serde types,
//! along with the error taxonomy the rest of the crate consumes. The HTTP
//! implementation lives in [`client`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub mod client;

/// The authenticated user's record, as returned by login and `/me` and as
/// persisted locally between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(alias = "_id")]
    pub id: String,
    pub full_name: String,
    pub username: String,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub profile_photo: Option<String>,
    /// Bearer token for servers that issue one alongside the session cookie.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// One row of the user directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntry {
    #[serde(alias = "_id")]
    pub id: String,
    pub full_name: String,
    pub username: String,
    #[serde(default)]
    pub profile_photo: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// A chat message. Every field is optional because a successful send may be
/// echoed back with an empty body (see [`ChatApi::send_message`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Message {
    #[serde(alias = "_id")]
    pub id: Option<String>,
    pub sender_id: Option<String>,
    pub receiver_id: Option<String>,
    /// Text body. The wire name is `message`.
    pub message: Option<String>,
    pub file_url: Option<String>,
    /// `"image"` for inline-renderable attachments, anything else is a plain file.
    pub file_type: Option<String>,
    pub file_name: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// An attachment read into memory by the front end before submission.
#[derive(Debug, Clone, PartialEq)]
pub struct FileUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub mime: Option<String>,
}

/// Fields of the signup form, submitted as multipart form data.
#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub full_name: String,
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    pub gender: String,
    pub profile_photo: Option<FileUpload>,
}

/// Identity plus the optional human-readable notice that login and `/me`
/// responses carry next to the user record.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityPayload {
    pub identity: Identity,
    pub message: Option<String>,
}

/// Failure of a gateway operation.
///
/// `Server` carries the message the server supplied (or a per-operation
/// fallback); `Network` is any transport-level failure before a response
/// arrived and always renders as the same fixed string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    Server(String),
    Network,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Server(message) => f.write_str(message),
            ApiError::Network => f.write_str("Network error."),
        }
    }
}

impl std::error::Error for ApiError {}

pub type ApiResult<T> = Result<T, ApiError>;

/// The remote capabilities of the chat server.
///
/// The orchestrator only talks to this trait; the production implementation
/// is [`client::HttpChatApi`] and tests substitute a scripted one.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Submit the signup form. `Ok` carries the server's notice, if any.
    async fn register(&self, form: &RegisterForm) -> ApiResult<Option<String>>;

    async fn login(&self, username: &str, password: &str) -> ApiResult<IdentityPayload>;

    async fn logout(&self) -> ApiResult<()>;

    /// Fetch the identity bound to the current credential. Used to validate a
    /// restored session.
    async fn current_user(&self) -> ApiResult<IdentityPayload>;

    async fn list_users(&self) -> ApiResult<Vec<DirectoryEntry>>;

    async fn list_messages(&self, peer_id: &str) -> ApiResult<Vec<Message>>;

    /// Send a message to `peer_id`. At least one of `body`/`file` is expected
    /// by the server; if the 2xx response body is missing or unparsable the
    /// send still counts and an empty [`Message`] is returned.
    async fn send_message(
        &self,
        peer_id: &str,
        body: Option<&str>,
        file: Option<&FileUpload>,
    ) -> ApiResult<Message>;

    /// Install or drop the bearer token attached to subsequent calls.
    fn set_session_token(&self, token: Option<String>);
}

/// The user-list endpoint is served with three envelope shapes in the wild.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum UserListEnvelope {
    Bare(Vec<DirectoryEntry>),
    Keyed { users: Vec<DirectoryEntry> },
    Wrapped { data: Vec<DirectoryEntry> },
}

impl UserListEnvelope {
    pub fn into_entries(self) -> Vec<DirectoryEntry> {
        match self {
            UserListEnvelope::Bare(entries) => entries,
            UserListEnvelope::Keyed { users } => users,
            UserListEnvelope::Wrapped { data } => data,
        }
    }
}

/// Decode a login or `/me` response body.
///
/// Servers either return the identity at the top level or wrap it in a
/// `user` field; a `token` and a `message` may sit beside it either way.
pub fn decode_identity_payload(value: Value) -> Result<IdentityPayload, String> {
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string);
    let token = value
        .get("token")
        .and_then(Value::as_str)
        .map(str::to_string);

    let user_value = match value.get("user") {
        Some(user) => user.clone(),
        None => value,
    };
    let mut identity: Identity = serde_json::from_value(user_value)
        .map_err(|err| format!("unrecognized identity payload: {err}"))?;
    if identity.token.is_none() {
        identity.token = token;
    }

    Ok(IdentityPayload { identity, message })
}

impl Message {
    /// True when the message carries neither text nor an attachment, i.e. it
    /// is the placeholder produced by the send-echo leniency.
    pub fn is_empty(&self) -> bool {
        self.message.is_none() && self.file_url.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry_json(id: &str, name: &str) -> Value {
        json!({"_id": id, "fullName": name, "username": name.to_lowercase()})
    }

    #[test]
    fn user_list_envelope_shapes_decode_identically() {
        let logical = json!([entry_json("u1", "Alice"), entry_json("u2", "Bob")]);
        let shapes = [
            logical.clone(),
            json!({"users": logical.clone()}),
            json!({"data": logical}),
        ];

        let mut decoded: Vec<Vec<DirectoryEntry>> = Vec::new();
        for shape in shapes {
            let envelope: UserListEnvelope =
                serde_json::from_value(shape).expect("envelope decodes");
            decoded.push(envelope.into_entries());
        }

        assert_eq!(decoded[0], decoded[1]);
        assert_eq!(decoded[1], decoded[2]);
        assert_eq!(decoded[0].len(), 2);
        assert_eq!(decoded[0][0].id, "u1");
        assert_eq!(decoded[0][1].full_name, "Bob");
    }

    #[test]
    fn identity_payload_decodes_flat_shape() {
        let payload = decode_identity_payload(json!({
            "_id": "u1",
            "fullName": "Alice",
            "username": "alice",
            "token": "t1",
            "message": "Login successful!"
        }))
        .expect("flat payload decodes");

        assert_eq!(payload.identity.id, "u1");
        assert_eq!(payload.identity.token.as_deref(), Some("t1"));
        assert_eq!(payload.message.as_deref(), Some("Login successful!"));
    }

    #[test]
    fn identity_payload_decodes_wrapped_shape_and_merges_token() {
        let payload = decode_identity_payload(json!({
            "token": "t2",
            "user": {"_id": "u2", "fullName": "Bob", "username": "bob"}
        }))
        .expect("wrapped payload decodes");

        assert_eq!(payload.identity.id, "u2");
        assert_eq!(payload.identity.token.as_deref(), Some("t2"));
        assert_eq!(payload.message, None);
    }

    #[test]
    fn identity_payload_rejects_garbage() {
        assert!(decode_identity_payload(json!({"ok": true})).is_err());
    }

    #[test]
    fn empty_message_object_deserializes_to_placeholder() {
        let message: Message = serde_json::from_str("{}").expect("empty object decodes");
        assert!(message.is_empty());
        assert_eq!(message, Message::default());
    }

    #[test]
    fn message_decodes_wire_names() {
        let message: Message = serde_json::from_value(json!({
            "_id": "m1",
            "senderId": "u1",
            "message": "hi",
            "fileUrl": "https://cdn.example/x.png",
            "fileType": "image",
            "createdAt": "2024-05-01T12:00:00Z"
        }))
        .expect("message decodes");

        assert_eq!(message.id.as_deref(), Some("m1"));
        assert_eq!(message.sender_id.as_deref(), Some("u1"));
        assert_eq!(message.file_type.as_deref(), Some("image"));
        assert!(message.created_at.is_some());
        assert!(!message.is_empty());
    }

    #[test]
    fn api_error_display_is_stable() {
        assert_eq!(ApiError::Network.to_string(), "Network error.");
        assert_eq!(
            ApiError::Server("Login failed.".to_string()).to_string(),
            "Login failed."
        );
    }
}
