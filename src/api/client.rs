//! reqwest-backed implementation of [`ChatApi`].
//!
//! Every operation resolves to exactly one [`ApiResult`]: non-2xx responses
//! become [`ApiError::Server`] carrying the server's `message` field (or a
//! per-operation fallback), and transport failures become
//! [`ApiError::Network`]. Nothing here panics or propagates a raw reqwest
//! error to callers.

use async_trait::async_trait;
use reqwest::multipart;
use std::sync::Mutex;

use crate::api::{
    decode_identity_payload, ApiError, ApiResult, ChatApi, DirectoryEntry, FileUpload,
    IdentityPayload, Message, RegisterForm, UserListEnvelope,
};
use crate::utils::url::{construct_api_url, normalize_base_url};

pub struct HttpChatApi {
    client: reqwest::Client,
    base_url: String,
    // Swapped on login/logout; a Mutex keeps the trait object shareable even
    // though intents are serialized by the orchestrator.
    token: Mutex<Option<String>>,
}

impl HttpChatApi {
    pub fn new(base_url: &str) -> Result<Self, reqwest::Error> {
        // The session credential is a cookie; the client owns the jar.
        let client = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self {
            client,
            base_url: normalize_base_url(base_url),
            token: Mutex::new(None),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        construct_api_url(&self.base_url, endpoint)
    }

    /// Attach the bearer token when one is present. Anonymous calls go out
    /// without it; the cookie jar rides along either way.
    fn with_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let token = self.token.lock().ok().and_then(|guard| guard.clone());
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send_request(
        &self,
        request: reqwest::RequestBuilder,
        fallback: &str,
    ) -> ApiResult<reqwest::Response> {
        let response = self.with_auth(request).send().await.map_err(|err| {
            tracing::debug!(error = %err, "transport failure");
            ApiError::Network
        })?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = failure_message(&body, fallback);
        tracing::debug!(%status, %message, "server rejected request");
        Err(ApiError::Server(message))
    }
}

/// Pull the `message` field out of an error body, falling back to the
/// operation's fixed string when the body is missing, unparsable, or silent.
fn failure_message(body: &str, fallback: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .and_then(|message| message.as_str())
                .map(str::to_string)
        })
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

fn upload_part(upload: &FileUpload) -> ApiResult<multipart::Part> {
    let mut part =
        multipart::Part::bytes(upload.bytes.clone()).file_name(upload.file_name.clone());
    if let Some(mime) = &upload.mime {
        part = part
            .mime_str(mime)
            .map_err(|_| ApiError::Server(format!("Invalid attachment type: {mime}")))?;
    }
    Ok(part)
}

#[async_trait]
impl ChatApi for HttpChatApi {
    async fn register(&self, form: &RegisterForm) -> ApiResult<Option<String>> {
        let mut submission = multipart::Form::new()
            .text("fullName", form.full_name.clone())
            .text("username", form.username.clone())
            .text("password", form.password.clone())
            .text("confirmPassword", form.confirm_password.clone())
            .text("gender", form.gender.clone());
        if let Some(photo) = &form.profile_photo {
            submission = submission.part("profilePhoto", upload_part(photo)?);
        }

        let request = self
            .client
            .post(self.url("api/v1/user/register"))
            .multipart(submission);
        let response = self.send_request(request, "Signup failed.").await?;

        let body = response.text().await.unwrap_or_default();
        Ok(serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|value| {
                value
                    .get("message")
                    .and_then(|message| message.as_str())
                    .map(str::to_string)
            }))
    }

    async fn login(&self, username: &str, password: &str) -> ApiResult<IdentityPayload> {
        let request = self
            .client
            .post(self.url("api/v1/user/login"))
            .json(&serde_json::json!({"username": username, "password": password}));
        let response = self.send_request(request, "Login failed.").await?;

        let value = response
            .json::<serde_json::Value>()
            .await
            .map_err(|_| ApiError::Server("Login failed.".to_string()))?;
        decode_identity_payload(value).map_err(|detail| {
            tracing::debug!(%detail, "login payload did not decode");
            ApiError::Server("Login failed.".to_string())
        })
    }

    async fn logout(&self) -> ApiResult<()> {
        let request = self.client.post(self.url("api/v1/user/logout"));
        self.send_request(request, "Logout failed.").await?;
        Ok(())
    }

    async fn current_user(&self) -> ApiResult<IdentityPayload> {
        let request = self.client.get(self.url("api/v1/user/me"));
        let response = self.send_request(request, "Failed to fetch user.").await?;

        let value = response
            .json::<serde_json::Value>()
            .await
            .map_err(|_| ApiError::Server("Failed to fetch user.".to_string()))?;
        decode_identity_payload(value)
            .map_err(|_| ApiError::Server("Failed to fetch user.".to_string()))
    }

    async fn list_users(&self) -> ApiResult<Vec<DirectoryEntry>> {
        let request = self.client.get(self.url("api/v1/user"));
        let response = self.send_request(request, "Failed to fetch users.").await?;

        let envelope = response
            .json::<UserListEnvelope>()
            .await
            .map_err(|_| ApiError::Server("Failed to fetch users.".to_string()))?;
        Ok(envelope.into_entries())
    }

    async fn list_messages(&self, peer_id: &str) -> ApiResult<Vec<Message>> {
        let request = self
            .client
            .get(self.url(&format!("api/v1/message/{peer_id}")));
        let response = self
            .send_request(request, "Failed to fetch messages.")
            .await?;

        response
            .json::<Vec<Message>>()
            .await
            .map_err(|_| ApiError::Server("Failed to fetch messages.".to_string()))
    }

    async fn send_message(
        &self,
        peer_id: &str,
        body: Option<&str>,
        file: Option<&FileUpload>,
    ) -> ApiResult<Message> {
        let mut submission = multipart::Form::new();
        if let Some(text) = body {
            submission = submission.text("message", text.to_string());
        }
        if let Some(upload) = file {
            submission = submission.part("file", upload_part(upload)?);
        }

        let request = self
            .client
            .post(self.url(&format!("api/v1/message/send/{peer_id}")))
            .multipart(submission);
        let response = self
            .send_request(request, "Failed to send message.")
            .await?;

        // The send succeeded at the transport level even if the echo does not
        // parse; an empty placeholder stands in for the created message.
        let body = response.text().await.unwrap_or_default();
        Ok(serde_json::from_str::<Message>(&body).unwrap_or_default())
    }

    fn set_session_token(&self, token: Option<String>) {
        if let Ok(mut guard) = self.token.lock() {
            *guard = token;
        }
    }
}
