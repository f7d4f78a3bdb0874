//! Mandrill JSON API client.
//!
//! Every Mandrill call is a `POST` of a JSON object carrying the API key,
//! answered with JSON. Errors come back with a non-2xx status and a body like
//! `{"status": "error", "name": "Invalid_Key", "message": "..."}`.
//!
//! Endpoints used:
//! - `messages/search.json` for recent message events
//! - `rejects/delete.json` for deny-list removal
//! - `messages/content.json` for the stored body of a message
//! - `messages/send.json` for resending

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use super::{ProviderClient, SearchWindow};
use crate::config::ProviderConfig;
use crate::error::{BounceWatchError, Result};
use crate::model::{MessageDetail, MessageRecord, ResendPayload};

/// Recipient statuses that mean the provider took the message.
const ACCEPTED_STATUSES: &[&str] = &["sent", "queued", "scheduled"];

/// Error body returned by the API.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    name: Option<String>,
    message: Option<String>,
}

/// `rejects/delete.json` response.
#[derive(Debug, Deserialize)]
struct DeleteRejectResponse {
    #[serde(default)]
    deleted: bool,
}

/// One element of the `messages/send.json` response.
#[derive(Debug, Deserialize)]
struct SendStatus {
    email: Option<String>,
    status: Option<String>,
    reject_reason: Option<String>,
}

/// HTTP client for the Mandrill API.
pub struct MandrillClient {
    api_key: String,
    base_url: String,
    client: Client,
}

impl MandrillClient {
    /// Create a client from explicit configuration.
    ///
    /// Fails if no API key is configured or the HTTP client cannot be built.
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                BounceWatchError::Config(
                    "no API key configured (set BOUNCEWATCH_API_KEY or provider.api_key)".into(),
                )
            })?
            .to_string();

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| BounceWatchError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// POST `body` (plus the key) to `path` and return the decoded JSON.
    async fn call(&self, path: &str, mut body: Value) -> Result<Value> {
        if let Some(obj) = body.as_object_mut() {
            obj.insert("key".to_string(), Value::String(self.api_key.clone()));
        }

        let url = format!("{}/{}", self.base_url, path);
        debug!(%url, "Calling provider");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| BounceWatchError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<Value>()
                .await
                .map_err(|e| BounceWatchError::Decode(format!("{path}: {e}")));
        }

        let text = response.text().await.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read provider error body");
            String::new()
        });
        let message = match serde_json::from_str::<ApiErrorBody>(&text) {
            Ok(ApiErrorBody {
                name: Some(name),
                message: Some(msg),
            }) => format!("{name}: {msg}"),
            Ok(ApiErrorBody {
                message: Some(msg), ..
            }) => msg,
            _ if text.is_empty() => status.canonical_reason().unwrap_or("error").to_string(),
            _ => text,
        };
        error!(%path, status = status.as_u16(), %message, "Provider call failed");
        Err(BounceWatchError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl ProviderClient for MandrillClient {
    async fn search_messages(
        &self,
        query: &str,
        window: &SearchWindow,
    ) -> Result<Vec<MessageRecord>> {
        let body = json!({
            "query": query,
            "date_from": window.date_from.format("%Y-%m-%d").to_string(),
            "limit": window.limit,
        });
        let value = self.call("messages/search.json", body).await?;
        if !value.is_array() {
            return Err(BounceWatchError::Decode(
                "messages/search.json: expected an array".into(),
            ));
        }
        let records = MessageRecord::batch_from_json(&value);
        info!(%query, count = records.len(), "Search completed");
        Ok(records)
    }

    async fn delete_from_deny_list(&self, email: &str) -> Result<bool> {
        let value = self
            .call("rejects/delete.json", json!({ "email": email }))
            .await?;
        let parsed: DeleteRejectResponse = serde_json::from_value(value)
            .map_err(|e| BounceWatchError::Decode(format!("rejects/delete.json: {e}")))?;
        info!(%email, deleted = parsed.deleted, "Deny-list removal");
        Ok(parsed.deleted)
    }

    async fn fetch_message_info(&self, id: &str) -> Result<MessageDetail> {
        if id.trim().is_empty() {
            return Err(BounceWatchError::InvalidInput("message id is empty".into()));
        }
        let value = self
            .call("messages/content.json", json!({ "id": id }))
            .await?;
        if !value.is_object() {
            return Err(BounceWatchError::Decode(
                "messages/content.json: expected an object".into(),
            ));
        }
        let mut detail = MessageDetail::from_json(&value);
        if detail.id.is_empty() {
            detail.id = id.to_string();
        }
        Ok(detail)
    }

    async fn resend(&self, payload: &ResendPayload) -> Result<bool> {
        let message = json!({
            "html": payload.html,
            "text": payload.text,
            "subject": payload.subject,
            "from_email": payload.from_email,
            "from_name": payload.from_name,
            "to": [{ "email": payload.to_email, "type": "to" }],
        });
        let value = self
            .call("messages/send.json", json!({ "message": message }))
            .await?;
        let statuses: Vec<SendStatus> = serde_json::from_value(value)
            .map_err(|e| BounceWatchError::Decode(format!("messages/send.json: {e}")))?;

        let accepted = !statuses.is_empty()
            && statuses.iter().all(|s| {
                s.status
                    .as_deref()
                    .is_some_and(|st| ACCEPTED_STATUSES.contains(&st))
            });
        if !accepted {
            for s in &statuses {
                warn!(
                    email = s.email.as_deref().unwrap_or(""),
                    status = s.status.as_deref().unwrap_or(""),
                    reject_reason = s.reject_reason.as_deref().unwrap_or(""),
                    "Resend not accepted"
                );
            }
        }
        Ok(accepted)
    }
}
