//! Full message content and the payload used to send it again.

use serde_json::Value;

use super::address::format_mailbox;

/// Stored content of a single message, fetched on demand by id.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct MessageDetail {
    pub id: String,
    pub subject: String,
    pub from_email: String,
    pub from_name: Option<String>,
    pub to_email: String,
    pub to_name: Option<String>,
    pub html: Option<String>,
    pub text: Option<String>,
}

impl MessageDetail {
    /// Build from the provider's content response.
    ///
    /// The recipient is reported as an object (`{"email", "name"}`); a bare
    /// string is accepted too.
    pub fn from_json(raw: &Value) -> Self {
        let to = raw.get("to");
        let (to_email, to_name) = match to {
            Some(Value::String(s)) => (s.clone(), None),
            Some(obj) => (
                str_field(obj, "email").unwrap_or_default(),
                str_field(obj, "name"),
            ),
            None => (String::new(), None),
        };

        Self {
            id: str_field(raw, "_id").unwrap_or_default(),
            subject: str_field(raw, "subject").unwrap_or_default(),
            from_email: str_field(raw, "from_email").unwrap_or_default(),
            from_name: str_field(raw, "from_name").filter(|s| !s.is_empty()),
            to_email,
            to_name: to_name.filter(|s| !s.is_empty()),
            html: str_field(raw, "html").filter(|s| !s.is_empty()),
            text: str_field(raw, "text").filter(|s| !s.is_empty()),
        }
    }

    /// `"Name <address>"` for the sender.
    pub fn sender_display(&self) -> String {
        format_mailbox(self.from_name.as_deref(), &self.from_email)
    }
}

/// Everything needed to send a stored message again to its recipient.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ResendPayload {
    pub html: Option<String>,
    pub text: Option<String>,
    pub subject: String,
    pub from_email: String,
    pub from_name: Option<String>,
    pub to_email: String,
}

impl ResendPayload {
    /// Build a payload from fetched content.
    ///
    /// Returns `None` when there is no body to send or the recipient or
    /// sender is missing.
    pub fn from_detail(detail: &MessageDetail) -> Option<Self> {
        if detail.html.is_none() && detail.text.is_none() {
            return None;
        }
        if detail.to_email.trim().is_empty() || detail.from_email.trim().is_empty() {
            return None;
        }
        Some(Self {
            html: detail.html.clone(),
            text: detail.text.clone(),
            subject: detail.subject.clone(),
            from_email: detail.from_email.clone(),
            from_name: detail.from_name.clone(),
            to_email: detail.to_email.clone(),
        })
    }
}

fn str_field(raw: &Value, key: &str) -> Option<String> {
    raw.get(key).and_then(Value::as_str).map(str::to_string)
}
