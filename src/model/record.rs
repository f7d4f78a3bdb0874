//! Message records as returned by the provider's search endpoint.

use chrono::{DateTime, Utc};
use serde_json::Value;

/// One provider-reported email event.
///
/// Built once per search from the raw JSON and never mutated afterwards.
/// Construction is infallible: every missing or malformed field falls back
/// to a default so that a single odd record cannot break a whole report.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct MessageRecord {
    /// Provider message id (`_id`). Empty if the provider omitted it.
    pub id: String,

    /// Recipient address (`email`).
    pub to_email: String,

    /// Subject line, if any.
    pub subject: Option<String>,

    /// Sender address, if reported.
    pub sender: Option<String>,

    /// Send time in seconds since the Unix epoch (`ts`).
    /// `None` when missing or not a number.
    pub sent_at: Option<i64>,

    /// Provider state, verbatim (`sent`, `rejected`, `bounced`, `soft-bounced`, ...).
    pub state: String,

    /// Number of tracked opens.
    pub opens: u64,

    /// Number of tracked clicks.
    pub clicks: u64,

    /// First non-empty of `diag`, `reject_reason`, `metadata.smtp_response`,
    /// `metadata.reason`. Empty if none of them carried text.
    pub diagnostic: String,

    /// Raw `reject_reason`, kept separately for rejected messages.
    pub reject_reason: Option<String>,

    /// Provider tags attached at send time.
    pub tags: Vec<String>,
}

impl MessageRecord {
    /// Build a record from one element of the search response.
    pub fn from_json(raw: &Value) -> Self {
        let metadata = raw.get("metadata");

        let diagnostic = [
            raw.get("diag"),
            raw.get("reject_reason"),
            metadata.and_then(|m| m.get("smtp_response")),
            metadata.and_then(|m| m.get("reason")),
        ]
        .into_iter()
        .filter_map(non_empty_str)
        .next()
        .unwrap_or_default()
        .to_string();

        let tags = raw
            .get("tags")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            id: string_field(raw, "_id").unwrap_or_default(),
            to_email: string_field(raw, "email").unwrap_or_default(),
            subject: string_field(raw, "subject"),
            sender: string_field(raw, "sender"),
            sent_at: raw.get("ts").and_then(epoch_seconds),
            state: string_field(raw, "state").unwrap_or_default(),
            opens: raw.get("opens").map(counter).unwrap_or(0),
            clicks: raw.get("clicks").map(counter).unwrap_or(0),
            diagnostic,
            reject_reason: string_field(raw, "reject_reason"),
            tags,
        }
    }

    /// Build records from a search response body, which should be an array.
    /// Anything else yields an empty batch.
    pub fn batch_from_json(body: &Value) -> Vec<Self> {
        body.as_array()
            .map(|items| items.iter().map(Self::from_json).collect())
            .unwrap_or_default()
    }

    /// Send time as a UTC datetime, if the timestamp was usable.
    pub fn sent_at_utc(&self) -> Option<DateTime<Utc>> {
        self.sent_at.and_then(|ts| DateTime::from_timestamp(ts, 0))
    }

    /// Render the send time with a `strftime` format, or `"Unknown"`.
    pub fn sent_at_display(&self, format: &str) -> String {
        self.sent_at_utc()
            .map(|dt| dt.format(format).to_string())
            .unwrap_or_else(|| "Unknown".to_string())
    }

    /// Lower-cased, trimmed state used for bucketing.
    pub fn state_key(&self) -> String {
        self.state.trim().to_lowercase()
    }
}

fn string_field(raw: &Value, key: &str) -> Option<String> {
    raw.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Whitespace-only text counts as absent so a later source can still supply it.
fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.trim().is_empty())
}

/// Accept integers, finite floats (truncated) and numeric strings.
fn epoch_seconds(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Non-negative integer counter; anything else counts as zero.
fn counter(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n.as_u64().unwrap_or(0),
        Value::String(s) => s.trim().parse::<u64>().unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_record() {
        let rec = MessageRecord::from_json(&json!({
            "_id": "abc123",
            "ts": 1_700_000_000,
            "email": "jane@example.com",
            "sender": "otp@shop.example",
            "subject": "Your code",
            "state": "soft-bounced",
            "opens": 2,
            "clicks": 1,
            "diag": "452 mailbox full",
            "tags": ["otp", "login"]
        }));
        assert_eq!(rec.id, "abc123");
        assert_eq!(rec.to_email, "jane@example.com");
        assert_eq!(rec.sent_at, Some(1_700_000_000));
        assert_eq!(rec.opens, 2);
        assert_eq!(rec.clicks, 1);
        assert_eq!(rec.diagnostic, "452 mailbox full");
        assert_eq!(rec.tags, vec!["otp", "login"]);
    }

    #[test]
    fn test_missing_fields_default() {
        let rec = MessageRecord::from_json(&json!({}));
        assert_eq!(rec.id, "");
        assert_eq!(rec.state, "");
        assert_eq!(rec.opens, 0);
        assert_eq!(rec.sent_at, None);
        assert_eq!(rec.subject, None);
        assert_eq!(rec.diagnostic, "");
        assert_eq!(rec.sent_at_display("%Y-%m-%d"), "Unknown");
    }

    #[test]
    fn test_non_numeric_timestamp_is_unknown() {
        let rec = MessageRecord::from_json(&json!({ "ts": "yesterday" }));
        assert_eq!(rec.sent_at, None);
        assert_eq!(rec.sent_at_display("%Y"), "Unknown");

        let rec = MessageRecord::from_json(&json!({ "ts": "1700000000" }));
        assert_eq!(rec.sent_at, Some(1_700_000_000));

        let rec = MessageRecord::from_json(&json!({ "ts": 1700000000.75 }));
        assert_eq!(rec.sent_at, Some(1_700_000_000));
    }

    #[test]
    fn test_sent_at_display_formats_utc() {
        let rec = MessageRecord::from_json(&json!({ "ts": 0 }));
        assert_eq!(rec.sent_at_display("%Y-%m-%d %H:%M:%S"), "1970-01-01 00:00:00");
    }

    #[test]
    fn test_negative_counters_default_to_zero() {
        let rec = MessageRecord::from_json(&json!({ "opens": -3, "clicks": "x" }));
        assert_eq!(rec.opens, 0);
        assert_eq!(rec.clicks, 0);
    }

    #[test]
    fn test_diagnostic_priority() {
        let rec = MessageRecord::from_json(&json!({
            "diag": "",
            "reject_reason": "hard-bounce",
            "metadata": { "smtp_response": "550 no such user" }
        }));
        assert_eq!(rec.diagnostic, "hard-bounce");

        let rec = MessageRecord::from_json(&json!({
            "metadata": { "smtp_response": "", "reason": "policy" }
        }));
        assert_eq!(rec.diagnostic, "policy");

        let rec = MessageRecord::from_json(&json!({
            "diag": "first",
            "metadata": { "reason": "last" }
        }));
        assert_eq!(rec.diagnostic, "first");

        let rec = MessageRecord::from_json(&json!({
            "diag": "  \n",
            "metadata": { "smtp_response": "550 Recipient address rejected: User unknown" }
        }));
        assert_eq!(
            rec.diagnostic,
            "550 Recipient address rejected: User unknown"
        );
    }

    #[test]
    fn test_non_string_diagnostic_sources_are_skipped() {
        let rec = MessageRecord::from_json(&json!({
            "diag": null,
            "reject_reason": 42,
            "metadata": "not an object"
        }));
        assert_eq!(rec.diagnostic, "");
        assert_eq!(rec.reject_reason, None);
    }

    #[test]
    fn test_batch_preserves_order() {
        let batch = MessageRecord::batch_from_json(&json!([
            { "_id": "b" }, { "_id": "a" }, { "_id": "c" }
        ]));
        let ids: Vec<&str> = batch.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);

        assert!(MessageRecord::batch_from_json(&json!({ "status": "error" })).is_empty());
    }
}
