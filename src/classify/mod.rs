//! Email-event classification: state counts, per-message status, funnels.
//!
//! Everything here is a pure function of the records passed in. Nothing is
//! cached between calls and records are never modified.

pub mod diagnostic;
pub mod funnel;

use std::collections::BTreeMap;

use crate::model::address;
use crate::model::MessageRecord;

pub use diagnostic::{extract_reason, NO_REASON};
pub use funnel::{compute_funnel, FunnelSummary};

/// Label shown for messages the provider reports as `sent`.
pub const DELIVERED_LABEL: &str = "Delivered";

/// Label shown when the provider gave no state.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Bucket name for records without a state in [`Summary::counts_by_state`].
pub const UNKNOWN_STATE: &str = "unknown";

/// Provider delivery states the classifier distinguishes.
///
/// Matching is case-insensitive. Anything unrecognized is kept as
/// [`DeliveryState::Other`] so it still renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryState {
    Sent,
    Rejected,
    Bounced,
    SoftBounced,
    /// A state string we do not know about.
    Other(String),
    /// Empty or absent.
    Missing,
}

impl DeliveryState {
    /// Interpret a provider state string.
    pub fn parse(raw: &str) -> Self {
        let key = raw.trim().to_lowercase();
        match key.as_str() {
            "" => Self::Missing,
            "sent" => Self::Sent,
            "rejected" => Self::Rejected,
            "bounced" => Self::Bounced,
            "soft-bounced" => Self::SoftBounced,
            _ => Self::Other(key),
        }
    }

    /// Whether a bounce diagnostic applies to this state.
    pub fn is_bounce_like(&self) -> bool {
        !matches!(self, Self::Sent | Self::Rejected)
    }
}

/// Per-state counts for a batch of records.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct Summary {
    pub total: usize,
    pub counts_by_state: BTreeMap<String, usize>,
}

/// What to show for a single message.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ClassifiedMessage {
    /// `"Delivered"` for sent messages, otherwise the title-cased state.
    pub display_status: String,

    /// Extracted bounce reason. `None` for sent and rejected messages.
    pub diagnostic: Option<String>,

    /// The provider's raw rejection reason. Only set for rejected messages.
    pub reject_reason: Option<String>,

    /// Rejected with a usable address, so it can be removed from the deny list.
    pub is_remediable: bool,
}

/// Count records per (lower-cased) state.
pub fn summarize(records: &[MessageRecord]) -> Summary {
    let mut counts_by_state: BTreeMap<String, usize> = BTreeMap::new();
    for record in records {
        let key = record.state_key();
        let key = if key.is_empty() {
            UNKNOWN_STATE.to_string()
        } else {
            key
        };
        *counts_by_state.entry(key).or_default() += 1;
    }
    Summary {
        total: records.len(),
        counts_by_state,
    }
}

/// Classify one record for display.
pub fn classify_one(record: &MessageRecord) -> ClassifiedMessage {
    let state = DeliveryState::parse(&record.state);

    let display_status = match state {
        DeliveryState::Sent => DELIVERED_LABEL.to_string(),
        DeliveryState::Missing => UNKNOWN_LABEL.to_string(),
        _ => title_case(record.state.trim()),
    };

    let diagnostic = state
        .is_bounce_like()
        .then(|| extract_reason(&record.diagnostic));

    let reject_reason = match state {
        DeliveryState::Rejected => Some(record.reject_reason.clone().unwrap_or_default()),
        _ => None,
    };

    ClassifiedMessage {
        display_status,
        diagnostic,
        reject_reason,
        is_remediable: state == DeliveryState::Rejected && address::is_plausible(&record.to_email),
    }
}

/// Upper-case the first character of every word, lower-case the rest.
/// A word is a run of alphanumeric characters; every other character ends
/// the word and is kept as-is. Digits count as word characters, so
/// `"5xx-error"` becomes `"5xx-Error"`.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for ch in s.chars() {
        if ch.is_alphanumeric() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}
