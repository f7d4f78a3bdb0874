//! Remediation actions: deny-list removal and resending unopened messages.
//!
//! Bulk actions walk their targets one at a time, awaiting each provider call
//! before the next. A failed item is recorded and the loop moves on; nothing
//! is retried.

use std::collections::HashSet;

use crate::classify;
use crate::error::{BounceWatchError, Result};
use crate::model::{address, MessageRecord, ResendPayload};
use crate::provider::ProviderClient;

/// One item a bulk action could not complete.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FailedItem {
    /// Address or message id, depending on the action.
    pub id: String,
    pub reason: String,
}

/// Per-item results of a bulk action.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct BulkOutcome {
    pub attempted: usize,
    pub succeeded: Vec<String>,
    pub failed: Vec<FailedItem>,
}

impl BulkOutcome {
    /// True only if every attempted item succeeded.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    fn success(&mut self, id: impl Into<String>) {
        self.attempted += 1;
        self.succeeded.push(id.into());
    }

    fn failure(&mut self, id: impl Into<String>, reason: impl Into<String>) {
        self.attempted += 1;
        self.failed.push(FailedItem {
            id: id.into(),
            reason: reason.into(),
        });
    }
}

/// Remove a single address from the deny list.
pub async fn remove_from_deny_list(client: &dyn ProviderClient, email: &str) -> Result<bool> {
    let email = email.trim();
    if !address::is_plausible(email) {
        return Err(BounceWatchError::InvalidAddress(email.to_string()));
    }
    client.delete_from_deny_list(email).await
}

/// Addresses of remediable records, de-duplicated ignoring case, first
/// occurrence order.
pub fn remediable_addresses(records: &[MessageRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|r| classify::classify_one(r).is_remediable)
        .map(|r| r.to_email.trim().to_string())
        .filter(|email| seen.insert(address::normalize(email)))
        .collect()
}

/// Records nobody opened and that have an id we can fetch.
pub fn unopened_with_id(records: &[MessageRecord]) -> Vec<&MessageRecord> {
    records
        .iter()
        .filter(|r| r.opens == 0 && !r.id.trim().is_empty())
        .collect()
}

/// Remove every remediable address in `records` from the deny list.
///
/// `progress` receives `(done, total)` after each item.
pub async fn bulk_remove(
    client: &dyn ProviderClient,
    records: &[MessageRecord],
    progress: Option<&(dyn Fn(usize, usize) + Sync)>,
) -> BulkOutcome {
    let targets = remediable_addresses(records);
    let total = targets.len();
    let mut outcome = BulkOutcome::default();

    for (i, email) in targets.into_iter().enumerate() {
        match client.delete_from_deny_list(&email).await {
            Ok(true) => outcome.success(email),
            Ok(false) => outcome.failure(email, "address was not on the deny list"),
            Err(e) => {
                tracing::warn!(%email, error = %e, "Deny-list removal failed");
                outcome.failure(email, e.to_string());
            }
        }
        if let Some(cb) = progress {
            cb(i + 1, total);
        }
    }

    tracing::info!(
        attempted = outcome.attempted,
        failed = outcome.failed.len(),
        "Bulk deny-list removal finished"
    );
    outcome
}

/// Resend every unopened message in `records` to its original recipient.
///
/// For each message the stored content is fetched, turned into a
/// [`ResendPayload`] and sent. `progress` receives `(done, total)`.
pub async fn resend_unopened(
    client: &dyn ProviderClient,
    records: &[MessageRecord],
    progress: Option<&(dyn Fn(usize, usize) + Sync)>,
) -> BulkOutcome {
    let targets = unopened_with_id(records);
    let total = targets.len();
    let mut outcome = BulkOutcome::default();

    for (i, record) in targets.into_iter().enumerate() {
        let id = record.id.as_str();
        match resend_one(client, id).await {
            Ok(()) => outcome.success(id),
            Err(reason) => {
                tracing::warn!(%id, %reason, "Resend failed");
                outcome.failure(id, reason);
            }
        }
        if let Some(cb) = progress {
            cb(i + 1, total);
        }
    }

    tracing::info!(
        attempted = outcome.attempted,
        failed = outcome.failed.len(),
        "Resend of unopened messages finished"
    );
    outcome
}

async fn resend_one(client: &dyn ProviderClient, id: &str) -> std::result::Result<(), String> {
    let detail = client
        .fetch_message_info(id)
        .await
        .map_err(|e| e.to_string())?;
    let payload = ResendPayload::from_detail(&detail)
        .ok_or_else(|| {
            format!(
                "stored message from {} has no body or recipient",
                detail.sender_display()
            )
        })?;
    tracing::debug!(%id, from = %detail.sender_display(), to = %payload.to_email, "Resending");
    match client.resend(&payload).await {
        Ok(true) => Ok(()),
        Ok(false) => Err("provider did not accept the message".to_string()),
        Err(e) => Err(e.to_string()),
    }
}
