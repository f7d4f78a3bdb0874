//! Read-only handlers: check one address, or compute a campaign funnel.
//!
//! Each handler performs one search, classifies the result, and returns a
//! value. Nothing is remembered between calls.

use crate::classify::{self, ClassifiedMessage, FunnelSummary, Summary};
use crate::error::{BounceWatchError, Result};
use crate::model::address::same_address;
use crate::model::MessageRecord;
use crate::provider::{ProviderClient, SearchWindow};

/// A record together with how it should be presented.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ReportedMessage {
    pub record: MessageRecord,
    pub classified: ClassifiedMessage,
}

/// Everything found for one address.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AddressReport {
    /// The address as the user typed it (trimmed).
    pub address: String,
    /// State counts over the exact-match records.
    pub summary: Summary,
    /// Exact-match records in provider order.
    pub messages: Vec<ReportedMessage>,
}

impl AddressReport {
    /// Whether any message can be fixed by removing the address from the deny list.
    pub fn has_remediable(&self) -> bool {
        self.messages.iter().any(|m| m.classified.is_remediable)
    }
}

/// Result of checking an address.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LookupOutcome {
    /// The search came back empty.
    NoResults,
    /// The search matched messages, but none were sent to exactly this address.
    NoExactMatch { searched: usize },
    /// Messages to this address were found.
    Found(AddressReport),
}

/// Classify a batch of records already known to belong to `address`.
pub fn build_report(address: &str, records: Vec<MessageRecord>) -> AddressReport {
    let summary = classify::summarize(&records);
    let messages = records
        .into_iter()
        .map(|record| {
            let classified = classify::classify_one(&record);
            ReportedMessage { record, classified }
        })
        .collect();
    AddressReport {
        address: address.to_string(),
        summary,
        messages,
    }
}

/// Search recent messages for `address` and classify the exact matches.
///
/// The provider's search is fuzzy (it matches the address anywhere in the
/// indexed fields), so results are filtered to records whose recipient equals
/// the address, ignoring case.
pub async fn check_address(
    client: &dyn ProviderClient,
    address: &str,
    window: &SearchWindow,
) -> Result<LookupOutcome> {
    let address = address.trim();
    if address.is_empty() {
        return Err(BounceWatchError::InvalidInput(
            "please enter an email address".into(),
        ));
    }

    let records = client.search_messages(address, window).await?;
    if records.is_empty() {
        tracing::info!(%address, "No messages found");
        return Ok(LookupOutcome::NoResults);
    }

    let searched = records.len();
    let matching: Vec<MessageRecord> = records
        .into_iter()
        .filter(|r| same_address(&r.to_email, address))
        .collect();

    if matching.is_empty() {
        tracing::info!(%address, searched, "No exact recipient match");
        return Ok(LookupOutcome::NoExactMatch { searched });
    }

    tracing::debug!(%address, searched, matched = matching.len(), "Lookup complete");
    Ok(LookupOutcome::Found(build_report(address, matching)))
}

/// Search with a campaign query and compute funnel metrics over everything
/// returned.
pub async fn campaign_funnel(
    client: &dyn ProviderClient,
    query: &str,
    window: &SearchWindow,
) -> Result<(FunnelSummary, Vec<MessageRecord>)> {
    let query = query.trim();
    if query.is_empty() {
        return Err(BounceWatchError::InvalidInput(
            "campaign query must not be empty".into(),
        ));
    }
    let records = client.search_messages(query, window).await?;
    let funnel = classify::compute_funnel(&records, query);
    tracing::info!(
        %query,
        total = funnel.total,
        open_rate = funnel.open_rate,
        "Funnel computed"
    );
    Ok((funnel, records))
}
