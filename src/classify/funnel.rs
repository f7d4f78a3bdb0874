//! Campaign funnel metrics.
//!
//! The buckets are independent predicates over the same records, not a
//! partition: a message can be opened and soft-bounced at the same time if
//! the provider reports both. Only `opened`/`unopened` are complementary.

use std::collections::HashMap;

use crate::model::MessageRecord;

use super::{extract_reason, DeliveryState};

/// Aggregate numbers for a campaign query.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct FunnelSummary {
    /// The query the records were fetched with.
    pub query: String,
    pub total: usize,
    pub opened: usize,
    pub unopened: usize,
    pub soft_bounced: usize,
    pub hard_bounced: usize,
    pub rejected: usize,
    pub delivered: usize,
    /// Percentage of opened messages, one decimal place.
    pub open_rate: f64,
    /// Soft-bounce reasons, most frequent first.
    pub bounce_reasons: Vec<(String, usize)>,
    /// Whether every record landed in exactly one of
    /// opened / soft-bounced / hard-bounced / rejected / unopened-delivered.
    pub exclusive: bool,
}

impl FunnelSummary {
    /// Whether the outcome buckets happen to be disjoint for this batch.
    /// When false, any funnel diagram drawn from these counts overlaps.
    pub fn is_exclusive(&self) -> bool {
        self.exclusive
    }

    /// The most common soft-bounce reason, if any.
    pub fn top_reason(&self) -> Option<&str> {
        self.bounce_reasons.first().map(|(reason, _)| reason.as_str())
    }
}

/// Compute funnel metrics for `records` fetched with `campaign_query`.
pub fn compute_funnel(records: &[MessageRecord], campaign_query: &str) -> FunnelSummary {
    let mut summary = FunnelSummary {
        query: campaign_query.to_string(),
        total: records.len(),
        exclusive: true,
        ..Default::default()
    };
    let mut reasons: HashMap<String, usize> = HashMap::new();

    for record in records {
        let state = DeliveryState::parse(&record.state);
        let opened = record.opens > 0;

        if opened {
            summary.opened += 1;
        } else {
            summary.unopened += 1;
        }

        match state {
            DeliveryState::SoftBounced => {
                summary.soft_bounced += 1;
                *reasons.entry(extract_reason(&record.diagnostic)).or_default() += 1;
            }
            DeliveryState::Bounced => summary.hard_bounced += 1,
            DeliveryState::Rejected => summary.rejected += 1,
            DeliveryState::Sent => summary.delivered += 1,
            DeliveryState::Other(_) | DeliveryState::Missing => {}
        }

        let failed = matches!(
            state,
            DeliveryState::SoftBounced | DeliveryState::Bounced | DeliveryState::Rejected
        );
        if opened && failed {
            summary.exclusive = false;
        }
    }

    summary.open_rate = open_rate(summary.opened, summary.total);

    let mut bounce_reasons: Vec<(String, usize)> = reasons.into_iter().collect();
    bounce_reasons.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    summary.bounce_reasons = bounce_reasons;

    summary
}

/// `opened / total * 100`, rounded to one decimal; zero for an empty batch.
fn open_rate(opened: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let pct = opened as f64 / total as f64 * 100.0;
    (pct * 10.0).round() / 10.0
}
