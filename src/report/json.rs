//! JSON output.

use serde_json::{json, Value};

use crate::classify::FunnelSummary;
use crate::lookup::LookupOutcome;
use crate::remediate::BulkOutcome;

/// JSON for an address check. Send times are rendered as RFC 3339 or null.
pub fn lookup_json(outcome: &LookupOutcome) -> Value {
    match outcome {
        LookupOutcome::Found(report) => {
            let messages: Vec<Value> = report
                .messages
                .iter()
                .map(|m| {
                    json!({
                        "id": m.record.id,
                        "to": m.record.to_email,
                        "subject": m.record.subject,
                        "sender": m.record.sender,
                        "tags": m.record.tags,
                        "state": m.record.state,
                        "status": m.classified.display_status,
                        "sent_at": m.record.sent_at_utc().map(|d| d.to_rfc3339()),
                        "opens": m.record.opens,
                        "clicks": m.record.clicks,
                        "diagnostic": m.classified.diagnostic,
                        "reject_reason": m.classified.reject_reason,
                        "remediable": m.classified.is_remediable,
                    })
                })
                .collect();
            json!({
                "outcome": "found",
                "address": report.address,
                "total": report.summary.total,
                "counts_by_state": report.summary.counts_by_state,
                "messages": messages,
            })
        }
        other => serde_json::to_value(other).unwrap_or(Value::Null),
    }
}

/// JSON for a funnel summary.
pub fn funnel_json(funnel: &FunnelSummary) -> Value {
    let reasons: Vec<Value> = funnel
        .bounce_reasons
        .iter()
        .map(|(reason, count)| json!({ "reason": reason, "count": count }))
        .collect();
    json!({
        "query": funnel.query,
        "total": funnel.total,
        "delivered": funnel.delivered,
        "opened": funnel.opened,
        "unopened": funnel.unopened,
        "soft_bounced": funnel.soft_bounced,
        "bounced": funnel.hard_bounced,
        "rejected": funnel.rejected,
        "open_rate": funnel.open_rate,
        "exclusive": funnel.is_exclusive(),
        "bounce_reasons": reasons,
    })
}

/// JSON for a bulk action result.
pub fn bulk_json(action: &str, outcome: &BulkOutcome) -> Value {
    json!({
        "action": action,
        "complete": outcome.is_complete(),
        "attempted": outcome.attempted,
        "succeeded": outcome.succeeded,
        "failed": outcome.failed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::build_report;
    use crate::model::MessageRecord;

    #[test]
    fn test_lookup_json_found() {
        let report = build_report(
            "a@b.com",
            vec![MessageRecord {
                id: "m1".into(),
                to_email: "a@b.com".into(),
                state: "sent".into(),
                sent_at: Some(0),
                sender: Some("otp@shop.example".into()),
                tags: vec!["otp".into()],
                ..Default::default()
            }],
        );
        let v = lookup_json(&LookupOutcome::Found(report));
        assert_eq!(v["messages"][0]["sender"], "otp@shop.example");
        assert_eq!(v["messages"][0]["tags"][0], "otp");
        assert_eq!(v["outcome"], "found");
        assert_eq!(v["counts_by_state"]["sent"], 1);
        assert_eq!(v["messages"][0]["status"], "Delivered");
        assert_eq!(v["messages"][0]["sent_at"], "1970-01-01T00:00:00+00:00");
        assert!(v["messages"][0]["diagnostic"].is_null());
    }

    #[test]
    fn test_lookup_json_no_results() {
        let v = lookup_json(&LookupOutcome::NoResults);
        assert_eq!(v["outcome"], "no_results");
    }
}
