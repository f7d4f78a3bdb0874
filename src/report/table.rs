//! Human-readable text output.

use std::fmt::Write;

use crate::classify::FunnelSummary;
use crate::lookup::{AddressReport, LookupOutcome};
use crate::remediate::BulkOutcome;

/// Render the result of an address check.
pub fn render_lookup(outcome: &LookupOutcome, date_format: &str) -> String {
    match outcome {
        LookupOutcome::NoResults => "\n  No emails found in the search window.\n".to_string(),
        LookupOutcome::NoExactMatch { searched } => format!(
            "\n  {searched} message(s) matched the search, but none were sent to exactly this address.\n"
        ),
        LookupOutcome::Found(report) => render_report(report, date_format),
    }
}

/// Render summary counts followed by one block per message.
pub fn render_report(report: &AddressReport, date_format: &str) -> String {
    let mut out = String::new();

    let _ = writeln!(out);
    let _ = writeln!(out, "  {:<20} {}", "Address", report.address);
    let _ = writeln!(out, "  {:<20} {}", "Total emails", report.summary.total);
    for (state, count) in &report.summary.counts_by_state {
        let _ = writeln!(out, "    {count:>6}  {state}");
    }

    for (i, msg) in report.messages.iter().enumerate() {
        let rec = &msg.record;
        let c = &msg.classified;
        let _ = writeln!(out);
        let _ = writeln!(out, "  #{}  {}", i + 1, "-".repeat(60));
        let _ = writeln!(
            out,
            "  {:<12} {}",
            "Subject",
            rec.subject.as_deref().unwrap_or("(no subject)")
        );
        if let Some(sender) = &rec.sender {
            let _ = writeln!(out, "  {:<12} {}", "From", sender);
        }
        let _ = writeln!(out, "  {:<12} {}", "Status", c.display_status);
        let _ = writeln!(
            out,
            "  {:<12} {}",
            "Sent at",
            rec.sent_at_display(date_format)
        );
        let _ = writeln!(
            out,
            "  {:<12} {} open(s), {} click(s)",
            "Engagement", rec.opens, rec.clicks
        );
        if !rec.tags.is_empty() {
            let _ = writeln!(out, "  {:<12} {}", "Tags", rec.tags.join(", "));
        }
        if let Some(reason) = &c.reject_reason {
            let reason = if reason.is_empty() {
                "(none given)"
            } else {
                reason.as_str()
            };
            let _ = writeln!(out, "  {:<12} {}", "Rejected", reason);
        }
        if let Some(diag) = &c.diagnostic {
            let _ = writeln!(out, "  {:<12} {}", "Reason", diag);
        }
        if c.is_remediable {
            let _ = writeln!(
                out,
                "  {:<12} run `bouncewatch unreject {}`",
                "Fix", rec.to_email
            );
        }
    }
    let _ = writeln!(out);
    out
}

/// Render funnel counts, open rate, and the top bounce reasons.
pub fn render_funnel(funnel: &FunnelSummary, top_reasons: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out);
    let _ = writeln!(out, "  {:<20} {}", "Query", funnel.query);
    let _ = writeln!(out, "  {:<20} {}", "Sent", funnel.total);
    let _ = writeln!(out, "  {:<20} {}", "Delivered", funnel.delivered);
    let _ = writeln!(
        out,
        "  {:<20} {} ({:.1}%)",
        "Opened", funnel.opened, funnel.open_rate
    );
    let _ = writeln!(out, "  {:<20} {}", "Unopened", funnel.unopened);
    let _ = writeln!(out, "  {:<20} {}", "Soft-bounced", funnel.soft_bounced);
    let _ = writeln!(out, "  {:<20} {}", "Bounced", funnel.hard_bounced);
    let _ = writeln!(out, "  {:<20} {}", "Rejected", funnel.rejected);

    if !funnel.is_exclusive() {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "  Note: some messages were both opened and bounced/rejected; the stages overlap."
        );
    }

    if !funnel.bounce_reasons.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "  Top soft-bounce reasons:");
        for (reason, count) in funnel.bounce_reasons.iter().take(top_reasons) {
            let _ = writeln!(out, "    {count:>6}  {reason}");
        }
    }
    let _ = writeln!(out);
    out
}

/// Render a bulk action result.
pub fn render_bulk(action: &str, outcome: &BulkOutcome) -> String {
    let mut out = String::new();
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "  {action}: {} of {} succeeded",
        outcome.succeeded.len(),
        outcome.attempted
    );
    if !outcome.failed.is_empty() {
        let _ = writeln!(out, "  Failed:");
        for item in &outcome.failed {
            let _ = writeln!(out, "    {}  {}", item.id, item.reason);
        }
    }
    let _ = writeln!(out);
    out
}
