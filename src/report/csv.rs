//! Export an address report to CSV.
//!
//! Output is UTF-8 with BOM for Excel compatibility.

use std::io::Write;
use std::path::Path;

use crate::lookup::AddressReport;

/// Columns written by [`write_csv`].
pub const HEADER: &str = "Id,Sent_At,To,Sender,Subject,State,Status,Opens,Clicks,Reason,Reject_Reason,Remediable,Tags";

/// Write one row per message of `report` to `output_path`.
pub fn export_csv(report: &AddressReport, output_path: &Path, date_format: &str) -> anyhow::Result<()> {
    let mut file = std::fs::File::create(output_path)?;
    write_csv(report, &mut file, date_format)?;
    tracing::info!(path = %output_path.display(), rows = report.messages.len(), "Exported CSV");
    Ok(())
}

/// Write the CSV document to any writer.
pub fn write_csv<W: Write>(report: &AddressReport, out: &mut W, date_format: &str) -> anyhow::Result<()> {
    // UTF-8 BOM for Excel
    out.write_all(&[0xEF, 0xBB, 0xBF])?;
    writeln!(out, "{HEADER}")?;

    for msg in &report.messages {
        let rec = &msg.record;
        let c = &msg.classified;
        let row = [
            csv_escape(&rec.id),
            csv_escape(&rec.sent_at_display(date_format)),
            csv_escape(&rec.to_email),
            csv_escape(rec.sender.as_deref().unwrap_or("")),
            csv_escape(rec.subject.as_deref().unwrap_or("")),
            csv_escape(&rec.state),
            csv_escape(&c.display_status),
            rec.opens.to_string(),
            rec.clicks.to_string(),
            csv_escape(c.diagnostic.as_deref().unwrap_or("")),
            csv_escape(c.reject_reason.as_deref().unwrap_or("")),
            c.is_remediable.to_string(),
            csv_escape(&rec.tags.join(";")),
        ];
        writeln!(out, "{}", row.join(","))?;
    }

    Ok(())
}

/// Escape a value for CSV (RFC 4180).
///
/// Wraps in double quotes if the value contains commas, quotes, or newlines.
fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
