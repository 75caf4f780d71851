//! Human-readable delivery summary.

use std::fmt::Write;

use mxsend_smtp::DeliveryReport;

/// Formats one block per recipient group.
pub fn render(report: &DeliveryReport) -> String {
    let mut out = String::new();

    for group in &report.groups {
        match &group.result {
            Ok(delivered) => {
                let _ = writeln!(
                    out,
                    "{}: delivered via {} ({}), {} accepted: {}",
                    group.domain,
                    delivered.server,
                    delivered.security,
                    delivered.accepted.len(),
                    delivered.reply,
                );
                for rejection in &delivered.rejected {
                    let _ = writeln!(out, "  rejected {rejection}");
                }
            }
            Err(err) => {
                let _ = writeln!(out, "{}: failed: {err}", group.domain);
                for recipient in &group.recipients {
                    let _ = writeln!(out, "  not delivered <{recipient}>");
                }
            }
        }
    }

    out
}
