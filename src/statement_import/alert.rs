//! Builds the alert shown once a statement import has finished.

use std::{sync::OnceLock, time::Duration};

use numfmt::{Formatter, Precision};

use crate::{Alert, statement_import::models::ImportSummary};

/// Creates the alert summarising a finished statement import.
///
/// The wording changes with the outcome: a statement may contain no records
/// at all, every record may be screened out as a duplicate or left without a
/// category, or some subset may be saved.
pub(super) fn import_success(summary: &ImportSummary, duration: Duration) -> Alert {
    let formatter = get_thousands_separator_formatter();
    let duration_ms = formatter.fmt_string(duration.as_millis());

    match (summary.imported, summary.total) {
        (0, 0) => Alert::Success {
            message: "Import completed".to_owned(),
            details: format!("The statement contained no records. Completed in {duration_ms}ms."),
        },
        (0, total) => Alert::Success {
            message: "Import completed".to_owned(),
            details: format!(
                "None of the {total} records were saved: {} duplicates, {} without a matching category. Completed in {duration_ms}ms.",
                summary.duplicates, summary.skipped
            ),
        },
        (imported, total) if imported == total => Alert::Success {
            message: "Import completed successfully!".to_owned(),
            details: format!("Imported {imported} records in {duration_ms}ms."),
        },
        (imported, total) => Alert::Success {
            message: "Import completed successfully!".to_owned(),
            details: format!(
                "Imported {imported} of {total} records in {duration_ms}ms ({} duplicates, {} without a matching category).",
                summary.duplicates, summary.skipped
            ),
        },
    }
}

/// Returns a formatter that inserts thousands separators into a number, e.g.
/// 1234567 -> 1,234,567.
fn get_thousands_separator_formatter() -> &'static Formatter {
    static FORMATTER: OnceLock<Formatter> = OnceLock::new();

    FORMATTER.get_or_init(|| {
        Formatter::new()
            .separator(',')
            .unwrap()
            .precision(Precision::Decimals(0))
    })
}
