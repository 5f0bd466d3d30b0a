//! The final step of a statement import.
//!
//! Confirming an import rebuilds the session from the posted form, runs
//! duplicate detection and categorization, saves the surviving records in
//! one batch, and responds with a summary table plus a success alert.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    html::{LINK_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, format_currency},
    statement_import::{
        alert::import_success,
        models::ImportSummary,
        preview::{amount_class, category_label, format_description, read_import_form},
        session::ImportSession,
    },
};

/// The state needed for importing statement transactions.
#[derive(Debug, Clone)]
pub struct ImportState {
    /// The database connection for reading history and saving transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ImportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Route handler for confirming a statement import.
///
/// Rebuilds the import session from the posted form, saves the records that
/// pass duplicate detection, and renders a summary of what was imported.
/// Errors render an alert fragment that swaps into the page's alert
/// container and leave the database untouched.
pub async fn import_transactions(
    State(state): State<ImportState>,
    mut multipart: Multipart,
) -> Result<Response, Response> {
    let start_time = std::time::Instant::now();

    let form = read_import_form(&mut multipart)
        .await
        .map_err(|error| error.into_alert_response())?;

    let date_format = form
        .parse_date_format()
        .map_err(|error| error.into_alert_response())?;
    let (file_name, raw_text) = form
        .statement()
        .map_err(|error| error.into_alert_response())?;
    let account_selection = form.account_id.as_deref().unwrap_or_default();

    let mut session = ImportSession::new();
    session
        .select_file(file_name, raw_text)
        .and_then(|()| session.preview(date_format))
        .map_err(|error| error.into_alert_response())?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError.into_alert_response()
    })?;

    let summary = session
        .confirm(account_selection, &connection)
        .map_err(|error| error.into_alert_response())?;

    let duration = start_time.elapsed();
    let alert = import_success(&summary, duration);

    let body = html! {
        (imported_records_view(&summary))
        (alert.into_html())
    };

    Ok((StatusCode::CREATED, body).into_response())
}

fn imported_records_view(summary: &ImportSummary) -> Markup {
    html! {
        div class="space-y-4 w-full"
        {
            p class="text-sm text-gray-500 dark:text-gray-400"
            {
                "Imported " (summary.imported) " of " (summary.total) " records ("
                (summary.duplicates) " duplicates, " (summary.skipped) " skipped)."
            }

            @if !summary.records.is_empty()
            {
                div class="relative overflow-x-auto rounded"
                {
                    table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class="px-6 py-3" { "Date" }
                                th scope="col" class="px-6 py-3" { "Description" }
                                th scope="col" class="px-6 py-3" { "Category" }
                                th scope="col" class="px-6 py-3 text-right" { "Amount" }
                            }
                        }

                        tbody
                        {
                            @for record in &summary.records
                            {
                                @let (description, tooltip) = format_description(&record.description);
                                @let category = category_label(&record.group_name, &record.category_name);

                                tr class=(TABLE_ROW_STYLE)
                                {
                                    td class="px-6 py-4 whitespace-nowrap" { (record.date) }
                                    td class="px-6 py-4" title=[tooltip] { (description) }
                                    td class="px-6 py-4" { (category) }
                                    td class={ "px-6 py-4 text-right tabular-nums " (amount_class(record.amount)) }
                                    {
                                        (format_currency(record.amount))
                                    }
                                }
                            }
                        }
                    }
                }
            }

            p class="text-center"
            {
                a href=(endpoints::IMPORT_VIEW) class=(LINK_STYLE) { "Import another statement" }
            }
        }
    }
}
