//! The preview step of a statement import.
//!
//! Posting a statement file renders a fragment that lists the parsed records
//! with suggested categories, lets the user switch the date format or pick
//! the target account, and carries the raw statement text in hidden fields
//! so the next request can rebuild the import session.

use axum::{
    extract::{Multipart, State, multipart::Field},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    Error,
    account::{Account, get_all_accounts},
    category::{Category, get_all_categories},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE,
        FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, format_currency, loading_spinner,
    },
    statement_import::{
        categorize::categorize,
        date::DateFormat,
        dedupe::is_duplicate_of_any,
        import_transactions::ImportState,
        models::StatementTransaction,
        session::ImportSession,
    },
    transaction::{HistoryEntry, get_transaction_history},
};

/// The max number of graphemes to display for a record description before
/// truncating and displaying ellipses.
const MAX_DESCRIPTION_GRAPHEMES: usize = 32;

/// The fields posted by the import forms.
///
/// The initial upload posts `file`, while requests from the preview fragment
/// post the retained `raw_text` and `file_name` instead.
#[derive(Debug, Default)]
pub(super) struct ImportForm {
    pub file_name: Option<String>,
    pub raw_text: Option<String>,
    pub date_format: Option<String>,
    pub account_id: Option<String>,
}

/// Collect the known fields from a multipart import form.
///
/// Unknown fields are skipped so that the upload and preview forms can share
/// this reader.
///
/// # Errors
///
/// Returns [Error::MultipartError] when the form or one of its fields cannot
/// be read.
pub(super) async fn read_import_form(multipart: &mut Multipart) -> Result<ImportForm, Error> {
    let mut form = ImportForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| Error::MultipartError(error.to_string()))?
    {
        match field.name() {
            Some("file") => {
                // The file name must be copied out before the field is
                // consumed by reading its text.
                form.file_name = field.file_name().map(str::to_owned);
                form.raw_text = Some(read_field_text(field).await?);
            }
            Some("file_name") => form.file_name = Some(read_field_text(field).await?),
            Some("raw_text") => form.raw_text = Some(read_field_text(field).await?),
            Some("date_format") => form.date_format = Some(read_field_text(field).await?),
            Some("account_id") => form.account_id = Some(read_field_text(field).await?),
            _ => {}
        }
    }

    Ok(form)
}

async fn read_field_text(field: Field<'_>) -> Result<String, Error> {
    field.text().await.map_err(|error| {
        tracing::error!("Could not read data from multipart form field: {error}");
        Error::MultipartError("Could not read data from multipart form field.".to_owned())
    })
}

impl ImportForm {
    /// The date format picked in the form, or the default when the field is
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns [Error::UnknownDateFormat] when the posted label is not a
    /// supported format.
    pub(super) fn parse_date_format(&self) -> Result<DateFormat, Error> {
        match self.date_format.as_deref() {
            Some(label) => label.parse(),
            None => Ok(DateFormat::default()),
        }
    }

    /// The statement file name and text, when a statement was posted.
    ///
    /// # Errors
    ///
    /// Returns [Error::NoStatementSelected] when the form did not include a
    /// statement file or retained statement text.
    pub(super) fn statement(&self) -> Result<(&str, &str), Error> {
        match (self.file_name.as_deref(), self.raw_text.as_deref()) {
            (Some(file_name), Some(raw_text)) if !file_name.is_empty() => {
                Ok((file_name, raw_text))
            }
            _ => Err(Error::NoStatementSelected),
        }
    }
}

/// Route handler for previewing the records parsed from a statement file.
///
/// Renders the preview fragment on success. Errors render an alert fragment
/// that swaps into the page's alert container.
pub async fn preview_transactions(
    State(state): State<ImportState>,
    mut multipart: Multipart,
) -> Result<Response, Response> {
    let form = read_import_form(&mut multipart)
        .await
        .map_err(|error| error.into_alert_response())?;

    let date_format = form
        .parse_date_format()
        .map_err(|error| error.into_alert_response())?;
    let (file_name, raw_text) = form
        .statement()
        .map_err(|error| error.into_alert_response())?;

    let mut session = ImportSession::new();
    session
        .select_file(file_name, raw_text)
        .and_then(|()| session.preview(date_format))
        .map_err(|error| error.into_alert_response())?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError.into_alert_response()
    })?;

    let accounts = get_all_accounts(&connection).map_err(|error| error.into_alert_response())?;
    let history = get_transaction_history(&connection)
        .map_err(|error| error.into_alert_response())?;
    let categories =
        get_all_categories(&connection).map_err(|error| error.into_alert_response())?;

    let preview = preview_view(
        file_name,
        raw_text,
        date_format,
        session.records(),
        &history,
        &categories,
        &accounts,
    );

    Ok(preview.into_response())
}

/// The radio group for choosing how statement dates are read.
///
/// When `reparse_on_change` is set, changing the selection posts the
/// enclosing form to the preview endpoint so the records are re-parsed under
/// the new format.
pub(super) fn date_format_picker(selected: DateFormat, reparse_on_change: bool) -> Markup {
    let reparse_url = reparse_on_change.then_some(endpoints::IMPORT_PREVIEW);
    let reparse_trigger = reparse_on_change.then_some("change");
    let reparse_include = reparse_on_change.then_some("closest form");

    html! {
        fieldset class="space-y-2"
        {
            legend class=(FORM_LABEL_STYLE) { "Date format" }

            div class=(FORM_RADIO_GROUP_STYLE)
            {
                @for format in DateFormat::ALL
                {
                    @let id = date_format_input_id(format);

                    div class="flex items-center gap-3"
                    {
                        input
                            name="date_format"
                            id=(id)
                            type="radio"
                            value=(format)
                            checked[format == selected]
                            hx-post=[reparse_url]
                            hx-trigger=[reparse_trigger]
                            hx-include=[reparse_include]
                            required
                            tabindex="0"
                            class=(FORM_RADIO_INPUT_STYLE);

                        label
                            for=(id)
                            class=(FORM_RADIO_LABEL_STYLE)
                        {
                            (format)
                        }
                    }
                }
            }
        }
    }
}

fn date_format_input_id(format: DateFormat) -> &'static str {
    match format {
        DateFormat::MonthDayYear => "date-format-month-day-year",
        DateFormat::DayMonthYear => "date-format-day-month-year",
        DateFormat::YearMonthDay => "date-format-year-month-day",
    }
}

fn preview_view(
    file_name: &str,
    raw_text: &str,
    date_format: DateFormat,
    records: &[StatementTransaction],
    history: &[HistoryEntry],
    categories: &[Category],
    accounts: &[Account],
) -> Markup {
    let import_route = endpoints::IMPORT;
    let spinner = loading_spinner();
    let record_count = records.len();

    html! {
        form
            hx-post=(import_route)
            hx-encoding="multipart/form-data"
            hx-target="#import-preview"
            hx-target-error="#alert-container"
            hx-disabled-elt="#account_id, #confirm-button"
            hx-indicator="#indicator"
            class="space-y-4 w-full"
        {
            input type="hidden" name="file_name" value=(file_name);
            textarea name="raw_text" class="hidden" { (raw_text) }

            p class="text-sm text-gray-500 dark:text-gray-400"
            {
                @if record_count == 1
                {
                    "1 record found in " (file_name) "."
                }
                @else
                {
                    (record_count) " records found in " (file_name) "."
                }
            }

            @if !records.is_empty()
            {
                (records_table(records, history, categories))
            }

            (date_format_picker(date_format, true))

            div
            {
                label
                    for="account_id"
                    class=(FORM_LABEL_STYLE)
                {
                    "Import into account"
                }

                select
                    name="account_id"
                    id="account_id"
                    required
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="all" { "Select an account" }

                    @for account in accounts
                    {
                        option value=(account.id) { (account.name) }
                    }
                }
            }

            button
                type="submit"
                id="confirm-button"
                class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator" { (spinner) }
                " Import Records"
            }

            p class="text-center"
            {
                a href=(endpoints::IMPORT_VIEW) class=(LINK_STYLE) { "Cancel and choose a different file" }
            }
        }
    }
}

fn records_table(
    records: &[StatementTransaction],
    history: &[HistoryEntry],
    categories: &[Category],
) -> Markup {
    html! {
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
                        th scope="col" class="px-6 py-3" { "Suggested Category" }
                        th scope="col" class="px-6 py-3 text-right" { "Amount" }
                    }
                }

                tbody
                {
                    @for record in records
                    {
                        (preview_row(record, history, categories))
                    }
                }
            }
        }
    }
}

fn preview_row(
    record: &StatementTransaction,
    history: &[HistoryEntry],
    categories: &[Category],
) -> Markup {
    let suggestion = categorize(&record.description, history, categories);
    let looks_like_duplicate = is_duplicate_of_any(record, history);
    let (description, tooltip) = format_description(&record.description);
    let category = category_label(&suggestion.group_name, &suggestion.category_name);
    let amount_str = format_currency(record.amount);
    let amount_class = amount_class(record.amount);

    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class="px-6 py-4 whitespace-nowrap" { (record.date) }
            td class="px-6 py-4" title=[tooltip]
            {
                (description)

                @if looks_like_duplicate
                {
                    span class="ml-2 text-xs text-amber-600 dark:text-amber-400" { "duplicate" }
                }
            }
            td class="px-6 py-4" { (category) }
            td class={ "px-6 py-4 text-right tabular-nums " (amount_class) } { (amount_str) }
        }
    }
}

pub(super) fn amount_class(amount: f64) -> &'static str {
    if amount < 0.0 {
        "text-red-700 dark:text-red-300"
    } else {
        "text-green-700 dark:text-green-300"
    }
}

pub(super) fn format_description(description: &str) -> (String, Option<&str>) {
    let description_length = description.graphemes(true).count();

    if description_length <= MAX_DESCRIPTION_GRAPHEMES {
        (description.to_owned(), None)
    } else {
        let truncated: String = description
            .graphemes(true)
            .take(MAX_DESCRIPTION_GRAPHEMES - 3)
            .collect();

        (truncated + "...", Some(description))
    }
}

/// Join a group and category name for display, e.g. "Food / Dining Out".
pub(super) fn category_label(group_name: &str, category_name: &str) -> String {
    if group_name.is_empty() {
        category_name.to_owned()
    } else {
        format!("{group_name} / {category_name}")
    }
}


#[cfg(test)]
mod preview_transactions_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{FromRequest, Multipart, State},
        http::{Request, StatusCode},
        response::Response,
    };
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        account::create_account,
        category::{CategoryName, create_category},
        db::initialize,
        endpoints,
        statement_import::import_transactions::ImportState,
        test_utils::{assert_status_ok, assert_valid_html, parse_html_fragment},
        transaction::{Transaction, create_transaction},
    };

    use super::preview_transactions;

    const QIF_STATEMENT: &str = "D01/02/2025\nT-12.30\nPCOUNTDOWN AUCKLAND\n^\nD01/03/2025\nT-4.50\nPSTARBUCKS 5678\n^\n";

    fn get_test_state() -> ImportState {
        let connection = Connection::open_in_memory().expect("could not open database in memory");
        initialize(&connection).expect("could not initialize database");

        ImportState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    async fn must_make_multipart(fields: &[(&str, &str)], file: Option<(&str, &str)>) -> Multipart {
        let boundary = "MY_BOUNDARY123456789";
        let mut lines: Vec<String> = Vec::new();

        for (name, value) in fields {
            lines.push(format!("--{boundary}"));
            lines.push(format!("Content-Disposition: form-data; name=\"{name}\""));
            lines.push("".to_owned());
            lines.push((*value).to_owned());
        }

        if let Some((file_name, content)) = file {
            lines.push(format!("--{boundary}"));
            lines.push(format!(
                "Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\""
            ));
            lines.push("Content-Type: application/octet-stream".to_owned());
            lines.push("".to_owned());
            lines.push(content.to_owned());
        }

        lines.push(format!("--{boundary}--"));

        let data = lines.join("\r\n").into_bytes();

        let request = Request::builder()
            .method("POST")
            .uri(endpoints::IMPORT_PREVIEW)
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(data.into())
            .unwrap();

        Multipart::from_request(request, &{}).await.unwrap()
    }

    async fn must_parse_fragment(response: Response) -> Html {
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);

        html
    }

    fn select_all<'a>(html: &'a Html, selector: &str) -> Vec<scraper::ElementRef<'a>> {
        html.select(&Selector::parse(selector).unwrap()).collect()
    }

    #[tokio::test]
    async fn preview_renders_parsed_records() {
        let state = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            create_account("Checking", &connection).unwrap();
        }

        let response = preview_transactions(
            State(state),
            must_make_multipart(&[("date_format", "MM/DD/YYYY")], Some(("statement.qif", QIF_STATEMENT))).await,
        )
        .await
        .unwrap();

        assert_status_ok(&response);
        let html = must_parse_fragment(response).await;

        let form = select_all(&html, "form");
        assert_eq!(form.len(), 1, "want 1 form in the preview fragment");
        assert_eq!(form[0].value().attr("hx-post"), Some(endpoints::IMPORT));

        let hidden_file_name = select_all(&html, "input[name=\"file_name\"]");
        assert_eq!(hidden_file_name.len(), 1);
        assert_eq!(
            hidden_file_name[0].value().attr("value"),
            Some("statement.qif")
        );

        let raw_text = select_all(&html, "textarea[name=\"raw_text\"]");
        assert_eq!(raw_text.len(), 1, "want the raw statement text retained");
        let retained = raw_text[0].text().collect::<String>();
        assert!(
            retained.contains("COUNTDOWN AUCKLAND"),
            "want raw statement text in textarea, got {retained:?}"
        );

        let rows = select_all(&html, "tbody tr");
        assert_eq!(rows.len(), 2, "want 2 preview rows");

        let dates: Vec<String> = rows
            .iter()
            .map(|row| {
                row.select(&Selector::parse("td").unwrap())
                    .next()
                    .unwrap()
                    .text()
                    .collect::<String>()
            })
            .collect();
        assert_eq!(dates, vec!["2025-01-02", "2025-01-03"]);

        let account_options = select_all(&html, "select[name=\"account_id\"] option");
        assert_eq!(account_options.len(), 2, "want placeholder plus 1 account");
        assert_eq!(account_options[0].value().attr("value"), Some("all"));
        assert_eq!(
            account_options[1].text().collect::<String>(),
            "Checking".to_owned()
        );

        let checked_radios = select_all(&html, "input[type=\"radio\"][checked]");
        assert_eq!(checked_radios.len(), 1);
        assert_eq!(checked_radios[0].value().attr("value"), Some("MM/DD/YYYY"));
    }

    #[tokio::test]
    async fn preview_accepts_retained_text_and_reparses_dates() {
        let state = get_test_state();

        let response = preview_transactions(
            State(state),
            must_make_multipart(
                &[
                    ("file_name", "statement.qif"),
                    ("raw_text", "D01/02/2025\nT-1.00\nPCOFFEE\n^\n"),
                    ("date_format", "DD/MM/YYYY"),
                ],
                None,
            )
            .await,
        )
        .await
        .unwrap();

        assert_status_ok(&response);
        let html = must_parse_fragment(response).await;

        let first_cell = select_all(&html, "tbody tr td")[0]
            .text()
            .collect::<String>();
        assert_eq!(first_cell, "2025-02-01");
    }

    #[tokio::test]
    async fn preview_suggests_categories_from_history() {
        let state = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            let account = create_account("Checking", &connection).unwrap();
            let dining_out =
                create_category(CategoryName::new("Dining Out").unwrap(), "Food", &connection)
                    .unwrap();
            create_transaction(
                Transaction::build(-5.60, date!(2025 - 03 - 14), "STARBUCKS 1234", account.id)
                    .category_id(dining_out.id),
                &connection,
            )
            .unwrap();
        }

        let response = preview_transactions(
            State(state),
            must_make_multipart(&[], Some(("statement.qif", QIF_STATEMENT))).await,
        )
        .await
        .unwrap();

        let html = must_parse_fragment(response).await;
        let fragment_text = html.root_element().text().collect::<String>();
        assert!(
            fragment_text.contains("Food / Dining Out"),
            "want a category suggestion for the repeat merchant, got {fragment_text:?}"
        );
    }

    #[tokio::test]
    async fn preview_marks_duplicates() {
        let state = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            let account = create_account("Checking", &connection).unwrap();
            create_transaction(
                Transaction::build(-12.30, date!(2025 - 01 - 02), "COUNTDOWN AUCKLAND", account.id),
                &connection,
            )
            .unwrap();
        }

        let response = preview_transactions(
            State(state),
            must_make_multipart(&[], Some(("statement.qif", QIF_STATEMENT))).await,
        )
        .await
        .unwrap();

        let html = must_parse_fragment(response).await;
        let markers = select_all(&html, "tbody span");
        assert_eq!(markers.len(), 1, "want exactly 1 duplicate marker");
        assert_eq!(markers[0].text().collect::<String>(), "duplicate");
    }

    #[tokio::test]
    async fn unsupported_file_type_renders_error_alert() {
        let state = get_test_state();

        let response = preview_transactions(
            State(state),
            must_make_multipart(&[], Some(("statement.csv", "Date,Amount\n"))).await,
        )
        .await
        .unwrap_err();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = must_parse_fragment(response).await;
        let message = select_all(&html, "p.text-sm.font-medium")[0]
            .text()
            .collect::<String>();
        assert_eq!(message.trim(), "Unsupported file type");
    }

    #[tokio::test]
    async fn empty_ofx_renders_error_alert() {
        let state = get_test_state();

        let response = preview_transactions(
            State(state),
            must_make_multipart(&[], Some(("statement.ofx", "<OFX></OFX>"))).await,
        )
        .await
        .unwrap_err();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = must_parse_fragment(response).await;
        let message = select_all(&html, "p.text-sm.font-medium")[0]
            .text()
            .collect::<String>();
        assert_eq!(message.trim(), "Could not read the OFX statement");
    }

    #[tokio::test]
    async fn missing_statement_renders_error_alert() {
        let state = get_test_state();

        let response = preview_transactions(
            State(state),
            must_make_multipart(&[("date_format", "MM/DD/YYYY")], None).await,
        )
        .await
        .unwrap_err();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = must_parse_fragment(response).await;
        let message = select_all(&html, "p.text-sm.font-medium")[0]
            .text()
            .collect::<String>();
        assert_eq!(message.trim(), "No statement selected");
    }

    #[tokio::test]
    async fn unknown_date_format_renders_error_alert() {
        let state = get_test_state();

        let response = preview_transactions(
            State(state),
            must_make_multipart(
                &[("date_format", "DD.MM.YYYY")],
                Some(("statement.qif", QIF_STATEMENT)),
            )
            .await,
        )
        .await
        .unwrap_err();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = must_parse_fragment(response).await;
        let message = select_all(&html, "p.text-sm.font-medium")[0]
            .text()
            .collect::<String>();
        assert_eq!(message.trim(), "Unknown date format");
    }
}
