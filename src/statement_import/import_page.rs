use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

use crate::{
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_TEXT_INPUT_STYLE, base, loading_spinner},
    statement_import::{date::DateFormat, preview::date_format_picker},
};

fn import_form_view() -> Markup {
    let preview_route = endpoints::IMPORT_PREVIEW;
    let spinner = loading_spinner();

    html! {
        form
            hx-post=(preview_route)
            enctype="multipart/form-data"
            hx-target="#import-preview"
            hx-target-error="#alert-container"
            hx-disabled-elt="#statement-file, #preview-button"
            hx-indicator="#indicator"
            class="space-y-4 md:space-y-6"
        {
            div
            {
                label
                    for="statement-file"
                    class="block mb-2 text-sm font-medium text-gray-900 dark:text-white"
                {
                    "Choose a statement to upload"
                }

                input
                    id="statement-file"
                    type="file"
                    name="file"
                    accept=".qif,.ofx"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);

                p
                {
                    "Export a statement from your bank in QIF or OFX format and upload it \
                    here to preview the transactions before they are imported."
                }
            }

            (date_format_picker(DateFormat::default(), false))

            button
                type="submit"
                id="preview-button"
                class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator" { (spinner) }
                " Preview Records"
            }
        }
    }
}

fn import_view() -> Markup {
    let form = import_form_view();

    let content = html! {
        div
            class="flex flex-col items-center px-6 py-8 mx-auto lg:py-0
            text-gray-900 dark:text-white"
        {
            div class="relative w-full max-w-4xl space-y-6"
            {
                h1
                    class="text-xl font-bold leading-tight tracking-tight text-gray-900
                    md:text-2xl dark:text-white"
                {
                    "Import Statement"
                }

                (form)

                div id="import-preview" class="w-full" {}
            }
        }
    };

    base("Import Statement", &content)
}

/// Route handler for the statement import page.
pub async fn get_import_page() -> Response {
    import_view().into_response()
}
