//! Alert fragments that surface the outcome of an action to the user.
//!
//! Alerts render as an out-of-band htmx swap targeting the alert container
//! that [crate::html::base] places on every page, so any fragment response
//! can carry one regardless of where the rest of the response lands.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

const SUCCESS_PANEL_STYLE: &str = "rounded-lg border border-green-300 bg-green-50 px-4 py-3 \
    text-green-800 shadow-lg dark:border-green-700 dark:bg-green-900 dark:text-green-100";

const ERROR_PANEL_STYLE: &str = "rounded-lg border border-red-300 bg-red-50 px-4 py-3 \
    text-red-800 shadow-lg dark:border-red-700 dark:bg-red-900 dark:text-red-100";

/// A transient notification shown at the bottom of the page.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// Reports that an action succeeded.
    Success {
        /// A one-line summary of what happened.
        message: String,
        /// Supporting detail, e.g. counts of affected rows.
        details: String,
    },
    /// Reports that an action failed and how to proceed.
    Error {
        /// A one-line summary of what went wrong.
        message: String,
        /// Supporting detail on what to do about it.
        details: String,
    },
    /// Reports that an action failed when there is nothing more useful to
    /// say.
    ErrorSimple {
        /// A one-line summary of what went wrong.
        message: String,
    },
}

impl Alert {
    /// Render the alert as an out-of-band swap that replaces the page's
    /// alert container.
    pub fn into_html(self) -> Markup {
        let (panel_style, message, details) = match self {
            Alert::Success { message, details } => (SUCCESS_PANEL_STYLE, message, Some(details)),
            Alert::Error { message, details } => (ERROR_PANEL_STYLE, message, Some(details)),
            Alert::ErrorSimple { message } => (ERROR_PANEL_STYLE, message, None),
        };

        html! {
            div
                id="alert-container"
                hx-swap-oob="true"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                div class=(panel_style) {
                    p class="text-sm font-medium" { (message) }

                    @if let Some(details) = details {
                        p class="mt-1 text-sm opacity-80" { (details) }
                    }
                }
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        let status_code = match &self {
            Alert::Success { .. } => StatusCode::OK,
            Alert::Error { .. } | Alert::ErrorSimple { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status_code, self.into_html()).into_response()
    }
}
