//! A self-hosted personal budgeting app built around importing bank
//! statements.
//!
//! Transactions are imported from QIF and OFX statement exports, checked
//! against existing transactions for duplicates, and filed under spending
//! categories automatically.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

pub mod account;
mod alert;
mod app_state;
pub mod category;
pub mod db;
pub mod endpoints;
mod html;
mod internal_server_error;
mod logging;
mod not_found;
mod routing;
pub mod statement_import;
pub mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;

use alert::Alert;
use internal_server_error::internal_server_error_response;
use not_found::not_found_response;

/// Shut down the server gracefully when the user presses Ctrl+C or the
/// process receives a termination signal.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Received shutdown signal.");

    handle.graceful_shutdown(Some(Duration::from_secs(1)));
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A statement file had an extension other than `.qif` or `.ofx`.
    #[error("\"{0}\" is not a supported statement file, expected a .qif or .ofx file")]
    UnsupportedFileType(String),

    /// An OFX statement could not be read.
    #[error("could not read the OFX statement: {0}")]
    InvalidOfx(String),

    /// An import was confirmed without choosing a specific account.
    #[error("an account must be selected before importing transactions")]
    NoAccountSelected,

    /// An import step was attempted before a statement file was selected.
    #[error("no statement file has been selected")]
    NoStatementSelected,

    /// A statement file was selected while another import was underway.
    #[error("another statement import is already in progress")]
    ImportInProgress,

    /// A date string could not be resolved to a real calendar date.
    #[error("\"{0}\" is not a valid calendar date")]
    InvalidDate(String),

    /// A date format label did not match any supported format.
    #[error("\"{0}\" is not a recognized date format")]
    UnknownDateFormat(String),

    /// A category name was empty or all whitespace.
    #[error("category names must not be empty")]
    EmptyCategoryName,

    /// An account name clashed with an existing account.
    #[error("an account named \"{0}\" already exists")]
    DuplicateAccountName(String),

    /// A transaction referred to an account or category that does not exist.
    #[error("the transaction refers to an account or category that does not exist")]
    InvalidTransactionReference,

    /// A multipart form could not be read.
    #[error("could not read the uploaded form: {0}")]
    MultipartError(String),

    /// The requested resource does not exist.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// The database lock could not be acquired.
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(error: rusqlite::Error) -> Self {
        match error {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {error}");
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => not_found_response(),
            error => {
                tracing::error!("an unhandled error occurred: {error}");
                internal_server_error_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an alert fragment response for htmx requests.
    ///
    /// Unlike the [IntoResponse] implementation, which renders a full error
    /// page, this renders a small HTML fragment that swaps into the page's
    /// alert container.
    pub fn into_alert_response(self) -> Response {
        match self {
            Error::UnsupportedFileType(file_name) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Unsupported file type".to_owned(),
                    details: format!(
                        "\"{file_name}\" is not a QIF or OFX statement. \
                        Choose a file ending in .qif or .ofx."
                    ),
                }
                .into_html(),
            )
                .into_response(),
            Error::InvalidOfx(details) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Could not read the OFX statement".to_owned(),
                    details: format!(
                        "{details}. Check that the file is an OFX export from your bank."
                    ),
                }
                .into_html(),
            )
                .into_response(),
            Error::NoAccountSelected => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Select an account".to_owned(),
                    details: "Choose which account these transactions belong to \
                        before importing."
                        .to_owned(),
                }
                .into_html(),
            )
                .into_response(),
            Error::NoStatementSelected => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "No statement selected".to_owned(),
                    details: "Choose a statement file to upload first.".to_owned(),
                }
                .into_html(),
            )
                .into_response(),
            Error::InvalidDate(date) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid transaction date".to_owned(),
                    details: format!(
                        "\"{date}\" is not a valid calendar date. Nothing was imported."
                    ),
                }
                .into_html(),
            )
                .into_response(),
            Error::UnknownDateFormat(label) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Unknown date format".to_owned(),
                    details: format!("\"{label}\" is not a recognized date format."),
                }
                .into_html(),
            )
                .into_response(),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Not found".to_owned(),
                    details: "The requested item could not be found. \
                        Try refreshing the page."
                        .to_owned(),
                }
                .into_html(),
            )
                .into_response(),
            error => {
                tracing::error!("an unhandled error occurred: {error}");

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert::ErrorSimple {
                        message: "Something went wrong, please try again later".to_owned(),
                    }
                    .into_html(),
                )
                    .into_response()
            }
        }
    }
}
