//! Defines the page to display when a route does not exist.
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::html::error_view;

/// Route handler for requests that match no route.
pub async fn get_404_not_found() -> Response {
    not_found_response()
}

pub(crate) fn not_found_response() -> Response {
    (
        StatusCode::NOT_FOUND,
        Html(
            error_view(
                "Not Found",
                "404",
                "Sorry, that page does not exist.",
                "Check the address or head back to the homepage",
            )
            .into_string(),
        ),
    )
        .into_response()
}
