//! The single `{ "error": "..." }` shape every endpoint fails with.

use std::any::Any;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use vizrelay_core::TableauError;

/// Body returned for every failure. The browser shows `error` verbatim.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug)]
pub enum ApiError {
    /// A required field was absent or empty. Holds the field's wire name.
    MissingParameter(&'static str),
    Tableau(TableauError),
    MalformedBody(String),
}

impl ApiError {
    pub fn message(&self) -> String {
        match self {
            Self::MissingParameter(name) => format!("Error: parameter '{name}' not provided"),
            Self::Tableau(err) => err.user_message(),
            Self::MalformedBody(reason) => format!("Error: invalid request body: {reason}"),
        }
    }
}

impl From<TableauError> for ApiError {
    fn from(err: TableauError) -> Self {
        Self::Tableau(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedBody(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::MissingParameter(name) => {
                tracing::info!(parameter = *name, "rejected request with missing parameter")
            }
            Self::Tableau(err) => tracing::warn!(error = %err, "tableau call failed"),
            Self::MalformedBody(reason) => {
                tracing::warn!(reason = %reason, "rejected malformed request body")
            }
        }

        // The wizard treats any non-200 status as a transport failure and only
        // renders `error` from successful responses.
        (
            StatusCode::OK,
            Json(ErrorBody {
                error: self.message(),
            }),
        )
            .into_response()
    }
}

/// Passes a non-empty value through, otherwise names the missing field.
pub fn require<'a>(value: Option<&'a str>, name: &'static str) -> Result<&'a str, ApiError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(ApiError::MissingParameter(name))
}

/// Response for a handler that panicked, installed through `CatchPanicLayer`.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = %detail, "request handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: "Error: unexpected failure while handling the request".to_string(),
        }),
    )
        .into_response()
}
