use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Shown to the user whenever Tableau's own error message cannot be recovered.
pub const GENERIC_UPSTREAM_MESSAGE: &str =
    "Error: Tableau threw an error while making a REST API call";

#[derive(Debug, Error)]
pub enum TableauError {
    #[error("tableau returned {status}: {message}")]
    Upstream { status: u16, message: String },
    #[error("http error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl TableauError {
    /// The message handed back to the browser. Transport and decode failures
    /// carry internals that are logged instead of surfaced.
    pub fn user_message(&self) -> String {
        match self {
            Self::Upstream { message, .. } => message.clone(),
            Self::Transport(_) | Self::UnexpectedShape(_) => GENERIC_UPSTREAM_MESSAGE.to_string(),
            Self::InvalidRequest(reason) => format!("Error: {reason}"),
        }
    }

    pub(crate) fn from_send(err: reqwest::Error) -> Self {
        if err.is_builder() {
            Self::InvalidRequest(err.to_string())
        } else {
            Self::Transport(err)
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<UpstreamErrorBody>,
}

#[derive(Debug, Deserialize)]
struct UpstreamErrorBody {
    summary: Option<String>,
    detail: Option<String>,
}

/// Pull `error.summary` and `error.detail` out of a Tableau error body and join
/// them. Returns `None` when the body is not a recognizable error envelope.
pub fn extract_error_message(body: &str) -> Option<String> {
    let envelope: ErrorEnvelope = serde_json::from_str(body).ok()?;
    let error = envelope.error?;

    let summary = error.summary.filter(|s| !s.trim().is_empty());
    let detail = error.detail.filter(|d| !d.trim().is_empty());

    match (summary, detail) {
        (Some(summary), Some(detail)) => Some(format!("{summary}: {detail}")),
        (Some(only), None) | (None, Some(only)) => Some(only),
        (None, None) => None,
    }
}

pub(crate) fn normalize_failure(status: StatusCode, body: &str) -> TableauError {
    let message = extract_error_message(body).unwrap_or_else(|| {
        tracing::warn!(
            status = status.as_u16(),
            body = %body,
            "tableau error response did not match the expected envelope"
        );
        GENERIC_UPSTREAM_MESSAGE.to_string()
    });

    TableauError::Upstream {
        status: status.as_u16(),
        message,
    }
}
