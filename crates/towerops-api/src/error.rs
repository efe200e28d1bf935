use std::collections::BTreeMap;
use std::fmt::Write as _;

use thiserror::Error;

/// Top-level error type for the `towerops-api` crate.
///
/// One variant per outcome class of a single HTTP exchange. `towerops-core`
/// decides what each one means for the resource lifecycle (a 404 is a
/// recovery signal on update and a success on delete).
#[derive(Debug, Error)]
pub enum Error {
    // ── Remote outcomes ─────────────────────────────────────────────
    /// The addressed object does not exist (HTTP 404).
    #[error("resource not found: {path}")]
    NotFound { path: String },

    /// Any other non-2xx response. Carries whatever the body explained.
    #[error("{}", render_remote(*status, message.as_deref(), field_errors))]
    Remote {
        status: u16,
        message: Option<String>,
        field_errors: BTreeMap<String, String>,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// A 2xx body that is not the expected JSON, with the raw body for debugging.
    #[error("failed to decode response: {message}")]
    Decode { message: String, body: String },

    // ── Transport ───────────────────────────────────────────────────
    /// Connection refused, DNS failure, timeout, broken body stream.
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Base URL or resource path could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Setup ───────────────────────────────────────────────────────
    /// The API token cannot be carried in an HTTP header.
    #[error("invalid API token: {message}")]
    InvalidToken { message: String },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),
}

impl Error {
    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` for connection-level failures worth retrying at a
    /// higher layer. Nothing in this crate retries.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Remote { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// HTTP status of the failed exchange, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            Self::Remote { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

fn render_remote(
    status: u16,
    message: Option<&str>,
    field_errors: &BTreeMap<String, String>,
) -> String {
    if let Some(message) = message {
        return format!("API error ({status}): {message}");
    }
    if field_errors.is_empty() {
        return format!("API error ({status})");
    }

    let mut out = format!("API validation error ({status}):");
    for (i, (field, reason)) in field_errors.iter().enumerate() {
        let sep = if i == 0 { " " } else { "; " };
        let _ = write!(out, "{sep}{field}: {reason}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_message_is_verbatim() {
        let err = Error::Remote {
            status: 400,
            message: Some("name is required".into()),
            field_errors: BTreeMap::new(),
        };
        assert_eq!(err.to_string(), "API error (400): name is required");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn remote_field_errors_are_listed() {
        let field_errors = BTreeMap::from([
            ("ip_address".to_owned(), "is invalid".to_owned()),
            ("name".to_owned(), "is too short".to_owned()),
        ]);
        let err = Error::Remote {
            status: 422,
            message: None,
            field_errors,
        };
        assert_eq!(
            err.to_string(),
            "API validation error (422): ip_address: is invalid; name: is too short"
        );
    }

    #[test]
    fn server_errors_are_transient() {
        let err = Error::Remote {
            status: 503,
            message: None,
            field_errors: BTreeMap::new(),
        };
        assert!(err.is_transient());
        assert!(!err.is_not_found());
    }
}
