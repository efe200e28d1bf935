// ── Core error types ──
//
// Errors surfaced by the reconciliation engine. Every remote failure is
// wrapped with the operation and resource kind it happened on; the server's
// own message is carried through verbatim. `CoreError::from_api` is the
// single place transport-layer errors are translated.

use std::fmt;

use thiserror::Error;

use crate::model::{ResourceId, ResourceKind};
use crate::reconcile::Lifecycle;
use crate::validate::ValidationErrors;

/// The operation an error happened on, rendered as a verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    Plan,
    Import,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Plan => "plan",
            Self::Import => "import",
        })
    }
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Local errors (no request was sent) ───────────────────────────
    #[error("invalid {kind} configuration: {errors}")]
    Validation {
        kind: ResourceKind,
        errors: ValidationErrors,
    },

    #[error("{kind} requires replacement: {} cannot change in place", fields.join(", "))]
    RequiresReplacement {
        kind: ResourceKind,
        fields: Vec<&'static str>,
    },

    #[error("cannot {operation} a {state} {kind}")]
    InvalidTransition {
        operation: Operation,
        kind: ResourceKind,
        state: Lifecycle,
    },

    // ── Remote errors ────────────────────────────────────────────────
    #[error("{kind} {id} not found")]
    NotFound { kind: ResourceKind, id: ResourceId },

    /// The server answered with an error status. `message` is the API
    /// error rendered as-is, server text included.
    #[error("failed to {operation} {kind}: {message}")]
    Remote {
        operation: Operation,
        kind: ResourceKind,
        status: u16,
        message: String,
    },

    #[error("failed to {operation} {kind}: {message}")]
    Decode {
        operation: Operation,
        kind: ResourceKind,
        message: String,
    },

    #[error("failed to {operation} {kind}: {message}")]
    Transport {
        operation: Operation,
        kind: ResourceKind,
        message: String,
    },

    /// The object vanished before an update and creating its replacement
    /// failed too. The stale id is kept for operators chasing the trail.
    #[error("failed to recreate {kind} after {stale_id} disappeared: {source}")]
    RecreateFailed {
        kind: ResourceKind,
        stale_id: ResourceId,
        #[source]
        source: Box<CoreError>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Attach operation and kind context to a transport-layer error.
    pub fn from_api(operation: Operation, kind: ResourceKind, err: towerops_api::Error) -> Self {
        match err {
            towerops_api::Error::NotFound { .. } | towerops_api::Error::Remote { .. } => {
                Self::Remote {
                    operation,
                    kind,
                    status: err.status().unwrap_or_default(),
                    message: err.to_string(),
                }
            }
            towerops_api::Error::Decode { message, body: _ } => Self::Decode {
                operation,
                kind,
                message: format!("invalid response: {message}"),
            },
            towerops_api::Error::Transport(ref e) => Self::Transport {
                operation,
                kind,
                message: e.to_string(),
            },
            towerops_api::Error::InvalidUrl(e) => Self::Config {
                message: format!("Invalid URL: {e}"),
            },
            towerops_api::Error::InvalidToken { message }
            | towerops_api::Error::ClientBuild(message) => Self::Config { message },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// HTTP status of the underlying remote failure, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            Self::RecreateFailed { source, .. } => source.status(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn remote_error_keeps_server_text() {
        let api = towerops_api::Error::Remote {
            status: 422,
            message: None,
            field_errors: BTreeMap::from([("ip_address".into(), "is invalid".into())]),
        };
        let err = CoreError::from_api(Operation::Update, ResourceKind::Device, api);

        assert_eq!(err.status(), Some(422));
        assert_eq!(
            err.to_string(),
            "failed to update device: API validation error (422): ip_address: is invalid"
        );
    }

    #[test]
    fn recreate_failure_names_stale_id() {
        let inner = CoreError::Remote {
            operation: Operation::Create,
            kind: ResourceKind::Device,
            status: 500,
            message: "API error (500): boom".into(),
        };
        let err = CoreError::RecreateFailed {
            kind: ResourceKind::Device,
            stale_id: "dev-1".into(),
            source: Box::new(inner),
        };

        assert_eq!(err.status(), Some(500));
        assert_eq!(
            err.to_string(),
            "failed to recreate device after dev-1 disappeared: failed to create device: API error (500): boom"
        );
    }

    #[test]
    fn invalid_transition_reads_naturally() {
        let err = CoreError::InvalidTransition {
            operation: Operation::Update,
            kind: ResourceKind::Site,
            state: Lifecycle::Destroyed,
        };
        assert_eq!(err.to_string(), "cannot update a destroyed site");
    }
}
