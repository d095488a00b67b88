//! Error types for the runbook dispatch core.
//!
//! InputError    -> pre-flight problems (Warning)
//! TransportError -> trust store / client construction (Critical)
//! DispatchError -> anything that fails during Create or Invoke (Critical)

use std::path::PathBuf;

use thiserror::Error;

use super::outcome::Phase;

/// Required configuration missing or malformed, detected before any network call.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("--sensu-api-url flag or $SENSU_API_URL environment variable must be set")]
    MissingApiUrl,

    #[error("invalid Sensu API URL '{url}': {reason}")]
    InvalidApiUrl { url: String, reason: String },

    #[error("--namespace flag or $SENSU_NAMESPACE environment variable must be set")]
    MissingNamespace,

    #[error("--command flag or $SENSU_RUNBOOK_COMMAND environment variable must be set")]
    MissingCommand,

    #[error("--subscriptions flag or $SENSU_RUNBOOK_SUBSCRIPTIONS environment variable must be set")]
    MissingSubscriptions,

    #[error("--timeout must be a positive number of seconds (got {0})")]
    InvalidTimeout(String),

    #[error("config file {path}: {reason}")]
    ConfigFile { path: String, reason: String },
}

/// Failure while assembling the TLS trust store or the HTTP client.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to read CA file ({}): {source}", .path.display())]
    CaFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to configure TLS: {0}")]
    Tls(#[from] rustls::Error),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Fatal outcome of one of the two dispatch phases.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("{phase} request to {url} failed: {source}")]
    Request {
        phase: Phase,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("ERROR: {status} {reason} ({url})")]
    NotFound {
        phase: Phase,
        status: u16,
        reason: String,
        url: String,
    },

    #[error("ERROR: {status} {reason}")]
    Rejected {
        phase: Phase,
        status: u16,
        reason: String,
    },

    #[error("failed to read {phase} response body: {source}")]
    Body {
        phase: Phase,
        #[source]
        source: reqwest::Error,
    },
}

impl DispatchError {
    /// Phase the error surfaced in; `None` for failures before Create was issued.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            DispatchError::Transport(_) => None,
            DispatchError::Request { phase, .. }
            | DispatchError::NotFound { phase, .. }
            | DispatchError::Rejected { phase, .. }
            | DispatchError::Body { phase, .. } => Some(*phase),
        }
    }

    /// Numeric HTTP status, when the remote side answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            DispatchError::NotFound { status, .. } | DispatchError::Rejected { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}
