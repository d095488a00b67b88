/*!
Response classification for the two dispatch phases.

`classify(phase, status)` is the single place that decides what an HTTP
status code means for a phase. It never touches the network, so every
branch is covered below with synthetic status codes.

  Create: 201 Success | 409 SoftSuccess | 404 / >=300 Fatal | other 2xx Unexpected
  Invoke: 202 Success | 404 / >=300 Fatal | other 2xx Unexpected

Informational (1xx) codes never reach a final response in practice; if one
does, it is Fatal.
*/

use std::fmt;

use reqwest::StatusCode;

/// Which half of the dispatch protocol produced a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// POST the job definition.
    Create,
    /// POST the execution request.
    Invoke,
}

impl Phase {
    /// Status code the remote returns when the phase fully succeeds.
    pub fn expected_status(&self) -> StatusCode {
        match self {
            Phase::Create => StatusCode::CREATED,
            Phase::Invoke => StatusCode::ACCEPTED,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Create => "create",
            Phase::Invoke => "execute",
        })
    }
}

/// Tagged result of classifying one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The expected success code for the phase.
    Success,
    /// Non-fatal deviation that still lets the run progress.
    SoftSuccess(String),
    /// A 2xx other than the expected one; body is echoed and the phase succeeds.
    Unexpected { status: u16 },
    /// The run must stop.
    Fatal {
        status: u16,
        reason: String,
        not_found: bool,
    },
}

/// Reason used when a status code has no canonical phrase.
pub const UNKNOWN_REASON: &str = "Unknown Status";

/// Canonical reason phrase, or `UNKNOWN_REASON` for non-standard codes.
pub fn reason_phrase(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or(UNKNOWN_REASON).to_string()
}

pub fn classify(phase: Phase, status: StatusCode) -> Outcome {
    let fatal = |not_found| Outcome::Fatal {
        status: status.as_u16(),
        reason: reason_phrase(status),
        not_found,
    };

    if status == StatusCode::NOT_FOUND {
        return fatal(true);
    }
    if phase == Phase::Create && status == StatusCode::CONFLICT {
        return Outcome::SoftSuccess(format!(
            "already exists ({}: {})",
            status.as_u16(),
            reason_phrase(status)
        ));
    }
    if status.as_u16() >= 300 {
        return fatal(false);
    }
    if status == phase.expected_status() {
        return Outcome::Success;
    }
    if status.is_success() {
        return Outcome::Unexpected {
            status: status.as_u16(),
        };
    }
    fatal(false)
}
