/*!
Check state for a runbook run.

Sensu checks report their state through the process exit status:

  OK       0  both phases succeeded (conflict on create included)
  WARNING  1  caller input problem detected before any request
  CRITICAL 2  anything that failed during create or execute

Helpers:
  - exit_code()
  - label()
  - from_input_error() / from_dispatch_error()
*/

use std::fmt;

use crate::api::{DispatchError, InputError};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum CheckState {
    Ok,
    Warning,
    Critical,
}

impl CheckState {
    /// Numeric process exit status.
    pub const fn exit_code(&self) -> i32 {
        match self {
            CheckState::Ok => 0,
            CheckState::Warning => 1,
            CheckState::Critical => 2,
        }
    }

    /// Upper-case label used in check output.
    pub const fn label(&self) -> &'static str {
        match self {
            CheckState::Ok => "OK",
            CheckState::Warning => "WARNING",
            CheckState::Critical => "CRITICAL",
        }
    }

    pub fn from_input_error(_: &InputError) -> Self {
        CheckState::Warning
    }

    pub fn from_dispatch_error(_: &DispatchError) -> Self {
        CheckState::Critical
    }
}

impl fmt::Display for CheckState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/* --------------------------------- Tests ---------------------------------- */

#[cfg(test)]
mod tests {
    use super::CheckState;
    use crate::api::error::{DispatchError, InputError};
    use crate::api::outcome::Phase;

    #[test]
    fn exit_codes_follow_check_convention() {
        assert_eq!(CheckState::Ok.exit_code(), 0);
        assert_eq!(CheckState::Warning.exit_code(), 1);
        assert_eq!(CheckState::Critical.exit_code(), 2);
    }

    #[test]
    fn input_errors_warn() {
        assert_eq!(
            CheckState::from_input_error(&InputError::MissingCommand),
            CheckState::Warning
        );
        assert_eq!(
            CheckState::from_input_error(&InputError::MissingApiUrl),
            CheckState::Warning
        );
    }

    #[test]
    fn dispatch_errors_are_critical() {
        let err = DispatchError::Rejected {
            phase: Phase::Create,
            status: 500,
            reason: "Internal Server Error".into(),
        };
        assert_eq!(CheckState::from_dispatch_error(&err), CheckState::Critical);
    }

    #[test]
    fn display_output() {
        assert_eq!(CheckState::Ok.to_string(), "OK");
        assert_eq!(CheckState::Critical.to_string(), "CRITICAL");
    }
}
