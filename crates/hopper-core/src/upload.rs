//! Outcome and lifecycle of a single upload attempt.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// FailureKind
// ---------------------------------------------------------------------------

/// Why an upload attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The destination (or a parent catalog object) is unknown or stale.
    NotFound,
    /// The uploaded file could not be parsed.
    Parse,
    /// The warehouse rejected the write.
    Write,
    /// The warehouse committed a different number of rows than were parsed.
    Verification,
}

impl FailureKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Parse => "parse",
            Self::Write => "write",
            Self::Verification => "verification",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// UploadResult
// ---------------------------------------------------------------------------

/// Result of one upload attempt. Created once per attempt and handed straight
/// back to the caller; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UploadResult {
    /// No file was supplied, or the file holds no rows. Nothing was written.
    AwaitingInput,
    Success {
        rows_written: u64,
    },
    Failure {
        kind: FailureKind,
        message: String,
    },
}

impl UploadResult {
    #[must_use]
    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        Self::Failure {
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }

    #[must_use]
    pub const fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Failure { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// The single human-readable line reported for this attempt.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::AwaitingInput => String::from("Awaiting file to upload..."),
            Self::Success { rows_written } => {
                format!("Your upload was a success. You uploaded {rows_written} rows.")
            }
            Self::Failure { message, .. } => {
                format!("Your upload was not successful. {message}")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// UploadState
// ---------------------------------------------------------------------------

/// Lifecycle of an upload attempt.
///
/// ```text
/// idle → file_received → parsing → appending → succeeded
///                      ↘         ↘           → failed
///                        failed    failed
/// succeeded | failed → idle (next attempt)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadState {
    Idle,
    FileReceived,
    Parsing,
    Appending,
    Succeeded,
    Failed,
}

impl UploadState {
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Idle => &[Self::FileReceived],
            Self::FileReceived => &[Self::Parsing, Self::Failed],
            Self::Parsing => &[Self::Appending, Self::Failed],
            Self::Appending => &[Self::Succeeded, Self::Failed],
            Self::Succeeded | Self::Failed => &[Self::Idle],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    /// Move to `next` if the machine allows it.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidTransition`] for a move not listed in
    /// [`UploadState::allowed_next_states`].
    pub fn transition_to(self, next: Self) -> Result<Self, CoreError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CoreError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::FileReceived => "file_received",
            Self::Parsing => "parsing",
            Self::Appending => "appending",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for UploadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn success_message_reports_row_count() {
        let result = UploadResult::Success { rows_written: 5 };
        assert_eq!(
            result.message(),
            "Your upload was a success. You uploaded 5 rows."
        );
        assert!(result.is_success());
        assert_eq!(result.failure_kind(), None);
    }

    #[test]
    fn failure_message_keeps_cause_verbatim() {
        let cause = "Binder Error: Table \"EMP_SALARY\" does not have a column with name \"BONUS\"";
        let result = UploadResult::failure(FailureKind::Write, cause);
        assert!(result.message().ends_with(cause));
        assert_eq!(result.failure_kind(), Some(FailureKind::Write));
    }

    #[test]
    fn awaiting_input_is_neither_success_nor_failure() {
        let result = UploadResult::AwaitingInput;
        assert!(!result.is_success());
        assert!(!result.is_failure());
        assert_eq!(result.message(), "Awaiting file to upload...");
    }

    #[test]
    fn serializes_with_status_tag() {
        let json = serde_json::to_value(UploadResult::failure(FailureKind::Parse, "bad"))
            .expect("serialize");
        assert_eq!(json["status"], "failure");
        assert_eq!(json["kind"], "parse");
        assert_eq!(json["message"], "bad");

        let json = serde_json::to_value(UploadResult::Success { rows_written: 3 })
            .expect("serialize");
        assert_eq!(json["status"], "success");
        assert_eq!(json["rows_written"], 3);
    }

    #[rstest]
    #[case(UploadState::Idle, UploadState::FileReceived, true)]
    #[case(UploadState::FileReceived, UploadState::Parsing, true)]
    #[case(UploadState::Parsing, UploadState::Appending, true)]
    #[case(UploadState::Parsing, UploadState::Failed, true)]
    #[case(UploadState::Appending, UploadState::Succeeded, true)]
    #[case(UploadState::Succeeded, UploadState::Idle, true)]
    #[case(UploadState::Failed, UploadState::Idle, true)]
    #[case(UploadState::Idle, UploadState::Appending, false)]
    #[case(UploadState::Succeeded, UploadState::Failed, false)]
    #[case(UploadState::Appending, UploadState::Parsing, false)]
    fn transitions(#[case] from: UploadState, #[case] to: UploadState, #[case] allowed: bool) {
        assert_eq!(from.can_transition_to(to), allowed);
    }

    #[test]
    fn rejected_transition_names_both_states() {
        assert_eq!(
            UploadState::Parsing.transition_to(UploadState::Appending).ok(),
            Some(UploadState::Appending)
        );
        let err = UploadState::Idle
            .transition_to(UploadState::Succeeded)
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidTransition {
                from: UploadState::Idle,
                to: UploadState::Succeeded
            }
        ));
        assert_eq!(
            err.to_string(),
            "Invalid upload state transition from idle to succeeded"
        );
    }

    #[test]
    fn only_succeeded_and_failed_are_terminal() {
        let terminal: Vec<_> = [
            UploadState::Idle,
            UploadState::FileReceived,
            UploadState::Parsing,
            UploadState::Appending,
            UploadState::Succeeded,
            UploadState::Failed,
        ]
        .into_iter()
        .filter(|state| state.is_terminal())
        .collect();
        assert_eq!(terminal, vec![UploadState::Succeeded, UploadState::Failed]);
    }
}
