//! Error types for TickList.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=storage, 3=not_found, 4=validation, 5=reconciliation)
//! - Retryability flags for agent self-correction
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for TickList operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
///
/// Each code maps to a SCREAMING_SNAKE string and a category-based
/// exit code. The set is closed: every failure the service can produce
/// surfaces exactly one of these, so boundary mapping tables stay
/// exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Storage (exit 2)
    NotInitialized,
    AlreadyInitialized,
    DatabaseError,
    RepoProblem,

    // Not Found / ownership (exit 3)
    EntityNotFound,
    EntityDoesNotBelongToUser,

    // Validation (exit 4)
    IncorrectInputData,
    ChecklistIdNotSupplied,
    UserIdNotSupplied,
    ChecklistTitleNotSupplied,

    // Reconciliation (exit 5)
    DetailToDeleteNotFound,
    DetailToUpdateNotFound,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::AlreadyInitialized => "ALREADY_INITIALIZED",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::RepoProblem => "REPO_PROBLEM",
            Self::EntityNotFound => "ENTITY_NOT_FOUND",
            Self::EntityDoesNotBelongToUser => "ENTITY_DOES_NOT_BELONG_TO_USER",
            Self::IncorrectInputData => "INCORRECT_INPUT_DATA",
            Self::ChecklistIdNotSupplied => "CHECKLIST_ID_NOT_SUPPLIED",
            Self::UserIdNotSupplied => "USER_ID_NOT_SUPPLIED",
            Self::ChecklistTitleNotSupplied => "CHECKLIST_TITLE_NOT_SUPPLIED",
            Self::DetailToDeleteNotFound => "ONE_OR_MORE_CHECKLIST_DETAIL_TO_DELETE_NOT_FOUND",
            Self::DetailToUpdateNotFound => "ONE_OR_MORE_CHECKLIST_DETAIL_TO_UPDATE_NOT_FOUND",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code (1-8).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::NotInitialized
            | Self::AlreadyInitialized
            | Self::DatabaseError
            | Self::RepoProblem => 2,
            Self::EntityNotFound | Self::EntityDoesNotBelongToUser => 3,
            Self::IncorrectInputData
            | Self::ChecklistIdNotSupplied
            | Self::UserIdNotSupplied
            | Self::ChecklistTitleNotSupplied => 4,
            Self::DetailToDeleteNotFound | Self::DetailToUpdateNotFound => 5,
            Self::IoError | Self::JsonError => 8,
        }
    }

    /// Whether an agent should retry with corrected input.
    ///
    /// True for validation and reconciliation errors (the request shape
    /// was wrong, a corrected request can succeed). False for not-found,
    /// I/O, or internal errors.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::IncorrectInputData
                | Self::ChecklistIdNotSupplied
                | Self::UserIdNotSupplied
                | Self::ChecklistTitleNotSupplied
                | Self::DetailToDeleteNotFound
                | Self::DetailToUpdateNotFound
        )
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in TickList operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Not initialized: run `tick init` first")]
    NotInitialized,

    #[error("Already initialized at {path}")]
    AlreadyInitialized { path: PathBuf },

    #[error("Incorrect input data")]
    IncorrectInputData,

    #[error("Checklist id not supplied")]
    ChecklistIdNotSupplied,

    #[error("User id not supplied")]
    UserIdNotSupplied,

    #[error("Checklist title not supplied")]
    ChecklistTitleNotSupplied,

    #[error("Checklist not found: {id}")]
    EntityNotFound { id: String },

    #[error("Checklist {id} does not belong to the calling user")]
    EntityDoesNotBelongToUser { id: String },

    #[error("Detail(s) to delete not found: {}", missing.join(", "))]
    DetailsToDeleteNotFound { missing: Vec<String> },

    #[error("Detail(s) to update not found: {}", missing.join(", "))]
    DetailsToUpdateNotFound { missing: Vec<String> },

    /// A storage failure inside a transaction. The original cause has
    /// already been logged server-side; only this generic code crosses
    /// the service boundary.
    #[error("Repository problem")]
    RepoProblem,

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::NotInitialized => ErrorCode::NotInitialized,
            Self::AlreadyInitialized { .. } => ErrorCode::AlreadyInitialized,
            Self::IncorrectInputData => ErrorCode::IncorrectInputData,
            Self::ChecklistIdNotSupplied => ErrorCode::ChecklistIdNotSupplied,
            Self::UserIdNotSupplied => ErrorCode::UserIdNotSupplied,
            Self::ChecklistTitleNotSupplied => ErrorCode::ChecklistTitleNotSupplied,
            Self::EntityNotFound { .. } => ErrorCode::EntityNotFound,
            Self::EntityDoesNotBelongToUser { .. } => ErrorCode::EntityDoesNotBelongToUser,
            Self::DetailsToDeleteNotFound { .. } => ErrorCode::DetailToDeleteNotFound,
            Self::DetailsToUpdateNotFound { .. } => ErrorCode::DetailToUpdateNotFound,
            Self::RepoProblem => ErrorCode::RepoProblem,
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::Config(_) | Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint for agents and humans.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::NotInitialized => Some("Run `tick init` to create the database".to_string()),

            Self::AlreadyInitialized { path } => Some(format!(
                "Database already exists at {}. Use `--force` to reinitialize.",
                path.display()
            )),

            Self::UserIdNotSupplied => Some(
                "Pass `--user <id>` or set the TICK_USER environment variable".to_string(),
            ),

            Self::ChecklistIdNotSupplied => Some(
                "Use `tick checklist list` to find checklist ids".to_string(),
            ),

            Self::EntityNotFound { id } => Some(format!(
                "No checklist with id '{id}'. Use `tick checklist list` to see yours."
            )),

            Self::DetailsToDeleteNotFound { missing } | Self::DetailsToUpdateNotFound { missing } => {
                Some(format!(
                    "Unknown detail id(s): {}. Use `tick checklist show <id> --flat` to see stored details.",
                    missing.join(", ")
                ))
            }

            Self::IncorrectInputData
            | Self::ChecklistTitleNotSupplied
            | Self::EntityDoesNotBelongToUser { .. }
            | Self::RepoProblem
            | Self::Database(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::Config(_)
            | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    ///
    /// Includes error code, message, retryability, exit code, and
    /// optional recovery hint. Agents parse this instead of stderr text.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_strings_are_stable() {
        // Boundary mapping tables key on these exact strings.
        assert_eq!(ErrorCode::IncorrectInputData.as_str(), "INCORRECT_INPUT_DATA");
        assert_eq!(ErrorCode::ChecklistIdNotSupplied.as_str(), "CHECKLIST_ID_NOT_SUPPLIED");
        assert_eq!(ErrorCode::UserIdNotSupplied.as_str(), "USER_ID_NOT_SUPPLIED");
        assert_eq!(
            ErrorCode::ChecklistTitleNotSupplied.as_str(),
            "CHECKLIST_TITLE_NOT_SUPPLIED"
        );
        assert_eq!(ErrorCode::EntityNotFound.as_str(), "ENTITY_NOT_FOUND");
        assert_eq!(
            ErrorCode::EntityDoesNotBelongToUser.as_str(),
            "ENTITY_DOES_NOT_BELONG_TO_USER"
        );
        assert_eq!(
            ErrorCode::DetailToDeleteNotFound.as_str(),
            "ONE_OR_MORE_CHECKLIST_DETAIL_TO_DELETE_NOT_FOUND"
        );
        assert_eq!(
            ErrorCode::DetailToUpdateNotFound.as_str(),
            "ONE_OR_MORE_CHECKLIST_DETAIL_TO_UPDATE_NOT_FOUND"
        );
        assert_eq!(ErrorCode::RepoProblem.as_str(), "REPO_PROBLEM");
    }

    #[test]
    fn test_exit_codes_by_category() {
        assert_eq!(ErrorCode::RepoProblem.exit_code(), 2);
        assert_eq!(ErrorCode::EntityNotFound.exit_code(), 3);
        assert_eq!(ErrorCode::EntityDoesNotBelongToUser.exit_code(), 3);
        assert_eq!(ErrorCode::UserIdNotSupplied.exit_code(), 4);
        assert_eq!(ErrorCode::DetailToDeleteNotFound.exit_code(), 5);
        assert_eq!(ErrorCode::InternalError.exit_code(), 1);
    }

    #[test]
    fn test_structured_json_shape() {
        let err = Error::EntityNotFound { id: "chk_123".to_string() };
        let json = err.to_structured_json();
        assert_eq!(json["error"]["code"], "ENTITY_NOT_FOUND");
        assert_eq!(json["error"]["exit_code"], 3);
        assert_eq!(json["error"]["retryable"], false);
        assert!(json["error"]["hint"].as_str().is_some());
    }

    #[test]
    fn test_reconciliation_errors_are_retryable() {
        assert!(ErrorCode::DetailToDeleteNotFound.is_retryable());
        assert!(ErrorCode::DetailToUpdateNotFound.is_retryable());
        assert!(!ErrorCode::RepoProblem.is_retryable());
    }
}
