use std::fmt;

/// Machine-readable error codes for programmatic callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    RecordNotFound,
    MemberNotFound,
    WorkflowViolation,
    ValidationFailed,
    InvalidEnumValue,
    SnapshotReadFailed,
    SnapshotWriteFailed,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::RecordNotFound => "E2001",
            Self::MemberNotFound => "E2002",
            Self::WorkflowViolation => "E2003",
            Self::ValidationFailed => "E2004",
            Self::InvalidEnumValue => "E2005",
            Self::SnapshotReadFailed => "E5001",
            Self::SnapshotWriteFailed => "E5002",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::RecordNotFound => "Record not found",
            Self::MemberNotFound => "No such member",
            Self::WorkflowViolation => "Workflow transition rejected",
            Self::ValidationFailed => "Validation failed",
            Self::InvalidEnumValue => "Invalid enum value",
            Self::SnapshotReadFailed => "Snapshot read failed",
            Self::SnapshotWriteFailed => "Snapshot write failed",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in atrium.toml and retry."),
            Self::RecordNotFound => {
                Some("The id may belong to another store, or the store runs in strict mode.")
            }
            Self::MemberNotFound => {
                Some("Not a member is distinct from no permissions; assign the user first.")
            }
            Self::WorkflowViolation => Some("Consult the board's transition rules."),
            Self::ValidationFailed => None,
            Self::InvalidEnumValue => Some("Use one of the documented status/role/kind values."),
            Self::SnapshotReadFailed => Some("Check the snapshot path and its JSON contents."),
            Self::SnapshotWriteFailed => Some("Check disk space and write permissions."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Failure cases surfaced by store operations.
///
/// Stores never panic for expected conditions; every mutator returns
/// `Result` and the variants below cover the whole taxonomy. In lenient
/// mode the `NotFound` case is absorbed into a skipped result instead
/// (see [`crate::store::StoreMode`]).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Referenced record id does not exist in the collection.
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    /// The user has no active assignment in the container. Callers must
    /// not conflate this with an empty permission bundle.
    #[error("user '{user_id}' is not a member of {container} '{container_id}'")]
    MemberNotFound {
        container: &'static str,
        container_id: String,
        user_id: String,
    },

    /// A status transition was rejected by the workflow predicate.
    /// Carries a human-readable reason; the record is left untouched.
    #[error("cannot move from '{from}' to '{to}': {reason}")]
    WorkflowViolation {
        from: String,
        to: String,
        reason: String,
    },

    /// Required-field or consistency check failed at the store boundary.
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
}

impl StoreError {
    /// Map to the stable machine-readable code catalog.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound { .. } => ErrorCode::RecordNotFound,
            Self::MemberNotFound { .. } => ErrorCode::MemberNotFound,
            Self::WorkflowViolation { .. } => ErrorCode::WorkflowViolation,
            Self::Validation { .. } => ErrorCode::ValidationFailed,
        }
    }
}

/// Result alias used across the store API.
pub type StoreResult<T> = Result<T, StoreError>;

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}
