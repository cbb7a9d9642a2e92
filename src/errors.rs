// Copyright 2025 Cowboy AI, LLC.

//! Error types for classification operations

use std::fmt;

use thiserror::Error;

/// Coarse classification of an error as seen by callers of the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A referenced composite or backing resource is absent
    NotFound,
    /// Malformed payload or an incidental missing reference
    InvalidArgument,
    /// The remote service refused a mutation because of existing references
    Conflict,
    /// Anything unexpected or unclassified
    ServerError,
}

/// Reason given when a Condition lookup misses one of the requested ids
const MISSING_CONDITIONS_REASON: &str = "Could not return conditions for all ids";
/// Start of the reason given when a lookup of any other family finds nothing
const NO_MATCH_REASON_PREFIX: &str = "Could not find a match for ";
/// Message given when a Policy lookup finds nothing
const MISSING_POLICY_MESSAGE: &str = "Could not retrieve Policy";

/// Failure reported by the remote policy service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFailure {
    /// HTTP status returned by the remote service
    pub status: u16,
    /// Machine oriented reason string, if any
    pub reason: Option<String>,
    /// Human readable message, if any
    pub message: Option<String>,
    /// Correlation code assigned by the remote service
    pub correlation_code: Option<String>,
}

impl RemoteFailure {
    /// Create a failure with a status and reason
    pub fn new(status: u16, reason: impl Into<String>) -> Self {
        Self {
            status,
            reason: Some(reason.into()),
            message: None,
            correlation_code: None,
        }
    }

    /// Attach a message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Whether the remote service reported that the requested item(s) do not exist
    ///
    /// Only a 404 or one of the lookup reasons the remote service uses for
    /// absent items count. Other "Could not ..." failures stay server errors.
    pub fn is_missing(&self) -> bool {
        if self.status == 404 {
            return true;
        }
        let reason_missing = self.reason.as_deref().is_some_and(|reason| {
            reason == MISSING_CONDITIONS_REASON || reason.starts_with(NO_MATCH_REASON_PREFIX)
        });
        reason_missing || self.message.as_deref() == Some(MISSING_POLICY_MESSAGE)
    }
}

impl fmt::Display for RemoteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "status {}", self.status)?;
        if let Some(reason) = &self.reason {
            write!(f, ": {reason}")?;
        }
        if let Some(message) = &self.message {
            write!(f, " ({message})")?;
        }
        Ok(())
    }
}

/// A compensating action that failed while rolling back a saga
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompensationFailure {
    /// Name of the step whose compensation failed
    pub step: String,
    /// Rendered error of the failed compensation
    pub error: String,
}

impl fmt::Display for CompensationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.step, self.error)
    }
}

/// Errors that can occur in classification operations
#[derive(Debug, Clone, Error)]
pub enum ClassificationError {
    /// Referenced resource was not found
    #[error("{0}")]
    NotFound(String),

    /// Request was malformed or referenced something invalid
    #[error("{0}")]
    InvalidArgument(String),

    /// Remote service refused the mutation
    #[error("{0}")]
    Conflict(String),

    /// Unexpected failure
    #[error("{0}")]
    ServerError(String),

    /// A condition node is missing its payload
    #[error("Invalid condition structure: {0}")]
    InvalidStructure(String),

    /// A condition carries a type discriminator that is not understood
    #[error("Unrecognised condition type: {0}")]
    UnrecognizedType(String),

    /// A condition tree exceeds the configured depth or node limit
    #[error("Condition structure exceeds the limit of {limit} {measure}")]
    StructureTooDeep {
        /// What was measured, levels or nodes
        measure: &'static str,
        /// Configured limit
        limit: usize,
    },

    /// Remote service responded with a failure
    #[error("Policy API error: {0}")]
    Remote(RemoteFailure),

    /// Transport failure reaching the remote service
    #[error("Transport error: {0}")]
    Transport(String),

    /// Payload could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A saga failed and at least one compensating action also failed
    #[error("{primary}")]
    Compensated {
        /// The error that aborted the saga
        primary: Box<ClassificationError>,
        /// Compensations that could not be applied
        compensation_failures: Vec<CompensationFailure>,
    },
}

/// Result type for classification operations
pub type ClassificationResult<T> = Result<T, ClassificationError>;

impl From<serde_json::Error> for ClassificationError {
    fn from(err: serde_json::Error) -> Self {
        ClassificationError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for ClassificationError {
    fn from(err: reqwest::Error) -> Self {
        ClassificationError::Transport(err.to_string())
    }
}

impl ClassificationError {
    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        ClassificationError::NotFound(msg.into())
    }

    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        ClassificationError::InvalidArgument(msg.into())
    }

    /// Create a server error
    pub fn server(msg: impl Into<String>) -> Self {
        ClassificationError::ServerError(msg.into())
    }

    /// The error callers should act on, looking through compensation wrappers
    pub fn primary(&self) -> &ClassificationError {
        match self {
            ClassificationError::Compensated { primary, .. } => primary.primary(),
            other => other,
        }
    }

    /// Compensations that failed while handling this error
    pub fn compensation_failures(&self) -> &[CompensationFailure] {
        match self {
            ClassificationError::Compensated {
                compensation_failures,
                ..
            } => compensation_failures,
            _ => &[],
        }
    }

    /// Coarse kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClassificationError::NotFound(_) => ErrorKind::NotFound,
            ClassificationError::InvalidArgument(_)
            | ClassificationError::InvalidStructure(_)
            | ClassificationError::StructureTooDeep { .. } => ErrorKind::InvalidArgument,
            ClassificationError::Conflict(_) => ErrorKind::Conflict,
            ClassificationError::Remote(failure) => match failure.status {
                400 => ErrorKind::InvalidArgument,
                404 => ErrorKind::NotFound,
                409 => ErrorKind::Conflict,
                _ => ErrorKind::ServerError,
            },
            ClassificationError::Compensated { primary, .. } => primary.kind(),
            ClassificationError::ServerError(_)
            | ClassificationError::UnrecognizedType(_)
            | ClassificationError::Transport(_)
            | ClassificationError::Serialization(_) => ErrorKind::ServerError,
        }
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Check if this is an invalid argument error
    pub fn is_invalid_argument(&self) -> bool {
        self.kind() == ErrorKind::InvalidArgument
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        self.kind() == ErrorKind::Conflict
    }

    /// Whether the remote service reported the requested item(s) as missing
    pub fn is_remote_missing(&self) -> bool {
        matches!(self.primary(), ClassificationError::Remote(failure) if failure.is_missing())
    }
}

/// Error translation helpers for remote call results
pub trait ResultExt<T> {
    /// Replace a "does not exist" failure with [`ClassificationError::NotFound`]
    /// carrying `message`
    fn not_found_as<F>(self, message: F) -> ClassificationResult<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for ClassificationResult<T> {
    fn not_found_as<F>(self, message: F) -> ClassificationResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|err| {
            if err.is_remote_missing() || matches!(err, ClassificationError::NotFound(_)) {
                ClassificationError::NotFound(message())
            } else {
                err
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_error_display_messages() {
        let err = ClassificationError::not_found("Unable to find Workflow with ID: 4");
        assert_eq!(err.to_string(), "Unable to find Workflow with ID: 4");

        let err = ClassificationError::StructureTooDeep {
            measure: "levels",
            limit: 64,
        };
        assert_eq!(
            err.to_string(),
            "Condition structure exceeds the limit of 64 levels"
        );

        let err = ClassificationError::Remote(
            RemoteFailure::new(500, "boom").with_message("database unavailable"),
        );
        assert_eq!(
            err.to_string(),
            "Policy API error: status 500: boom (database unavailable)"
        );
    }

    #[test]
    fn test_kind_of_remote_failures() {
        let missing = ClassificationError::Remote(RemoteFailure::new(404, "gone"));
        assert!(missing.is_not_found());

        let conflict = ClassificationError::Remote(RemoteFailure::new(409, "in use"));
        assert!(conflict.is_conflict());

        let bad = ClassificationError::Remote(RemoteFailure::new(400, "bad"));
        assert!(bad.is_invalid_argument());

        let other = ClassificationError::Remote(RemoteFailure::new(503, "busy"));
        assert_eq!(other.kind(), ErrorKind::ServerError);
    }

    #[test]
    fn test_remote_missing_detection() {
        let failure = RemoteFailure::new(400, "Could not return conditions for all ids");
        assert!(failure.is_missing());

        let failure = RemoteFailure::new(500, "Internal").with_message("Could not retrieve Policy");
        assert!(failure.is_missing());

        let failure = RemoteFailure::new(500, "Internal");
        assert!(!failure.is_missing());
    }

    #[test_case("Could not update Policy" ; "failed mutation")]
    #[test_case("Could not connect to the database" ; "backend outage")]
    #[test_case("Could not retrieve Policy" ; "policy message given as reason")]
    fn test_other_could_not_failures_are_not_missing(reason: &str) {
        let failure = RemoteFailure::new(500, reason);
        assert!(!failure.is_missing());

        let err = Err::<(), _>(ClassificationError::Remote(failure))
            .not_found_as(|| "Unable to find Classification with ID: 1".to_string())
            .unwrap_err();
        assert!(matches!(err, ClassificationError::Remote(_)));
        assert_eq!(err.kind(), ErrorKind::ServerError);
    }

    #[test]
    fn test_compensated_error_reports_primary() {
        let primary = ClassificationError::server("policy create failed");
        let err = ClassificationError::Compensated {
            primary: Box::new(primary),
            compensation_failures: vec![CompensationFailure {
                step: "create condition".to_string(),
                error: "timeout".to_string(),
            }],
        };

        assert_eq!(err.to_string(), "policy create failed");
        assert_eq!(err.kind(), ErrorKind::ServerError);
        assert!(matches!(err.primary(), ClassificationError::ServerError(_)));
        assert_eq!(err.compensation_failures().len(), 1);
        assert_eq!(
            err.compensation_failures()[0].to_string(),
            "create condition: timeout"
        );
    }

    #[test]
    fn test_not_found_as_rewrites_missing_only() {
        let missing: ClassificationResult<()> = Err(ClassificationError::Remote(RemoteFailure::new(
            400,
            "Could not find a match for the SequenceWorkflow requested.",
        )));
        let err = missing
            .not_found_as(|| "Unable to find Workflow with ID: 3".to_string())
            .unwrap_err();
        assert!(matches!(err, ClassificationError::NotFound(ref msg) if msg == "Unable to find Workflow with ID: 3"));

        let other: ClassificationResult<()> = Err(ClassificationError::server("boom"));
        let err = other.not_found_as(|| "unused".to_string()).unwrap_err();
        assert!(matches!(err, ClassificationError::ServerError(_)));
    }

    #[test]
    fn test_serde_json_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid").unwrap_err();
        let err: ClassificationError = json_err.into();
        assert!(matches!(err, ClassificationError::Serialization(_)));
        assert_eq!(err.kind(), ErrorKind::ServerError);
    }
}
