//! Error taxonomy of the tooling client

use omni_model::{RawFailure, RawFailureKind};
use thiserror::Error;

/// Tag of a [`ToolingError`], for callers that branch on the kind only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    Configuration,
    UnsupportedBuildArgument,
    UnsupportedOperationConfiguration,
    OperationCancelled,
    ListenerFailed,
    BuildExecutionFailed,
    ConnectionFailed,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::Configuration => "configuration",
            ErrorKind::UnsupportedBuildArgument => "unsupported_build_argument",
            ErrorKind::UnsupportedOperationConfiguration => "unsupported_operation_configuration",
            ErrorKind::OperationCancelled => "operation_cancelled",
            ErrorKind::ListenerFailed => "listener_failed",
            ErrorKind::BuildExecutionFailed => "build_execution_failed",
            ErrorKind::ConnectionFailed => "connection_failed",
        };
        f.write_str(name)
    }
}

/// Errors surfaced to callers of the tooling client.
///
/// Every fetch-time variant keeps the raw failure it was translated from.
#[derive(Debug, Clone, Error)]
pub enum ToolingError {
    /// Unsupported or unknown model type. Raised before any connection is opened.
    #[error("{message}")]
    InvalidArgument { message: String },

    /// Invalid connector or repository setup. Raised at construction.
    #[error("{message}")]
    Configuration { message: String },

    /// The build tool rejected a build argument as unknown for its version.
    #[error("{message}")]
    UnsupportedBuildArgument {
        message: String,
        #[source]
        cause: RawFailure,
    },

    /// The operation cannot be configured as requested for this tool version.
    #[error("{message}")]
    UnsupportedOperationConfiguration {
        message: String,
        #[source]
        cause: RawFailure,
    },

    /// The build was cancelled by the connection mechanism.
    #[error("{message}")]
    OperationCancelled {
        message: String,
        #[source]
        cause: RawFailure,
    },

    /// One or more progress listeners failed; see [`ToolingError::listener_failures`].
    #[error("{message}")]
    ListenerFailed {
        message: String,
        #[source]
        cause: RawFailure,
    },

    /// The build failed while producing the model.
    #[error("{message}")]
    BuildExecutionFailed {
        message: String,
        #[source]
        cause: RawFailure,
    },

    /// Any other failure.
    #[error("{message}")]
    ConnectionFailed {
        message: String,
        #[source]
        cause: RawFailure,
    },
}

impl ToolingError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        ToolingError::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        ToolingError::Configuration {
            message: message.into(),
        }
    }

    /// The fetch action ended without producing an outcome, for example
    /// because a connection panicked.
    pub fn terminated_without_result() -> Self {
        ToolingError::ConnectionFailed {
            message: "The model fetch terminated without a result.".to_string(),
            cause: RawFailure::new(RawFailureKind::Other, "operation terminated without a result"),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ToolingError::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            ToolingError::Configuration { .. } => ErrorKind::Configuration,
            ToolingError::UnsupportedBuildArgument { .. } => ErrorKind::UnsupportedBuildArgument,
            ToolingError::UnsupportedOperationConfiguration { .. } => {
                ErrorKind::UnsupportedOperationConfiguration
            }
            ToolingError::OperationCancelled { .. } => ErrorKind::OperationCancelled,
            ToolingError::ListenerFailed { .. } => ErrorKind::ListenerFailed,
            ToolingError::BuildExecutionFailed { .. } => ErrorKind::BuildExecutionFailed,
            ToolingError::ConnectionFailed { .. } => ErrorKind::ConnectionFailed,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ToolingError::InvalidArgument { message }
            | ToolingError::Configuration { message }
            | ToolingError::UnsupportedBuildArgument { message, .. }
            | ToolingError::UnsupportedOperationConfiguration { message, .. }
            | ToolingError::OperationCancelled { message, .. }
            | ToolingError::ListenerFailed { message, .. }
            | ToolingError::BuildExecutionFailed { message, .. }
            | ToolingError::ConnectionFailed { message, .. } => message,
        }
    }

    /// The raw failure this error was translated from.
    pub fn cause(&self) -> Option<&RawFailure> {
        match self {
            ToolingError::InvalidArgument { .. } | ToolingError::Configuration { .. } => None,
            ToolingError::UnsupportedBuildArgument { cause, .. }
            | ToolingError::UnsupportedOperationConfiguration { cause, .. }
            | ToolingError::OperationCancelled { cause, .. }
            | ToolingError::ListenerFailed { cause, .. }
            | ToolingError::BuildExecutionFailed { cause, .. }
            | ToolingError::ConnectionFailed { cause, .. } => Some(cause),
        }
    }

    /// Every listener failure for [`ToolingError::ListenerFailed`], empty otherwise.
    pub fn listener_failures(&self) -> &[RawFailure] {
        match self {
            ToolingError::ListenerFailed { cause, .. } => &cause.causes,
            _ => &[],
        }
    }

    /// Diagnostic trace: frames where the failure originated, followed by
    /// frames where it was observed.
    pub fn trace(&self) -> &[String] {
        self.cause().map(|c| c.trace.as_slice()).unwrap_or(&[])
    }

    /// Append the observing thread's frames to the diagnostic trace.
    pub fn with_caller_trace(mut self, frames: impl IntoIterator<Item = String>) -> Self {
        if let Some(cause) = self.cause_slot() {
            cause.append_trace(frames);
        }
        self
    }

    fn cause_slot(&mut self) -> Option<&mut RawFailure> {
        match self {
            ToolingError::InvalidArgument { .. } | ToolingError::Configuration { .. } => None,
            ToolingError::UnsupportedBuildArgument { cause, .. }
            | ToolingError::UnsupportedOperationConfiguration { cause, .. }
            | ToolingError::OperationCancelled { cause, .. }
            | ToolingError::ListenerFailed { cause, .. }
            | ToolingError::BuildExecutionFailed { cause, .. }
            | ToolingError::ConnectionFailed { cause, .. } => Some(cause),
        }
    }
}
