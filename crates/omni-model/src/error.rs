//! Failure signal of the underlying build connection mechanism

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Category of a raw failure.
///
/// The category is the only thing failure translation looks at; messages
/// are never inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawFailureKind {
    /// The build tool rejected a build argument as unknown for its version.
    UnsupportedBuildArgument,
    /// The operation cannot be configured as requested for this tool version.
    UnsupportedOperationConfiguration,
    /// The build tool version does not support the operation at all.
    UnsupportedOperation,
    /// A specific accessor is missing on a model object.
    UnsupportedMethod,
    /// The build was cancelled cooperatively.
    BuildCancelled,
    /// The build itself failed while producing the model.
    BuildFailed,
    /// One or more progress listeners failed; see [`RawFailure::causes`].
    ListenerNotification,
    /// An already classified connection failure.
    Connection,
    /// Anything else, including malformed models.
    Other,
}

impl RawFailureKind {
    /// Whether this failure means "operation not supported".
    ///
    /// [`RawFailureKind::UnsupportedMethod`] is a narrower form of
    /// [`RawFailureKind::UnsupportedOperation`].
    pub fn is_unsupported_operation(self) -> bool {
        matches!(
            self,
            RawFailureKind::UnsupportedOperation | RawFailureKind::UnsupportedMethod
        )
    }
}

/// A failure raised by the build connection mechanism.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct RawFailure {
    pub kind: RawFailureKind,
    pub message: String,
    /// Nested failures. For listener notification failures this holds every
    /// listener failure, not just the first.
    #[serde(default)]
    pub causes: Vec<RawFailure>,
    /// Diagnostic trace, outermost frame first.
    #[serde(default)]
    pub trace: Vec<String>,
}

impl RawFailure {
    pub fn new(kind: RawFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            causes: Vec::new(),
            trace: Vec::new(),
        }
    }

    /// Failure for a raw model whose links do not form a tree.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(
            RawFailureKind::Other,
            format!("malformed build model: {}", message.into()),
        )
    }

    pub fn with_cause(mut self, cause: RawFailure) -> Self {
        self.causes.push(cause);
        self
    }

    pub fn with_causes(mut self, causes: impl IntoIterator<Item = RawFailure>) -> Self {
        self.causes.extend(causes);
        self
    }

    /// Record the site where the failure was raised.
    pub fn at(mut self, frame: impl Into<String>) -> Self {
        self.trace.push(frame.into());
        self
    }

    /// Append frames observed after the failure was raised.
    pub fn append_trace(&mut self, frames: impl IntoIterator<Item = String>) {
        self.trace.extend(frames);
    }
}
