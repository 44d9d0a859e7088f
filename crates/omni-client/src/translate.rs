//! Translation of raw connection failures into [`ToolingError`]s.
//!
//! Classification looks at [`RawFailureKind`] only. The raw failure is kept
//! as the cause of the translated error in every case.

use omni_model::{RawFailure, RawFailureKind};

use crate::error::{ErrorKind, ToolingError};
use crate::request::ModelType;

/// Appended when the build tool does not support the requested operation.
pub const INCOMPATIBLE_VERSION_HINT: &str = "Most likely, the build tool version used by the \
    target build does not support the requested operation. Consider upgrading the build tool \
    version of the target build.";

/// Map a raw failure category onto the externally visible error kind.
pub fn classify(kind: RawFailureKind) -> ErrorKind {
    match kind {
        RawFailureKind::UnsupportedBuildArgument => ErrorKind::UnsupportedBuildArgument,
        RawFailureKind::UnsupportedOperationConfiguration => {
            ErrorKind::UnsupportedOperationConfiguration
        }
        RawFailureKind::BuildCancelled => ErrorKind::OperationCancelled,
        RawFailureKind::BuildFailed => ErrorKind::BuildExecutionFailed,
        RawFailureKind::ListenerNotification => ErrorKind::ListenerFailed,
        RawFailureKind::UnsupportedOperation
        | RawFailureKind::UnsupportedMethod
        | RawFailureKind::Connection
        | RawFailureKind::Other => ErrorKind::ConnectionFailed,
    }
}

/// Translate a raw failure raised while fetching `model` through the
/// connection named `display_name`.
pub fn translate(failure: RawFailure, model: ModelType, display_name: &str) -> ToolingError {
    let base = connection_failure_message(&failure, model, display_name);
    let detailed = format!("{base}\n{}", failure.message);

    match classify(failure.kind) {
        ErrorKind::UnsupportedBuildArgument => ToolingError::UnsupportedBuildArgument {
            message: detailed,
            cause: failure,
        },
        ErrorKind::UnsupportedOperationConfiguration => {
            ToolingError::UnsupportedOperationConfiguration {
                message: detailed,
                cause: failure,
            }
        }
        ErrorKind::OperationCancelled => ToolingError::OperationCancelled {
            message: base,
            cause: failure,
        },
        ErrorKind::ListenerFailed => ToolingError::ListenerFailed {
            message: base,
            cause: failure,
        },
        ErrorKind::BuildExecutionFailed => ToolingError::BuildExecutionFailed {
            message: base,
            cause: failure,
        },
        ErrorKind::ConnectionFailed | ErrorKind::InvalidArgument | ErrorKind::Configuration => {
            ToolingError::ConnectionFailed {
                message: base,
                cause: failure,
            }
        }
    }
}

fn connection_failure_message(
    failure: &RawFailure,
    model: ModelType,
    display_name: &str,
) -> String {
    let mut message = format!(
        "Could not fetch model of type '{}' using {}.",
        model.name(),
        display_name
    );
    if failure.kind == RawFailureKind::UnsupportedOperation {
        message.push('\n');
        message.push_str(INCOMPATIBLE_VERSION_HINT);
    }
    message
}
