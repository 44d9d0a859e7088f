//! Connection mechanism boundary
//!
//! These traits define what the client needs from the per-build connection
//! mechanism:
//! - `BuildConnector`: open a connection for one participant
//! - `ProjectConnection`: fetch the raw Eclipse model, then close
//! - `ProgressListener`: callbacks the mechanism drives during an operation
//!
//! In-memory fakes live in the `fakes` module.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use omni_model::{RawEclipseModel, RawFailure};
use thiserror::Error;

use crate::participant::Participant;

// ---------------------------------------------------------------------------
// Progress listeners
// ---------------------------------------------------------------------------

/// Progress notification emitted by the connection mechanism.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub description: String,
}

impl ProgressEvent {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// Failure raised by a progress listener.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ListenerError(pub String);

/// Receives progress events during a fetch.
///
/// May be called from any runtime worker thread. A listener that fails does
/// not stop the others; the mechanism reports all failures together.
pub trait ProgressListener: Send + Sync {
    fn status_changed(&self, event: &ProgressEvent) -> Result<(), ListenerError>;
}

impl<F> ProgressListener for F
where
    F: Fn(&ProgressEvent) -> Result<(), ListenerError> + Send + Sync,
{
    fn status_changed(&self, event: &ProgressEvent) -> Result<(), ListenerError> {
        self(event)
    }
}

// ---------------------------------------------------------------------------
// Operation parameters
// ---------------------------------------------------------------------------

/// Parameters passed to every participant fetch of one operation.
#[derive(Clone, Default)]
pub struct OperationParameters {
    /// Label of the API the operation was started from, for diagnostics.
    pub entry_point: String,
    pub tasks: Vec<String>,
    pub arguments: Vec<String>,
    pub jvm_arguments: Vec<String>,
    pub java_home: Option<PathBuf>,
    pub gradle_user_home: Option<PathBuf>,
    pub color_output: bool,
    pub progress_listeners: Vec<Arc<dyn ProgressListener>>,
}

impl std::fmt::Debug for OperationParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationParameters")
            .field("entry_point", &self.entry_point)
            .field("tasks", &self.tasks)
            .field("arguments", &self.arguments)
            .field("jvm_arguments", &self.jvm_arguments)
            .field("java_home", &self.java_home)
            .field("gradle_user_home", &self.gradle_user_home)
            .field("color_output", &self.color_output)
            .field("progress_listeners", &self.progress_listeners.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Connections
// ---------------------------------------------------------------------------

/// Opens per-participant connections.
#[async_trait]
pub trait BuildConnector: Send + Sync {
    /// Open a connection to the build rooted at the participant's directory,
    /// using its distribution selector.
    async fn open(&self, participant: &Participant)
        -> Result<Box<dyn ProjectConnection>, RawFailure>;
}

/// An open connection to a single build.
///
/// Callers must call [`ProjectConnection::close`] exactly once, whether or
/// not the fetch succeeded.
#[async_trait]
pub trait ProjectConnection: Send {
    /// Fetch the raw Eclipse model of the build.
    async fn fetch_eclipse_model(
        &mut self,
        params: &OperationParameters,
    ) -> Result<RawEclipseModel, RawFailure>;

    /// Release the connection.
    async fn close(&mut self);
}
