//! Participant configuration and composite connections.
//!
//! ```rust,ignore
//! let mut connector = client.new_composite_connector();
//! connector.add_participant("/ws/app");
//! connector.add_participant("/ws/lib").use_gradle_version("8.5");
//! let builder = connector.connect()?.models(ModelType::EclipseProject)?;
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use crate::builder::CompositeModelBuilder;
use crate::connection::BuildConnector;
use crate::error::ToolingError;
use crate::executor::ActionExecutor;
use crate::participant::Participant;
use crate::request::ModelType;

/// Entry point of the client: the runtime to run fetches on and the
/// mechanism used to reach individual builds.
#[derive(Clone)]
pub struct ToolingClient {
    executor: ActionExecutor,
    connector: Arc<dyn BuildConnector>,
}

impl ToolingClient {
    pub fn new(executor: ActionExecutor, connector: Arc<dyn BuildConnector>) -> Self {
        Self {
            executor,
            connector,
        }
    }

    pub fn executor(&self) -> &ActionExecutor {
        &self.executor
    }

    /// A connector with no participants yet.
    pub fn new_composite_connector(&self) -> CompositeBuildConnector {
        CompositeBuildConnector {
            executor: self.executor.clone(),
            connector: Arc::clone(&self.connector),
            participants: Vec::new(),
        }
    }
}

impl std::fmt::Debug for ToolingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolingClient")
            .field("executor", &self.executor)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// CompositeBuildConnector
// ---------------------------------------------------------------------------

/// Set of participants, keyed by root directory, in insertion order.
pub struct CompositeBuildConnector {
    executor: ActionExecutor,
    connector: Arc<dyn BuildConnector>,
    participants: Vec<Participant>,
}

impl CompositeBuildConnector {
    /// The participant rooted at `root_dir`, added if not yet present.
    ///
    /// Adding a directory twice returns the existing participant so it can be
    /// reconfigured.
    pub fn add_participant(&mut self, root_dir: impl Into<PathBuf>) -> &mut Participant {
        let root_dir = root_dir.into();
        let index = match self
            .participants
            .iter()
            .position(|p| p.root_dir() == root_dir)
        {
            Some(index) => index,
            None => {
                self.participants.push(Participant::new(root_dir));
                self.participants.len() - 1
            }
        };
        &mut self.participants[index]
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// A single-use connection over the current participants.
    ///
    /// Nothing is opened here; each fetch opens the participant connections
    /// it needs.
    pub fn connect(&self) -> Result<CompositeBuildConnection, ToolingError> {
        CompositeBuildConnection::new(
            self.executor.clone(),
            Arc::clone(&self.connector),
            self.participants.clone(),
        )
    }
}

// ---------------------------------------------------------------------------
// CompositeBuildConnection
// ---------------------------------------------------------------------------

/// A composite over a non-empty set of participants, consumed by one fetch.
pub struct CompositeBuildConnection {
    executor: ActionExecutor,
    connector: Arc<dyn BuildConnector>,
    participants: Vec<Participant>,
}

impl CompositeBuildConnection {
    pub fn new(
        executor: ActionExecutor,
        connector: Arc<dyn BuildConnector>,
        participants: Vec<Participant>,
    ) -> Result<Self, ToolingError> {
        if participants.is_empty() {
            return Err(ToolingError::configuration(
                "A composite build requires at least one participant.",
            ));
        }
        Ok(Self {
            executor,
            connector,
            participants,
        })
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Name used in failure messages, e.g. `composite build [/ws/app, /ws/lib]`.
    pub fn display_name(&self) -> String {
        let dirs: Vec<String> = self
            .participants
            .iter()
            .map(|p| p.root_dir().display().to_string())
            .collect();
        format!("composite build [{}]", dirs.join(", "))
    }

    /// Prepare a fetch of `model`. Fails with an invalid argument error for any
    /// model a composite cannot produce, before anything is opened.
    pub fn models(self, model: ModelType) -> Result<CompositeModelBuilder, ToolingError> {
        let model = model.ensure_composite()?;
        let display_name = self.display_name();
        Ok(CompositeModelBuilder::new(
            model,
            self.executor,
            self.connector,
            self.participants,
            display_name,
        ))
    }
}

impl std::fmt::Debug for CompositeBuildConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeBuildConnection")
            .field("participants", &self.participants)
            .finish_non_exhaustive()
    }
}
