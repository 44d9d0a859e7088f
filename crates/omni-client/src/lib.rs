//! Omni-Client: composite build connections
//!
//! Connects to several builds at once, fetches their raw models, folds them
//! into one deduplicated set of normalized projects and reports failures
//! through a fixed error taxonomy.
//!
//! ## Layer 1 - Connection
//!
//! Focus: participant configuration, single-use composite connections,
//! blocking / callback / async fetch conventions on top of a tokio runtime.
//!
//! ## Key Components
//!
//! - `ToolingClient`: entry point bundling the runtime and the build connector
//! - `CompositeBuildConnector`: participant set, produces connections
//! - `CompositeModelBuilder`: one fetch, three calling conventions
//! - `CompositeAggregator`: root resolution and deduplication
//! - `ToolingError`: translated failures
//!
//! ## Quick start
//!
//! ```rust,ignore
//! let client = ToolingClient::new(ActionExecutor::new(runtime.handle().clone()), connector);
//! let mut composite = client.new_composite_connector();
//! composite.add_participant("/ws/app");
//! composite.add_participant("/ws/lib").use_gradle_version("8.5");
//! let projects = composite.connect()?.models(ModelType::EclipseProject)?.get()?;
//! ```

pub mod aggregator;
pub mod builder;
pub mod connection;
pub mod connector;
mod error;
pub mod executor;
pub mod fakes;
pub mod metrics;
pub mod obs;
pub mod participant;
pub mod request;
pub mod telemetry;
pub mod translate;

pub use aggregator::{resolve_root, CompositeAggregator};
pub use builder::{CompositeModelBuilder, EclipseProjectResults};
pub use connection::{
    BuildConnector, ListenerError, OperationParameters, ProgressEvent, ProgressListener,
    ProjectConnection,
};
pub use connector::{CompositeBuildConnection, CompositeBuildConnector, ToolingClient};
pub use error::{ErrorKind, ToolingError};
pub use executor::ActionExecutor;
pub use metrics::METRICS;
pub use participant::{Distribution, Participant};
pub use request::{ModelResult, ModelType, RequestId};
pub use telemetry::init_tracing;
pub use translate::{classify, translate, INCOMPATIBLE_VERSION_HINT};

/// Result type for tooling client operations
pub type Result<T> = std::result::Result<T, ToolingError>;
