//! Omni-Repository: cached composite workspaces
//!
//! ## Layer 2 - Caching
//!
//! Focus: serve composite workspace models from a cache according to the
//! caller's fetch strategy, refresh through the tooling client, and tell
//! subscribers whenever a fresh workspace is published.
//!
//! ## Key Components
//!
//! - `CompositeModelRepository`: cache keyed by model type and fixed request
//! - `FetchStrategy`: cache-only, load-if-not-cached, force-reload
//! - `FixedRequestAttributes` / `TransientRequestAttributes`: what is and is
//!   not part of the cache key
//! - `EclipseWorkspaceUpdateEvent`: broadcast on every successful refresh

pub mod attributes;
pub mod event;
pub mod repository;
pub mod strategy;

pub use attributes::{FixedRequestAttributes, TransientRequestAttributes};
pub use event::EclipseWorkspaceUpdateEvent;
pub use repository::CompositeModelRepository;
pub use strategy::FetchStrategy;

/// Result type for repository operations
pub type Result<T> = std::result::Result<T, omni_client::ToolingError>;
