//! Omni-Model: build models as seen by the tooling client
//!
//! This crate holds the data layer shared by the connection and caching
//! layers. It knows nothing about connections or runtimes.
//!
//! ## Layer 0 - Data
//!
//! Focus: the raw shapes handed over by a build connection, the immutable
//! "Omni" shapes handed to callers, and the conversion between the two.
//!
//! ## Key Components
//!
//! - `RawEclipseModel`: arena of raw project descriptors with parent/child links
//! - `RawFailure`: failure signal of the underlying connection mechanism
//! - `OmniEclipseProject`: normalized, immutable project tree node
//! - `OmniEclipseWorkspace`: all normalized projects of a composite
//! - `normalize`: raw tree to Omni tree, tolerant of unsupported attributes

mod error;
pub mod normalize;
pub mod omni;
pub mod raw;
mod workspace;

pub use error::{RawFailure, RawFailureKind};
pub use normalize::normalize;
pub use omni::{
    preorder, OmniAccessRule, OmniClasspathAttribute, OmniEclipseProject,
    OmniEclipseSourceDirectory, OmniExternalDependency, OmniModuleVersion, OmniProjectDependency,
    OmniTaskSelector,
};
pub use raw::{
    RawAccessRule, RawAttribute, RawClasspathAttribute, RawEclipseModel, RawEclipseProject,
    RawExternalDependency, RawModuleVersion, RawProjectDependency, RawProjectId,
    RawSourceDirectory, RawTaskSelector,
};
pub use workspace::OmniEclipseWorkspace;

/// Result type for raw model reads
pub type Result<T> = std::result::Result<T, RawFailure>;
