//! Structured observability hooks for model fetch lifecycle events.
//!
//! This module provides:
//! - Operation-scoped tracing spans via [`FetchSpan`] (caller side) and
//!   [`fetch_span`] (worker side, for `Instrument`)
//! - Emission functions for fetch start, finish and failure, participant
//!   handling, and cache activity
//!
//! Events are emitted at `info!` level unless noted; filter with `RUST_LOG`.

use std::path::Path;

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::ErrorKind;
use crate::request::ModelType;

/// RAII guard that enters an operation-scoped span on the current thread.
///
/// ```ignore
/// let _span = FetchSpan::enter(&operation_id);
/// // tracing calls here carry operation_id
/// ```
pub struct FetchSpan {
    _span: tracing::span::EnteredSpan,
}

impl FetchSpan {
    pub fn enter(operation_id: &Uuid) -> Self {
        Self {
            _span: fetch_span(operation_id).entered(),
        }
    }
}

/// Span tagged with the operation id, for futures running on worker threads.
pub fn fetch_span(operation_id: &Uuid) -> tracing::Span {
    tracing::info_span!("omni.fetch", operation_id = %operation_id)
}

/// Emit event: composite fetch submitted.
pub fn emit_fetch_started(model: ModelType, participants: usize) {
    info!(event = "fetch.started", model = %model, participants = participants);
}

/// Emit event: composite fetch completed.
pub fn emit_fetch_finished(model: ModelType, projects: usize, duration_ms: u64) {
    info!(
        event = "fetch.finished",
        model = %model,
        projects = projects,
        duration_ms = duration_ms,
    );
}

/// Emit event: composite fetch failed (warning level).
pub fn emit_fetch_failed(model: ModelType, kind: ErrorKind, error: &dyn std::fmt::Display) {
    warn!(event = "fetch.failed", model = %model, kind = %kind, error = %error);
}

/// Emit event: a fetch action panicked before settling (error level).
pub fn emit_action_panicked(panic: &str) {
    error!(event = "fetch.panicked", panic = panic);
}

/// Emit event: one participant's raw model fetched (debug level).
pub fn emit_participant_fetched(participant: &Path, projects: usize) {
    debug!(
        event = "participant.fetched",
        participant = %participant.display(),
        projects = projects,
    );
}

/// Emit event: a participant's resolved root was already collected (debug level).
pub fn emit_root_skipped(participant: &Path, root_dir: &Path) {
    debug!(
        event = "participant.root_skipped",
        participant = %participant.display(),
        root = %root_dir.display(),
    );
}

/// Emit event: cache served a request (debug level).
pub fn emit_cache_hit(model: ModelType) {
    debug!(event = "cache.hit", model = %model);
}

/// Emit event: cache could not serve a request (debug level).
pub fn emit_cache_miss(model: ModelType, strategy: &dyn std::fmt::Display) {
    debug!(event = "cache.miss", model = %model, strategy = %strategy);
}

/// Emit event: a fresh value was cached and broadcast.
pub fn emit_workspace_published(projects: usize, subscribers: usize) {
    info!(
        event = "workspace.published",
        projects = projects,
        subscribers = subscribers,
    );
}
