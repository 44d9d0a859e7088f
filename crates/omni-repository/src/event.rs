//! Change notification for refreshed workspaces

use std::sync::Arc;

use chrono::{DateTime, Utc};
use omni_model::OmniEclipseWorkspace;

/// Published once per successful fresh fetch, carrying that fetch's result.
#[derive(Debug, Clone)]
pub struct EclipseWorkspaceUpdateEvent {
    pub workspace: Arc<OmniEclipseWorkspace>,
    pub published_at: DateTime<Utc>,
}

impl EclipseWorkspaceUpdateEvent {
    pub fn new(workspace: Arc<OmniEclipseWorkspace>) -> Self {
        Self {
            workspace,
            published_at: Utc::now(),
        }
    }
}
