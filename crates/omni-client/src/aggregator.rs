//! Project tree aggregation across composite participants.
//!
//! [`CompositeAggregator`] fetches each participant's raw model, resolves it
//! to the root of its build, and collects every distinct build's normalized
//! tree once.

use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;

use futures::FutureExt;
use omni_model::{normalize, preorder, OmniEclipseProject, RawEclipseModel, RawFailure, RawProjectId};

use crate::connection::{BuildConnector, OperationParameters};
use crate::metrics::METRICS;
use crate::obs;
use crate::participant::Participant;
use crate::request::{ModelResult, ModelType, RequestId};

/// Walk parent links from the requested project up to the build's root.
///
/// Fails on a parent chain that cycles or points at a missing project.
pub fn resolve_root(model: &RawEclipseModel) -> Result<RawProjectId, RawFailure> {
    let mut current = model.requested;
    // A chain longer than the arena must revisit a project.
    for _ in 0..=model.len() {
        match model.project(current)?.parent {
            Some(parent) => current = parent,
            None => return Ok(current),
        }
    }
    Err(RawFailure::malformed(format!(
        "parent links starting at project {} form a cycle",
        model.requested
    )))
}

/// Collects normalized project trees from several participants.
pub struct CompositeAggregator {
    connector: Arc<dyn BuildConnector>,
}

impl CompositeAggregator {
    pub fn new(connector: Arc<dyn BuildConnector>) -> Self {
        Self { connector }
    }

    /// Aggregate the project trees of `participants`.
    ///
    /// Participants are fetched one after the other in the given order. A
    /// participant whose resolved root directory was already collected is
    /// skipped; the first one wins. Any failure aborts the whole aggregation.
    pub async fn aggregate(
        &self,
        model: ModelType,
        participants: &[Participant],
        params: &OperationParameters,
    ) -> Result<Vec<ModelResult<Arc<OmniEclipseProject>>>, RawFailure> {
        let mut processed_roots: HashSet<PathBuf> = HashSet::new();
        let mut results = Vec::new();

        for participant in participants {
            let raw = self.fetch_participant(participant, params).await?;
            let root_id = resolve_root(&raw)?;
            let root_dir = raw.project(root_id)?.project_directory.clone();

            if !processed_roots.insert(root_dir.clone()) {
                METRICS.inc_roots_deduplicated();
                obs::emit_root_skipped(participant.root_dir(), &root_dir);
                continue;
            }

            let root = normalize(&raw, root_id)?;
            let request = RequestId {
                participant: participant.root_dir().to_path_buf(),
                model,
            };
            results.extend(
                preorder(&root)
                    .into_iter()
                    .map(|project| ModelResult::new(request.clone(), project)),
            );
        }

        Ok(results)
    }

    /// Open, fetch, close. The connection is closed whether the fetch
    /// succeeded, failed or panicked; a panic resumes after the close.
    async fn fetch_participant(
        &self,
        participant: &Participant,
        params: &OperationParameters,
    ) -> Result<RawEclipseModel, RawFailure> {
        let mut connection = self.connector.open(participant).await?;
        let fetched = AssertUnwindSafe(connection.fetch_eclipse_model(params))
            .catch_unwind()
            .await;
        connection.close().await;

        let raw = fetched.unwrap_or_else(|panic| panic::resume_unwind(panic))?;
        METRICS.inc_participants_fetched();
        obs::emit_participant_fetched(participant.root_dir(), raw.len());
        Ok(raw)
    }
}
