//! Strategy-driven cache of composite workspaces.
//!
//! Every successful fresh fetch replaces the cached workspace and is
//! broadcast to subscribers before it is returned. Failed fetches leave the
//! cache as it was.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use omni_client::obs;
use omni_client::{
    CompositeModelBuilder, EclipseProjectResults, ModelResult, ModelType, ToolingClient,
    ToolingError, METRICS,
};
use omni_model::OmniEclipseWorkspace;
use tokio::sync::broadcast;

use crate::attributes::{FixedRequestAttributes, TransientRequestAttributes};
use crate::event::EclipseWorkspaceUpdateEvent;
use crate::strategy::FetchStrategy;

/// Events buffered per subscriber before a slow one starts lagging.
const EVENT_CAPACITY: usize = 16;

type CacheKey = (ModelType, FixedRequestAttributes);

/// Caches the composite workspace of one fixed request.
pub struct CompositeModelRepository {
    fixed: FixedRequestAttributes,
    client: ToolingClient,
    cache: Mutex<HashMap<CacheKey, Arc<OmniEclipseWorkspace>>>,
    events: broadcast::Sender<EclipseWorkspaceUpdateEvent>,
}

impl CompositeModelRepository {
    /// Fails with a configuration error unless exactly one fixed request is
    /// given.
    pub fn new(
        requests: Vec<FixedRequestAttributes>,
        client: ToolingClient,
    ) -> Result<Self, ToolingError> {
        let count = requests.len();
        let fixed = match <[FixedRequestAttributes; 1]>::try_from(requests) {
            Ok([fixed]) => fixed,
            Err(_) => {
                return Err(ToolingError::configuration(format!(
                    "A composite model repository needs exactly one fixed request, got {count}."
                )))
            }
        };
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self {
            fixed,
            client,
            cache: Mutex::new(HashMap::new()),
            events,
        })
    }

    pub fn fixed_attributes(&self) -> &FixedRequestAttributes {
        &self.fixed
    }

    /// Receive an event for every workspace published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<EclipseWorkspaceUpdateEvent> {
        self.events.subscribe()
    }

    /// The composite workspace, served according to `strategy`.
    ///
    /// `Ok(None)` only for [`FetchStrategy::FromCacheOnly`] with nothing cached.
    pub async fn fetch_eclipse_workspace(
        &self,
        transient: &TransientRequestAttributes,
        strategy: FetchStrategy,
    ) -> Result<Option<Arc<OmniEclipseWorkspace>>, ToolingError> {
        if let Some(cached) = self.lookup(strategy) {
            return Ok(Some(cached));
        }
        if !strategy.may_fetch() {
            return Ok(None);
        }
        let results = self.prepare(transient)?.fetch().await?;
        Ok(Some(self.publish(results)))
    }

    /// Blocking form of [`Self::fetch_eclipse_workspace`]. Must not be called
    /// from async code.
    pub fn fetch_eclipse_workspace_blocking(
        &self,
        transient: &TransientRequestAttributes,
        strategy: FetchStrategy,
    ) -> Result<Option<Arc<OmniEclipseWorkspace>>, ToolingError> {
        if let Some(cached) = self.lookup(strategy) {
            return Ok(Some(cached));
        }
        if !strategy.may_fetch() {
            return Ok(None);
        }
        let results = self.prepare(transient)?.get()?;
        Ok(Some(self.publish(results)))
    }

    fn key(&self) -> CacheKey {
        (ModelType::COMPOSITE, self.fixed.clone())
    }

    fn cache(&self) -> MutexGuard<'_, HashMap<CacheKey, Arc<OmniEclipseWorkspace>>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lookup(&self, strategy: FetchStrategy) -> Option<Arc<OmniEclipseWorkspace>> {
        let cached = if strategy.accepts_cached() {
            self.cache().get(&self.key()).cloned()
        } else {
            None
        };
        match &cached {
            Some(_) => {
                METRICS.inc_cache_hits();
                obs::emit_cache_hit(ModelType::COMPOSITE);
            }
            None => obs::emit_cache_miss(ModelType::COMPOSITE, &strategy),
        }
        cached
    }

    fn prepare(
        &self,
        transient: &TransientRequestAttributes,
    ) -> Result<CompositeModelBuilder, ToolingError> {
        let mut connector = self.client.new_composite_connector();
        connector
            .add_participant(&self.fixed.project_dir)
            .set_distribution(self.fixed.distribution.clone());
        let builder = connector.connect()?.models(ModelType::COMPOSITE)?;
        Ok(transient.apply(self.fixed.apply(builder)))
    }

    fn publish(&self, results: EclipseProjectResults) -> Arc<OmniEclipseWorkspace> {
        let workspace = Arc::new(OmniEclipseWorkspace::new(
            results.into_iter().map(ModelResult::into_model),
        ));
        self.cache().insert(self.key(), Arc::clone(&workspace));

        // Sending fails only when nobody is subscribed.
        let subscribers = self.events.receiver_count();
        let _ = self
            .events
            .send(EclipseWorkspaceUpdateEvent::new(Arc::clone(&workspace)));
        obs::emit_workspace_published(workspace.len(), subscribers);
        workspace
    }
}

impl std::fmt::Debug for CompositeModelRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeModelRepository")
            .field("fixed", &self.fixed)
            .field("subscribers", &self.events.receiver_count())
            .finish_non_exhaustive()
    }
}
