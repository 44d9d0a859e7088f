//! Fetch strategies, cache updates and workspace events against the
//! in-memory connection mechanism.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use omni_client::fakes::{sample_build, MemoryBuildConnector};
use omni_client::{
    ActionExecutor, Distribution, ErrorKind, ListenerError, ModelType, ProgressEvent,
    ProgressListener, ToolingClient,
};
use omni_model::{RawEclipseModel, RawEclipseProject, RawFailure, RawFailureKind};
use omni_repository::{
    CompositeModelRepository, FetchStrategy, FixedRequestAttributes, TransientRequestAttributes,
};
use tokio::sync::broadcast::error::TryRecvError;

fn connector() -> Arc<MemoryBuildConnector> {
    Arc::new(
        MemoryBuildConnector::new()
            .with_build("/ws/app", sample_build("/ws/app", &["core", "web"])),
    )
}

fn repository(connector: &Arc<MemoryBuildConnector>) -> CompositeModelRepository {
    let client = ToolingClient::new(ActionExecutor::current().unwrap(), connector.clone());
    CompositeModelRepository::new(vec![FixedRequestAttributes::new("/ws/app")], client).unwrap()
}

fn transient() -> TransientRequestAttributes {
    TransientRequestAttributes::default()
}

// ── Strategies ──────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn cache_only_never_fetches() {
    let connector = connector();
    let repository = repository(&connector);

    let result = repository
        .fetch_eclipse_workspace(&transient(), FetchStrategy::FromCacheOnly)
        .await
        .unwrap();

    assert!(result.is_none());
    assert_eq!(connector.opens(), 0);
    assert_eq!(connector.fetches(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn load_if_not_cached_fetches_once_then_reuses() {
    let connector = connector();
    let repository = repository(&connector);

    let first = repository
        .fetch_eclipse_workspace(&transient(), FetchStrategy::LoadIfNotCached)
        .await
        .unwrap()
        .unwrap();
    let second = repository
        .fetch_eclipse_workspace(&transient(), FetchStrategy::LoadIfNotCached)
        .await
        .unwrap()
        .unwrap();
    let cached = repository
        .fetch_eclipse_workspace(&transient(), FetchStrategy::FromCacheOnly)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(first.len(), 3);
    assert!(Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&first, &cached));
    assert_eq!(connector.fetches(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn force_reload_fetches_every_call_and_publishes_each() {
    let connector = connector();
    let repository = repository(&connector);
    let mut events = repository.subscribe();

    let first = repository
        .fetch_eclipse_workspace(&transient(), FetchStrategy::ForceReload)
        .await
        .unwrap()
        .unwrap();
    let second = repository
        .fetch_eclipse_workspace(&transient(), FetchStrategy::ForceReload)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(connector.fetches(), 2);
    assert!(!Arc::ptr_eq(&first, &second));

    let event_one = events.try_recv().unwrap();
    let event_two = events.try_recv().unwrap();
    assert!(Arc::ptr_eq(&event_one.workspace, &first));
    assert!(Arc::ptr_eq(&event_two.workspace, &second));
    assert!(event_one.published_at <= event_two.published_at);
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));

    // The reloaded value replaced the cached one.
    let cached = repository
        .fetch_eclipse_workspace(&transient(), FetchStrategy::FromCacheOnly)
        .await
        .unwrap()
        .unwrap();
    assert!(Arc::ptr_eq(&cached, &second));
}

#[tokio::test(flavor = "multi_thread")]
async fn cache_hits_publish_nothing() {
    let connector = connector();
    let repository = repository(&connector);
    repository
        .fetch_eclipse_workspace(&transient(), FetchStrategy::LoadIfNotCached)
        .await
        .unwrap();

    let mut events = repository.subscribe();
    repository
        .fetch_eclipse_workspace(&transient(), FetchStrategy::LoadIfNotCached)
        .await
        .unwrap();
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test(flavor = "multi_thread")]
async fn publishing_without_subscribers_succeeds() {
    let connector = connector();
    let repository = repository(&connector);
    let result = repository
        .fetch_eclipse_workspace(&transient(), FetchStrategy::ForceReload)
        .await
        .unwrap();
    assert!(result.is_some());
}

#[tokio::test(flavor = "multi_thread")]
async fn cached_workspace_holds_every_fetched_project() {
    // Two subprojects of one build share a directory.
    let mut build = RawEclipseModel::new();
    let root = build.add_project(RawEclipseProject::new("app", ":", "/ws/app"), None);
    build.add_project(RawEclipseProject::new("a", ":a", "/ws/shared"), Some(root));
    build.add_project(RawEclipseProject::new("b", ":b", "/ws/shared"), Some(root));
    let connector = Arc::new(MemoryBuildConnector::new().with_build("/ws/app", build));
    let client = ToolingClient::new(ActionExecutor::current().unwrap(), connector.clone());

    let mut composite = client.new_composite_connector();
    composite.add_participant("/ws/app");
    let results = composite
        .connect()
        .unwrap()
        .models(ModelType::COMPOSITE)
        .unwrap()
        .fetch()
        .await
        .unwrap();

    let repository =
        CompositeModelRepository::new(vec![FixedRequestAttributes::new("/ws/app")], client)
            .unwrap();
    let workspace = repository
        .fetch_eclipse_workspace(&transient(), FetchStrategy::ForceReload)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(workspace.len(), results.len());
    let paths: Vec<&str> = workspace.projects().iter().map(|p| p.path.as_str()).collect();
    assert_eq!(paths, vec![":", ":a", ":b"]);
}

// ── Failures ────────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn failed_reload_keeps_cached_value() {
    let connector = connector();
    let repository = repository(&connector);
    let original = repository
        .fetch_eclipse_workspace(&transient(), FetchStrategy::ForceReload)
        .await
        .unwrap()
        .unwrap();

    connector.set_fetch_failure(
        "/ws/app",
        RawFailure::new(RawFailureKind::BuildFailed, "settings script failed"),
    );
    let mut events = repository.subscribe();
    let err = repository
        .fetch_eclipse_workspace(&transient(), FetchStrategy::ForceReload)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BuildExecutionFailed);
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));

    let cached = repository
        .fetch_eclipse_workspace(&transient(), FetchStrategy::FromCacheOnly)
        .await
        .unwrap()
        .unwrap();
    assert!(Arc::ptr_eq(&cached, &original));
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_first_load_caches_nothing() {
    let connector = Arc::new(MemoryBuildConnector::new().with_fetch_failure(
        "/ws/app",
        RawFailure::new(RawFailureKind::BuildCancelled, "cancelled"),
    ));
    let repository = repository(&connector);

    let err = repository
        .fetch_eclipse_workspace(&transient(), FetchStrategy::LoadIfNotCached)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OperationCancelled);

    let cached = repository
        .fetch_eclipse_workspace(&transient(), FetchStrategy::FromCacheOnly)
        .await
        .unwrap();
    assert!(cached.is_none());
}

// ── Request attributes ──────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn request_attributes_reach_the_connection() {
    let connector = connector();
    let client = ToolingClient::new(ActionExecutor::current().unwrap(), connector.clone());
    let fixed = FixedRequestAttributes::new("/ws/app")
        .with_distribution(Distribution::Version("8.5".to_string()))
        .with_arguments(["--offline"]);
    let repository = CompositeModelRepository::new(vec![fixed], client).unwrap();

    let notified = Arc::new(AtomicUsize::new(0));
    let counter = notified.clone();
    let listener: Arc<dyn ProgressListener> =
        Arc::new(move |_: &ProgressEvent| -> Result<(), ListenerError> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
    let transient = TransientRequestAttributes {
        color_output: true,
        progress_listeners: vec![listener],
    };

    repository
        .fetch_eclipse_workspace(&transient, FetchStrategy::ForceReload)
        .await
        .unwrap();

    let params = connector.last_parameters().unwrap();
    assert_eq!(params.arguments, vec!["--offline"]);
    assert!(params.color_output);
    assert_eq!(notified.load(Ordering::SeqCst), 1);
    assert_eq!(
        connector.opened_distributions()[0].1,
        Some(Distribution::Version("8.5".to_string()))
    );
}

// ── Blocking form ───────────────────────────────────────────────────────

#[test]
fn blocking_fetch_populates_cache() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let connector = connector();
    let client = ToolingClient::new(
        ActionExecutor::new(runtime.handle().clone()),
        connector.clone(),
    );
    let repository =
        CompositeModelRepository::new(vec![FixedRequestAttributes::new("/ws/app")], client)
            .unwrap();

    let loaded = repository
        .fetch_eclipse_workspace_blocking(&transient(), FetchStrategy::LoadIfNotCached)
        .unwrap()
        .unwrap();
    assert!(loaded.find_by_directory(Path::new("/ws/app/web")).is_some());
    assert_eq!(loaded.root_projects().len(), 1);

    let cached = repository
        .fetch_eclipse_workspace_blocking(&transient(), FetchStrategy::FromCacheOnly)
        .unwrap()
        .unwrap();
    assert!(Arc::ptr_eq(&loaded, &cached));
    assert_eq!(connector.fetches(), 1);
}
