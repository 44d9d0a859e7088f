//! In-memory fake of the build connection mechanism
//!
//! Provides `MemoryBuildConnector`, which serves scripted raw models or
//! failures per participant directory and counts every open, fetch and
//! close, so tests can verify how many connections an operation used.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use omni_model::{
    RawAttribute, RawEclipseModel, RawEclipseProject, RawFailure, RawFailureKind,
    RawSourceDirectory, RawTaskSelector,
};

use crate::connection::{BuildConnector, OperationParameters, ProgressEvent, ProjectConnection};
use crate::participant::{Distribution, Participant};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A build with a root project at `root_dir` and one child per entry of
/// `subprojects`, located at `root_dir/<name>`.
pub fn sample_build(root_dir: &str, subprojects: &[&str]) -> RawEclipseModel {
    let root_dir = PathBuf::from(root_dir);
    let root_name = root_dir
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("root")
        .to_string();

    let mut model = RawEclipseModel::new();
    let mut root = RawEclipseProject::new(root_name, ":", &root_dir);
    root.source_directories
        .push(RawSourceDirectory::new(root_dir.join("src/main/java"), "src/main/java"));
    root.task_selectors = RawAttribute::Value(vec![RawTaskSelector {
        name: "build".to_string(),
        description: Some("Assembles and tests this project and all subprojects".to_string()),
        public: true,
        selected_task_paths: std::iter::once(":build".to_string())
            .chain(subprojects.iter().map(|s| format!(":{s}:build")))
            .collect(),
    }]);
    let root = model.add_project(root, None);

    for name in subprojects {
        model.add_project(
            RawEclipseProject::new(*name, format!(":{name}"), root_dir.join(name)),
            Some(root),
        );
    }
    model
}

#[derive(Debug, Clone)]
enum Scripted {
    Model(RawEclipseModel),
    FetchFailure(RawFailure),
    OpenFailure(RawFailure),
}

/// Parameters seen by the most recent fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordedParameters {
    pub entry_point: String,
    pub tasks: Vec<String>,
    pub arguments: Vec<String>,
    pub jvm_arguments: Vec<String>,
    pub java_home: Option<PathBuf>,
    pub gradle_user_home: Option<PathBuf>,
    pub color_output: bool,
}

#[derive(Debug, Default)]
struct Counters {
    opens: AtomicUsize,
    fetches: AtomicUsize,
    closes: AtomicUsize,
    last_parameters: Mutex<Option<RecordedParameters>>,
    distributions: Mutex<Vec<(PathBuf, Option<Distribution>)>>,
}

// ---------------------------------------------------------------------------
// MemoryBuildConnector
// ---------------------------------------------------------------------------

/// Connector serving scripted responses keyed by participant directory.
///
/// Opening a directory without a script fails with a connection failure.
#[derive(Debug, Default)]
pub struct MemoryBuildConnector {
    scripts: Mutex<HashMap<PathBuf, Scripted>>,
    counters: Arc<Counters>,
}

impl MemoryBuildConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `model` for the build whose root is at `dir`.
    pub fn with_build(self, dir: impl Into<PathBuf>, model: RawEclipseModel) -> Self {
        self.insert_build(dir, model);
        self
    }

    /// Serve the build already registered at `root_dir` for `sub_dir` too,
    /// with the requested project pointing at the subproject.
    pub fn with_subproject_of(self, sub_dir: impl Into<PathBuf>, root_dir: impl AsRef<Path>) -> Self {
        let root = match lock(&self.scripts).get(root_dir.as_ref()) {
            Some(Scripted::Model(model)) => Some(model.clone()),
            _ => None,
        };
        if let Some(model) = root {
            self.insert_build(sub_dir, model);
        }
        self
    }

    pub fn with_fetch_failure(self, dir: impl Into<PathBuf>, failure: RawFailure) -> Self {
        self.set_fetch_failure(dir, failure);
        self
    }

    pub fn with_open_failure(self, dir: impl Into<PathBuf>, failure: RawFailure) -> Self {
        lock(&self.scripts).insert(dir.into(), Scripted::OpenFailure(failure));
        self
    }

    /// Serve `model` for `dir` from now on. The requested project is the
    /// one located at `dir`, when the model has one.
    pub fn insert_build(&self, dir: impl Into<PathBuf>, model: RawEclipseModel) {
        let dir = dir.into();
        let model = match model.find_by_directory(&dir) {
            Some(id) => model.with_requested(id),
            None => model,
        };
        lock(&self.scripts).insert(dir, Scripted::Model(model));
    }

    /// Fail every later fetch for `dir` with `failure`.
    pub fn set_fetch_failure(&self, dir: impl Into<PathBuf>, failure: RawFailure) {
        lock(&self.scripts).insert(dir.into(), Scripted::FetchFailure(failure));
    }

    pub fn opens(&self) -> usize {
        self.counters.opens.load(Ordering::SeqCst)
    }

    pub fn fetches(&self) -> usize {
        self.counters.fetches.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.counters.closes.load(Ordering::SeqCst)
    }

    pub fn last_parameters(&self) -> Option<RecordedParameters> {
        lock(&self.counters.last_parameters).clone()
    }

    /// Distribution selector of every open, in order.
    pub fn opened_distributions(&self) -> Vec<(PathBuf, Option<Distribution>)> {
        lock(&self.counters.distributions).clone()
    }
}

#[async_trait]
impl BuildConnector for MemoryBuildConnector {
    async fn open(
        &self,
        participant: &Participant,
    ) -> Result<Box<dyn ProjectConnection>, RawFailure> {
        self.counters.opens.fetch_add(1, Ordering::SeqCst);
        lock(&self.counters.distributions).push((
            participant.root_dir().to_path_buf(),
            participant.distribution().cloned(),
        ));

        let script = lock(&self.scripts).get(participant.root_dir()).cloned();
        let response = match script {
            Some(Scripted::Model(model)) => Ok(model),
            Some(Scripted::FetchFailure(failure)) => Err(failure),
            Some(Scripted::OpenFailure(failure)) => return Err(failure),
            None => {
                return Err(RawFailure::new(
                    RawFailureKind::Connection,
                    format!(
                        "Project directory '{}' does not exist.",
                        participant.root_dir().display()
                    ),
                )
                .at("MemoryBuildConnector::open"))
            }
        };

        Ok(Box::new(MemoryProjectConnection {
            root_dir: participant.root_dir().to_path_buf(),
            response,
            counters: Arc::clone(&self.counters),
            closed: false,
        }))
    }
}

// ---------------------------------------------------------------------------
// MemoryProjectConnection
// ---------------------------------------------------------------------------

struct MemoryProjectConnection {
    root_dir: PathBuf,
    response: Result<RawEclipseModel, RawFailure>,
    counters: Arc<Counters>,
    closed: bool,
}

#[async_trait]
impl ProjectConnection for MemoryProjectConnection {
    async fn fetch_eclipse_model(
        &mut self,
        params: &OperationParameters,
    ) -> Result<RawEclipseModel, RawFailure> {
        self.counters.fetches.fetch_add(1, Ordering::SeqCst);
        *lock(&self.counters.last_parameters) = Some(RecordedParameters {
            entry_point: params.entry_point.clone(),
            tasks: params.tasks.clone(),
            arguments: params.arguments.clone(),
            jvm_arguments: params.jvm_arguments.clone(),
            java_home: params.java_home.clone(),
            gradle_user_home: params.gradle_user_home.clone(),
            color_output: params.color_output,
        });

        let event = ProgressEvent::new(format!(
            "Fetching Eclipse model for {}",
            self.root_dir.display()
        ));
        let listener_failures: Vec<RawFailure> = params
            .progress_listeners
            .iter()
            .filter_map(|listener| listener.status_changed(&event).err())
            .map(|e| RawFailure::new(RawFailureKind::Other, e.to_string()))
            .collect();
        if !listener_failures.is_empty() {
            return Err(RawFailure::new(
                RawFailureKind::ListenerNotification,
                format!("{} progress listener(s) failed", listener_failures.len()),
            )
            .with_causes(listener_failures)
            .at("MemoryProjectConnection::fetch_eclipse_model"));
        }

        self.response
            .clone()
            .map_err(|failure| failure.at("MemoryProjectConnection::fetch_eclipse_model"))
    }

    async fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.counters.closes.fetch_add(1, Ordering::SeqCst);
        }
    }
}
