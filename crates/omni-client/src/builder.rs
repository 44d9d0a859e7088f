//! Model fetch operations over a composite connection.
//!
//! A [`CompositeModelBuilder`] is configured with per-operation parameters
//! and then run exactly once, using one of three calling conventions:
//!
//! - [`CompositeModelBuilder::get`]: blocks the calling thread
//! - [`CompositeModelBuilder::get_with`]: returns at once, outcome goes to a handler
//! - [`CompositeModelBuilder::fetch`]: awaited from async code
//!
//! All three run the same action on the runtime and translate failures the
//! same way.

use std::backtrace::Backtrace;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use omni_model::OmniEclipseProject;
use tokio::sync::oneshot;
use tracing::Instrument;
use uuid::Uuid;

use crate::aggregator::CompositeAggregator;
use crate::connection::{BuildConnector, OperationParameters, ProgressListener};
use crate::error::ToolingError;
use crate::executor::ActionExecutor;
use crate::metrics::METRICS;
use crate::obs;
use crate::participant::Participant;
use crate::request::{ModelResult, ModelType};
use crate::translate::translate;

/// Normalized projects of a composite, each tagged with its request.
pub type EclipseProjectResults = Vec<ModelResult<Arc<OmniEclipseProject>>>;

/// One pending model fetch against a composite.
pub struct CompositeModelBuilder {
    model: ModelType,
    executor: ActionExecutor,
    connector: Arc<dyn BuildConnector>,
    participants: Vec<Participant>,
    display_name: String,
    params: OperationParameters,
    operation_id: Uuid,
}

impl CompositeModelBuilder {
    pub(crate) fn new(
        model: ModelType,
        executor: ActionExecutor,
        connector: Arc<dyn BuildConnector>,
        participants: Vec<Participant>,
        display_name: String,
    ) -> Self {
        Self {
            model,
            executor,
            connector,
            participants,
            params: OperationParameters {
                entry_point: format!("{display_name} models({model})"),
                ..Default::default()
            },
            display_name,
            operation_id: Uuid::new_v4(),
        }
    }

    pub fn model(&self) -> ModelType {
        self.model
    }

    /// Id tagging every tracing event of this operation.
    pub fn operation_id(&self) -> Uuid {
        self.operation_id
    }

    pub fn parameters(&self) -> &OperationParameters {
        &self.params
    }

    /// Tasks to run before the model is built.
    pub fn for_tasks<I, S>(mut self, tasks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params.tasks = tasks.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_arguments<I, S>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params.arguments = arguments.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_jvm_arguments<I, S>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params.jvm_arguments = arguments.into_iter().map(Into::into).collect();
        self
    }

    pub fn set_java_home(mut self, java_home: Option<PathBuf>) -> Self {
        self.params.java_home = java_home;
        self
    }

    pub fn set_gradle_user_home(mut self, gradle_user_home: Option<PathBuf>) -> Self {
        self.params.gradle_user_home = gradle_user_home;
        self
    }

    pub fn set_color_output(mut self, color_output: bool) -> Self {
        self.params.color_output = color_output;
        self
    }

    pub fn add_progress_listener(mut self, listener: Arc<dyn ProgressListener>) -> Self {
        self.params.progress_listeners.push(listener);
        self
    }

    /// Run the fetch and block the calling thread until it completes.
    ///
    /// A failure carries the frames of this thread after the frames where it
    /// originated.
    ///
    /// # Panics
    ///
    /// Panics when called from within an async execution context, like
    /// [`oneshot::Receiver::blocking_recv`]. Use [`Self::fetch`] there.
    pub fn get(self) -> Result<EclipseProjectResults, ToolingError> {
        let _span = obs::FetchSpan::enter(&self.operation_id);
        let (tx, rx) = oneshot::channel();
        self.submit(move |outcome| {
            let _ = tx.send(outcome);
        });
        Self::settle(rx.blocking_recv().ok())
    }

    /// Run the fetch without blocking. `handler` receives the outcome exactly
    /// once, on a runtime worker thread.
    pub fn get_with<H>(self, handler: H)
    where
        H: FnOnce(Result<EclipseProjectResults, ToolingError>) + Send + 'static,
    {
        self.submit(handler);
    }

    /// Run the fetch and await its outcome.
    pub async fn fetch(self) -> Result<EclipseProjectResults, ToolingError> {
        let (tx, rx) = oneshot::channel();
        self.submit(move |outcome| {
            let _ = tx.send(outcome);
        });
        Self::settle(rx.await.ok())
    }

    /// Outcome as seen by a waiting caller. A missing outcome means the
    /// action ended without settling.
    fn settle(
        outcome: Option<Result<EclipseProjectResults, ToolingError>>,
    ) -> Result<EclipseProjectResults, ToolingError> {
        match outcome {
            Some(Ok(results)) => Ok(results),
            Some(Err(err)) => Err(err.with_caller_trace(caller_frames())),
            None => {
                Err(ToolingError::terminated_without_result().with_caller_trace(caller_frames()))
            }
        }
    }

    fn submit<H>(self, handler: H)
    where
        H: FnOnce(Result<EclipseProjectResults, ToolingError>) + Send + 'static,
    {
        let Self {
            model,
            executor,
            connector,
            participants,
            display_name,
            params,
            operation_id,
        } = self;

        let action = async move {
            METRICS.inc_fetches_started();
            obs::emit_fetch_started(model, participants.len());
            let started = Instant::now();

            let aggregator = CompositeAggregator::new(connector);
            match aggregator.aggregate(model, &participants, &params).await {
                Ok(results) => {
                    obs::emit_fetch_finished(
                        model,
                        results.len(),
                        started.elapsed().as_millis() as u64,
                    );
                    Ok(results)
                }
                Err(failure) => {
                    let failure = failure.at(worker_frame(&operation_id));
                    let err = translate(failure, model, &display_name);
                    METRICS.inc_fetch_failures();
                    obs::emit_fetch_failed(model, err.kind(), &err);
                    Err(err)
                }
            }
        }
        .instrument(obs::fetch_span(&operation_id));

        executor.run(action, handler);
    }
}

impl std::fmt::Debug for CompositeModelBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeModelBuilder")
            .field("model", &self.model)
            .field("display_name", &self.display_name)
            .field("participants", &self.participants)
            .field("params", &self.params)
            .field("operation_id", &self.operation_id)
            .finish()
    }
}

fn worker_frame(operation_id: &Uuid) -> String {
    let thread = std::thread::current();
    format!(
        "model fetch {operation_id} on worker thread '{}'",
        thread.name().unwrap_or("unnamed")
    )
}

/// Frames of the thread observing a failure, headed by the thread's name.
fn caller_frames() -> Vec<String> {
    let thread = std::thread::current();
    let header = format!(
        "observed on caller thread '{}'",
        thread.name().unwrap_or("unnamed")
    );
    let backtrace = Backtrace::force_capture().to_string();
    std::iter::once(header)
        .chain(backtrace.lines().map(|line| line.trim().to_string()))
        .collect()
}
