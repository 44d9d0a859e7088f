//! Async execution layer used by model fetches.
//!
//! The runtime and its worker threads belong to the host application; the
//! client only submits actions to it.

use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tokio::runtime::Handle;

use crate::error::ToolingError;
use crate::obs;

/// Submits fetch actions to a tokio runtime.
#[derive(Debug, Clone)]
pub struct ActionExecutor {
    handle: Handle,
}

impl ActionExecutor {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Executor for the runtime the caller is running on.
    pub fn current() -> Result<Self, ToolingError> {
        Handle::try_current().map(Self::new).map_err(|e| {
            ToolingError::configuration(format!("no tokio runtime available: {e}"))
        })
    }

    /// Run `action` on a worker thread and hand its outcome to `handler`.
    ///
    /// `handler` runs exactly once, on whichever worker thread completed the
    /// action. An action that panics settles as
    /// [`ToolingError::terminated_without_result`].
    pub fn run<A, T, H>(&self, action: A, handler: H)
    where
        A: Future<Output = Result<T, ToolingError>> + Send + 'static,
        T: Send + 'static,
        H: FnOnce(Result<T, ToolingError>) + Send + 'static,
    {
        self.handle.spawn(async move {
            let outcome = match AssertUnwindSafe(action).catch_unwind().await {
                Ok(outcome) => outcome,
                Err(panic) => {
                    obs::emit_action_panicked(panic_message(panic.as_ref()));
                    Err(ToolingError::terminated_without_result())
                }
            };
            handler(outcome);
        });
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
