//! In-flight lookup state.

use std::fmt;
use std::time::Duration;

use tokio::time::Instant;

use crate::dispatch::Response;
use crate::provider::Value;

use super::FetchFailure;

/// Completion callback for an asynchronous request.
pub type Completion = Box<dyn FnOnce(Response) + Send + 'static>;

/// State held for the lifetime of one in-flight lookup.
///
/// Owns the caller's completion callback. [`PendingFetch::complete`]
/// consumes the value, so the outcome can be written at most once; if the
/// value is dropped before that (task aborted, runtime shut down, panic),
/// `Success(Null)` is delivered from `Drop` instead. Either way the callback
/// runs exactly once.
pub struct PendingFetch {
    started: Instant,
    on_complete: Option<Completion>,
}

impl PendingFetch {
    /// Creates pending state around a completion callback.
    #[must_use]
    pub fn new<F>(on_complete: F) -> Self
    where
        F: FnOnce(Response) + Send + 'static,
    {
        Self {
            started: Instant::now(),
            on_complete: Some(Box::new(on_complete)),
        }
    }

    /// Time since the lookup was started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Writes the outcome and invokes the callback.
    ///
    /// Failures are logged and delivered as `Success(Null)`.
    pub fn complete(mut self, outcome: Result<String, FetchFailure>) {
        let elapsed = self.elapsed();
        let value = match outcome {
            Ok(body) => {
                tracing::debug!(?elapsed, "Public address lookup succeeded");
                Value::Text(body)
            }
            Err(failure) => {
                tracing::warn!(error = %failure, ?elapsed, "Public address lookup failed, reporting no address");
                Value::Null
            }
        };
        self.deliver(Response::Success(value));
    }

    fn deliver(&mut self, response: Response) {
        if let Some(on_complete) = self.on_complete.take() {
            on_complete(response);
        }
    }
}

impl Drop for PendingFetch {
    fn drop(&mut self) {
        if self.on_complete.is_some() {
            tracing::warn!(elapsed = ?self.elapsed(), "Public address lookup abandoned, reporting no address");
            self.deliver(Response::null());
        }
    }
}

impl fmt::Debug for PendingFetch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingFetch")
            .field("started", &self.started)
            .field("completed", &self.on_complete.is_none())
            .finish()
    }
}
