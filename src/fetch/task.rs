//! The background public address lookup.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::config::defaults;
use crate::dispatch::Response;
use crate::transport::{HttpClient, HttpRequest};

use super::{FetchFailure, PendingFetch};

/// Connect and read bounds for one lookup.
///
/// The client applies each bound on its own; the task additionally caps
/// the whole attempt at [`FetchTimeouts::total`] so that a client which
/// never returns still completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTimeouts {
    /// Maximum time to establish the connection.
    pub connect: Duration,
    /// Maximum time to wait on a read.
    pub read: Duration,
}

impl FetchTimeouts {
    /// Creates timeouts from explicit bounds.
    #[must_use]
    pub const fn new(connect: Duration, read: Duration) -> Self {
        Self { connect, read }
    }

    /// Upper bound for a whole attempt (connect + read).
    #[must_use]
    pub const fn total(&self) -> Duration {
        self.connect.saturating_add(self.read)
    }
}

impl Default for FetchTimeouts {
    /// 5000 ms to connect and 5000 ms to read.
    fn default() -> Self {
        Self::new(defaults::connect_timeout(), defaults::read_timeout())
    }
}

/// Handle to a started lookup.
///
/// Dropping the handle does not cancel the lookup.
#[derive(Debug)]
pub struct FetchHandle {
    task: JoinHandle<()>,
}

impl FetchHandle {
    /// Cancels the lookup.
    ///
    /// The completion callback still runs exactly once, with
    /// `Success(Null)`, unless the lookup had already completed.
    pub fn abort(&self) {
        self.task.abort();
    }

    /// Returns true once the completion callback has run.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits until the task has finished, whether it completed or was aborted.
    pub async fn wait(self) {
        if let Err(e) = self.task.await {
            if e.is_panic() {
                tracing::error!(error = %e, "Public address lookup task panicked");
            }
        }
    }
}

/// One-shot lookup of the device's public address.
///
/// Each [`start`](Self::start) spawns an independent task on the injected
/// runtime that performs a single GET against the echo endpoint. There is
/// no retry; callers re-dispatch to try again.
///
/// # Type Parameters
///
/// - `H`: The HTTP client implementation
///
/// # Example
///
/// ```no_run
/// use telemetry_dispatch::fetch::{FetchTimeouts, PublicAddressFetch};
/// use telemetry_dispatch::transport::ReqwestClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let timeouts = FetchTimeouts::default();
/// let client = ReqwestClient::with_timeouts(timeouts.connect, timeouts.read)?;
/// let fetch = PublicAddressFetch::new(
///     client,
///     "https://api.ipify.org?format=text".parse()?,
///     timeouts,
///     tokio::runtime::Handle::current(),
/// );
///
/// fetch.start(|response| println!("{response:?}"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct PublicAddressFetch<H> {
    client: Arc<H>,
    url: url::Url,
    timeouts: FetchTimeouts,
    runtime: Handle,
}

impl<H> PublicAddressFetch<H> {
    /// Creates a lookup against `url`, spawning work on `runtime`.
    #[must_use]
    pub fn new(client: H, url: url::Url, timeouts: FetchTimeouts, runtime: Handle) -> Self {
        Self {
            client: Arc::new(client),
            url,
            timeouts,
            runtime,
        }
    }

    /// Returns the echo endpoint.
    #[must_use]
    pub const fn url(&self) -> &url::Url {
        &self.url
    }

    /// Returns the configured timeouts.
    #[must_use]
    pub const fn timeouts(&self) -> FetchTimeouts {
        self.timeouts
    }
}

impl<H: HttpClient + 'static> PublicAddressFetch<H> {
    /// Performs the lookup on the current task, keeping the failure reason.
    ///
    /// # Errors
    ///
    /// Returns [`FetchFailure`] for a non-200 status, a client error, or
    /// when no response arrives within [`FetchTimeouts::total`].
    pub async fn lookup(&self) -> Result<String, FetchFailure> {
        lookup(self.client.as_ref(), HttpRequest::get(self.url.clone()), self.timeouts.total()).await
    }

    /// Starts the lookup in the background and returns immediately.
    ///
    /// `on_complete` is invoked exactly once, on a runtime worker thread,
    /// with `Success(Text(address))` or `Success(Null)`.
    pub fn start<F>(&self, on_complete: F) -> FetchHandle
    where
        F: FnOnce(Response) + Send + 'static,
    {
        let pending = PendingFetch::new(on_complete);
        let client = Arc::clone(&self.client);
        let request = HttpRequest::get(self.url.clone());
        let bound = self.timeouts.total();
        let span = tracing::debug_span!("public_address", url = %self.url);

        let task = self.runtime.spawn(
            async move {
                let outcome = lookup(client.as_ref(), request, bound).await;
                pending.complete(outcome);
            }
            .instrument(span),
        );

        FetchHandle { task }
    }
}

async fn lookup<H: HttpClient>(
    client: &H,
    request: HttpRequest,
    bound: Duration,
) -> Result<String, FetchFailure> {
    let response = tokio::time::timeout(bound, client.request(request))
        .await
        .map_err(|_| FetchFailure::TimedOut(bound))??;

    if !response.is_ok() {
        return Err(FetchFailure::Status(response.status));
    }

    Ok(response.body_text_lossy())
}
