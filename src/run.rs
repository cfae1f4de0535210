//! Application execution logic.
//!
//! This module assembles the dispatcher from configuration and drives it
//! in one of two modes: a single `query`, or a JSON-lines `serve` loop
//! over stdin/stdout.

use std::future::Future;
use std::io;

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::runtime::Handle;
use tokio::signal;
use tokio::sync::mpsc;
use tokio::task::JoinError;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::LinesStream;

use telemetry_dispatch::command::{Command, Request};
use telemetry_dispatch::config::ValidatedConfig;
use telemetry_dispatch::dispatch::{BuildError, Dispatcher};
use telemetry_dispatch::fetch::{FetchHandle, PublicAddressFetch};
use telemetry_dispatch::protocol::{self, Envelope};
use telemetry_dispatch::provider::host;
use telemetry_dispatch::transport::{HttpClient, HttpError, ReqwestClient};

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// Failed to build the HTTP client.
    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] HttpError),

    /// Failed to assemble the dispatcher.
    #[error("Failed to assemble dispatcher: {0}")]
    Assemble(#[source] BuildError),

    /// Failed to read requests.
    #[error("Failed to read request: {0}")]
    Read(#[source] io::Error),

    /// Failed to write responses.
    #[error("Failed to write response: {0}")]
    Write(#[source] io::Error),

    /// The response writer task panicked or was cancelled.
    #[error("Response writer stopped: {0}")]
    Writer(#[source] JoinError),

    /// Failed to encode a response.
    #[error("Failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),

    /// A one-shot query was answered with a failure.
    #[error("Query '{0}' failed")]
    QueryFailed(String),
}

/// Counts of what a `serve` session handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServeSummary {
    /// Lines decoded and dispatched.
    pub dispatched: usize,
    /// Lines rejected as malformed.
    pub malformed: usize,
}

/// Builds the production dispatcher: host providers plus a reqwest-backed
/// public address lookup spawning on `runtime`.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built or a provider is
/// missing.
pub fn build_dispatcher(
    config: &ValidatedConfig,
    runtime: Handle,
) -> Result<Dispatcher<ReqwestClient>, RunError> {
    let client = ReqwestClient::with_timeouts(config.timeouts.connect, config.timeouts.read)
        .map_err(RunError::Client)?;
    let public_address = PublicAddressFetch::new(
        client,
        config.public_ip_url.clone(),
        config.timeouts,
        runtime,
    );

    host::install(Dispatcher::builder(public_address), &config.host)
        .build()
        .map_err(RunError::Assemble)
}

/// Lists supported command names, one per line.
#[must_use]
pub fn command_list() -> String {
    Command::ALL
        .iter()
        .map(|c| {
            if c.is_async() {
                format!("{c} (async)")
            } else {
                c.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Answers one command and returns the response line.
///
/// The line is returned for failures too, alongside `false`.
///
/// # Errors
///
/// Returns an error if the response cannot be encoded.
pub async fn query<H: HttpClient + 'static>(
    dispatcher: &Dispatcher<H>,
    name: &str,
) -> Result<(String, bool), RunError> {
    let response = dispatcher.call(&Request::new(name)).await;
    let envelope = Envelope::new(serde_json::Value::Null, &response);
    Ok((envelope.encode()?, envelope.is_success()))
}

/// Serves JSON-lines requests from `input`, writing responses to `output`.
///
/// Synchronous responses are written in request order. Public address
/// responses are written when their lookup completes, so they may come
/// after later requests; the echoed id correlates them.
///
/// Reading stops at end of input or when `shutdown` resolves. Lookups
/// already started are drained before returning.
///
/// # Errors
///
/// Returns an error if reading input or writing output fails.
pub async fn serve<H, R, W, S>(
    dispatcher: &Dispatcher<H>,
    input: R,
    output: W,
    shutdown: S,
) -> Result<ServeSummary, RunError>
where
    H: HttpClient + 'static,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
    S: Future<Output = ()>,
{
    let (tx, rx) = mpsc::unbounded_channel::<String>();
    let writer = tokio::spawn(write_lines(rx, output));

    let mut lines = LinesStream::new(input.lines());
    let mut pending: Vec<FetchHandle> = Vec::new();
    let mut summary = ServeSummary::default();

    tokio::pin!(shutdown);

    let read_result = loop {
        let line = tokio::select! {
            biased;

            () = &mut shutdown => {
                tracing::info!("Shutdown signal received, stopping...");
                break Ok(());
            }

            line = lines.next() => line,
        };

        let line = match line {
            Some(Ok(line)) => line,
            Some(Err(e)) => break Err(RunError::Read(e)),
            None => {
                tracing::debug!("End of input");
                break Ok(());
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        pending.retain(|handle| !handle.is_finished());

        match protocol::parse_line(&line) {
            Ok(wire) => {
                summary.dispatched += 1;
                let sender = tx.clone();
                let id = wire.id;
                if let Some(handle) = dispatcher.dispatch(&wire.request, move |response| {
                    send_line(&sender, &Envelope::new(id, &response));
                }) {
                    pending.push(handle);
                }
            }
            Err(error) => {
                summary.malformed += 1;
                tracing::warn!(error = %error, "Rejected malformed request");
                send_line(&tx, &Envelope::malformed(&error));
            }
        }
    };

    if !pending.is_empty() {
        tracing::debug!(count = pending.len(), "Draining public address lookups");
    }
    for handle in pending {
        handle.wait().await;
    }

    drop(tx);
    writer
        .await
        .map_err(RunError::Writer)?
        .map_err(RunError::Write)?;

    read_result.map(|()| summary)
}

fn send_line(tx: &mpsc::UnboundedSender<String>, envelope: &Envelope) {
    match envelope.encode() {
        Ok(line) => {
            if tx.send(line).is_err() {
                tracing::warn!("Response writer closed, dropping response");
            }
        }
        Err(e) => tracing::error!(error = %e, "Failed to encode response"),
    }
}

async fn write_lines<W: AsyncWrite + Unpin>(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut output: W,
) -> io::Result<()> {
    while let Some(line) = rx.recv().await {
        output.write_all(line.as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;
    }
    output.shutdown().await
}

/// Executes the `serve` mode against stdin/stdout.
///
/// Excluded from coverage - requires process stdio and signal handling.
#[cfg(not(tarpaulin_include))]
pub async fn execute_serve(config: ValidatedConfig) -> Result<(), RunError> {
    let dispatcher = build_dispatcher(&config, Handle::current())?;
    tracing::info!("Serving JSON-lines requests on stdin");

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let summary = serve(&dispatcher, stdin, tokio::io::stdout(), shutdown_signal()).await?;

    tracing::info!(
        dispatched = summary.dispatched,
        malformed = summary.malformed,
        "Session finished"
    );
    Ok(())
}

/// Executes a single `query` and prints its response line.
///
/// Excluded from coverage - writes to process stdout.
#[cfg(not(tarpaulin_include))]
pub async fn execute_query(config: ValidatedConfig, name: &str) -> Result<(), RunError> {
    let dispatcher = build_dispatcher(&config, Handle::current())?;
    let (line, success) = query(&dispatcher, name).await?;
    println!("{line}");

    if success {
        Ok(())
    } else {
        Err(RunError::QueryFailed(name.to_string()))
    }
}

/// Returns a future that completes when a shutdown signal is received.
///
/// Excluded from coverage - requires OS signal handling.
#[cfg(not(tarpaulin_include))]
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
