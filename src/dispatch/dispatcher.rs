//! The dispatcher and its builder.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use tokio::sync::oneshot;

use crate::command::{Command, Request};
use crate::fetch::{FetchHandle, PublicAddressFetch};
use crate::provider::{InfoProvider, ProviderError};
use crate::transport::{HttpClient, ReqwestClient};

use super::{BuildError, DispatchError, Response};

/// Routes requests to providers and delivers exactly one [`Response`] each.
///
/// Synchronous commands run on the caller's thread. The public address
/// command is handed to a [`PublicAddressFetch`] and answered later.
/// The dispatcher holds no mutable state between calls.
///
/// # Example
///
/// ```no_run
/// use telemetry_dispatch::command::Request;
/// use telemetry_dispatch::dispatch::Dispatcher;
///
/// # fn example(dispatcher: &Dispatcher) {
/// dispatcher.dispatch(&Request::new("getRamInfo"), |response| {
///     println!("{response:?}");
/// });
/// # }
/// ```
pub struct Dispatcher<H = ReqwestClient> {
    providers: HashMap<Command, Box<dyn InfoProvider>>,
    public_address: PublicAddressFetch<H>,
}

impl<H> Dispatcher<H> {
    /// Starts building a dispatcher around the public address lookup.
    #[must_use]
    pub fn builder(public_address: PublicAddressFetch<H>) -> DispatcherBuilder<H> {
        DispatcherBuilder::new(public_address)
    }
}

impl<H: HttpClient + 'static> Dispatcher<H> {
    /// Dispatches one request.
    ///
    /// For synchronous commands (and unsupported names) `on_complete` runs
    /// before this returns and the result is `None`. For the public address
    /// command the lookup is started in the background, this returns
    /// `Some(handle)` immediately, and `on_complete` runs later on a runtime
    /// thread.
    pub fn dispatch<F>(&self, request: &Request, on_complete: F) -> Option<FetchHandle>
    where
        F: FnOnce(Response) + Send + 'static,
    {
        let command = match request.resolve() {
            Ok(command) => command,
            Err(unknown) => {
                tracing::warn!(command = %unknown.0, "Rejected unsupported command");
                on_complete(DispatchError::from(unknown).into());
                return None;
            }
        };

        tracing::debug!(%command, "Dispatching");

        if command.is_async() {
            return Some(self.public_address.start(on_complete));
        }

        on_complete(self.query(command));
        None
    }

    /// Dispatches one request and waits for its response.
    pub async fn call(&self, request: &Request) -> Response {
        let (tx, rx) = oneshot::channel();
        let _handle = self.dispatch(request, move |response| {
            // The receiver lives until this future completes.
            let _ = tx.send(response);
        });

        // PendingFetch guarantees a completion, so the sender is never dropped unused.
        rx.await.unwrap_or_else(|_| Response::null())
    }

    /// Answers a synchronous command from its provider.
    fn query(&self, command: Command) -> Response {
        let Some(provider) = self.providers.get(&command) else {
            return provider_failure(
                command,
                ProviderError::Unavailable {
                    what: command.name(),
                },
            );
        };

        match panic::catch_unwind(AssertUnwindSafe(|| provider.fetch())) {
            Ok(Ok(value)) => Response::Success(value),
            Ok(Err(source)) => provider_failure(command, source),
            Err(payload) => provider_failure(
                command,
                ProviderError::Panicked {
                    message: panic_message(payload.as_ref()),
                },
            ),
        }
    }
}

fn provider_failure(command: Command, source: ProviderError) -> Response {
    tracing::warn!(%command, error = %source, "Provider failed");
    DispatchError::Provider { command, source }.into()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

impl<H> fmt::Debug for Dispatcher<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut commands: Vec<_> = self.providers.keys().copied().collect();
        commands.sort();

        f.debug_struct("Dispatcher")
            .field("providers", &commands)
            .field("public_address_url", &self.public_address.url().as_str())
            .finish()
    }
}

/// Builder fixing the command-to-provider table.
///
/// Every synchronous command must have exactly one provider; registering a
/// command twice keeps the last provider.
pub struct DispatcherBuilder<H> {
    providers: HashMap<Command, Box<dyn InfoProvider>>,
    public_address: PublicAddressFetch<H>,
    rejected: Option<BuildError>,
}

impl<H> DispatcherBuilder<H> {
    /// Creates a builder with no providers.
    #[must_use]
    pub fn new(public_address: PublicAddressFetch<H>) -> Self {
        Self {
            providers: HashMap::new(),
            public_address,
            rejected: None,
        }
    }

    /// Registers the provider answering `command`.
    #[must_use]
    pub fn provider<P: InfoProvider + 'static>(mut self, command: Command, provider: P) -> Self {
        if command.is_async() {
            self.rejected.get_or_insert(BuildError::AsyncCommand(command));
        } else {
            self.providers.insert(command, Box::new(provider));
        }
        self
    }

    /// Finishes the table.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::AsyncCommand`] if a provider was registered for
    /// the asynchronous command, or [`BuildError::MissingProvider`] naming the
    /// first synchronous command without a provider.
    pub fn build(self) -> Result<Dispatcher<H>, BuildError> {
        if let Some(error) = self.rejected {
            return Err(error);
        }

        if let Some(missing) = Command::synchronous().find(|c| !self.providers.contains_key(c)) {
            return Err(BuildError::MissingProvider(missing));
        }

        Ok(Dispatcher {
            providers: self.providers,
            public_address: self.public_address,
        })
    }
}

impl<H> fmt::Debug for DispatcherBuilder<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatcherBuilder")
            .field("provider_count", &self.providers.len())
            .field("rejected", &self.rejected)
            .finish()
    }
}
