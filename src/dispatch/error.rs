//! Error types for dispatching.

use thiserror::Error;

use crate::command::{Command, UnknownCommand};
use crate::provider::ProviderError;

/// Failure reasons surfaced to the caller in a [`super::Response`].
///
/// Network lookup outcomes never appear here; they collapse into a
/// nullable success value.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The command name is not in the supported set.
    #[error("Unsupported command: {0}")]
    UnsupportedCommand(String),

    /// A synchronous provider failed.
    #[error("{command} failed: {source}")]
    Provider {
        /// The command whose provider failed
        command: Command,
        /// Underlying provider error
        #[source]
        source: ProviderError,
    },
}

impl DispatchError {
    /// Stable machine-readable code for this failure kind.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedCommand(_) => "UNSUPPORTED_COMMAND",
            Self::Provider { .. } => "PROVIDER_ERROR",
        }
    }
}

impl From<UnknownCommand> for DispatchError {
    fn from(error: UnknownCommand) -> Self {
        Self::UnsupportedCommand(error.0)
    }
}

/// Error type for assembling a [`super::Dispatcher`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// A synchronous command has no provider registered.
    #[error("No provider registered for {0}")]
    MissingProvider(Command),

    /// A provider was registered for the asynchronous command.
    #[error("{0} is answered asynchronously and cannot take a provider")]
    AsyncCommand(Command),
}
