//! Information providers.
//!
//! This module provides:
//! - The value shape every provider returns ([`Value`])
//! - The provider capability ([`InfoProvider`])
//! - Provider failures ([`ProviderError`])
//! - Concrete host implementations ([`host`])

pub mod host;

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::network::EnumerateError;

/// A telemetry value.
///
/// Serialized untagged, so on the wire a value is plain JSON:
/// `null`, a string, an object of strings, or an array of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// No value available (e.g. no private address found).
    Null,
    /// A single string.
    Text(String),
    /// A small string-to-string mapping. Keys are kept sorted.
    Map(BTreeMap<String, String>),
    /// An ordered sequence of strings.
    List(Vec<String>),
}

impl Value {
    /// Creates a text value.
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Returns true for [`Value::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the text, if this is a [`Value::Text`].
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<Option<String>> for Value {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::Null, Self::Text)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Value {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self::Map(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Error type for provider reads.
///
/// Describes what went wrong without dictating recovery strategy.
/// The dispatcher turns every variant into a failure response.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The information category does not exist on this device
    /// (e.g. a desktop without a battery).
    #[error("{what} is not available on this device")]
    Unavailable {
        /// What was looked for.
        what: &'static str,
    },

    /// A platform file could not be read.
    #[error("Failed to read '{}': {source}", path.display())]
    Read {
        /// Path that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A platform file was read but its contents made no sense.
    #[error("Malformed value in '{}': {reason}", path.display())]
    Malformed {
        /// Path that held the value
        path: PathBuf,
        /// What was wrong with it
        reason: String,
    },

    /// Network interface enumeration failed.
    #[error(transparent)]
    Enumerate(#[from] EnumerateError),

    /// Serializing a structured value failed.
    #[error("Failed to encode value: {0}")]
    Encode(#[from] serde_json::Error),

    /// The provider panicked while reading.
    #[error("Provider panicked: {message}")]
    Panicked {
        /// Panic payload, if it was a string
        message: String,
    },
}

impl ProviderError {
    /// Creates a `Read` error for the given path.
    #[must_use]
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }
}

/// A capability that synchronously returns one telemetry value or fails.
///
/// # Design
///
/// - The dispatcher holds providers as `Box<dyn InfoProvider>` and never
///   needs to know which category it is invoking
/// - Platform handles are injected through constructors so tests can
///   substitute fakes
///
/// # Implementation Notes
///
/// - Each call reads live state; do not cache
/// - Calls should be fast and must not block on the network
pub trait InfoProvider: Send + Sync {
    /// Reads the current value.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the underlying platform source fails
    /// or does not exist.
    fn fetch(&self) -> Result<Value, ProviderError>;
}

impl<F> InfoProvider for F
where
    F: Fn() -> Result<Value, ProviderError> + Send + Sync,
{
    fn fetch(&self) -> Result<Value, ProviderError> {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod value {
        use super::*;

        #[test]
        fn null_serializes_as_json_null() {
            assert_eq!(serde_json::to_string(&Value::Null).unwrap(), "null");
        }

        #[test]
        fn text_serializes_as_plain_string() {
            let json = serde_json::to_string(&Value::text("abc")).unwrap();
            assert_eq!(json, r#""abc""#);
        }

        #[test]
        fn map_serializes_as_object_with_sorted_keys() {
            let value: Value = [("b", "2"), ("a", "1")].into_iter().collect();
            let json = serde_json::to_string(&value).unwrap();
            assert_eq!(json, r#"{"a":"1","b":"2"}"#);
        }

        #[test]
        fn list_serializes_as_array() {
            let value = Value::List(vec!["x".to_string(), "y".to_string()]);
            assert_eq!(serde_json::to_string(&value).unwrap(), r#"["x","y"]"#);
        }

        #[test]
        fn from_option_maps_none_to_null() {
            assert_eq!(Value::from(None::<String>), Value::Null);
            assert_eq!(
                Value::from(Some("10.0.0.1".to_string())),
                Value::text("10.0.0.1")
            );
        }

        #[test]
        fn as_text_only_matches_text() {
            assert_eq!(Value::text("a").as_text(), Some("a"));
            assert_eq!(Value::Null.as_text(), None);
            assert!(Value::Null.is_null());
        }
    }

    mod provider_error {
        use super::*;

        #[test]
        fn unavailable_names_category() {
            let error = ProviderError::Unavailable { what: "battery" };
            assert_eq!(error.to_string(), "battery is not available on this device");
        }

        #[test]
        fn read_includes_path() {
            let error = ProviderError::read(
                "/etc/machine-id",
                std::io::Error::from(std::io::ErrorKind::NotFound),
            );
            assert!(error.to_string().contains("/etc/machine-id"));
        }

        #[test]
        fn enumerate_is_transparent() {
            let error = ProviderError::from(EnumerateError::Platform {
                message: "netlink down".to_string(),
            });
            assert!(error.to_string().contains("netlink down"));
        }
    }

    #[test]
    fn closures_are_providers() {
        let provider = || -> Result<Value, ProviderError> { Ok(Value::text("fixed")) };
        assert_eq!(provider.fetch().unwrap(), Value::text("fixed"));
    }
}
