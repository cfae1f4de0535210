//! The uniform response contract.

use crate::provider::Value;

use super::DispatchError;

/// Outcome of one request. Exactly one is delivered per request.
#[derive(Debug)]
pub enum Response {
    /// The command produced a value (possibly [`Value::Null`]).
    Success(Value),
    /// The command could not be answered.
    Failure(DispatchError),
}

impl Response {
    /// Creates a success response.
    #[must_use]
    pub fn success(value: impl Into<Value>) -> Self {
        Self::Success(value.into())
    }

    /// Creates a success response carrying no value.
    #[must_use]
    pub const fn null() -> Self {
        Self::Success(Value::Null)
    }

    /// Returns true for [`Response::Success`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns the value of a success response.
    #[must_use]
    pub const fn value(&self) -> Option<&Value> {
        match self {
            Self::Success(v) => Some(v),
            Self::Failure(_) => None,
        }
    }

    /// Returns the error of a failure response.
    #[must_use]
    pub const fn error(&self) -> Option<&DispatchError> {
        match self {
            Self::Success(_) => None,
            Self::Failure(e) => Some(e),
        }
    }
}

impl From<DispatchError> for Response {
    fn from(error: DispatchError) -> Self {
        Self::Failure(error)
    }
}
