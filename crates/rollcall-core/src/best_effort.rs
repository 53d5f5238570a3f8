//! Results that degrade to a documented default instead of failing.
//!
//! The count and duplicate-check paths favor availability: when the backend
//! cannot answer they fall back to a fixed value. [`BestEffort`] keeps that
//! fallback visible to the caller.

use std::fmt;

/// A value that was either read from the backend or substituted on failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BestEffort<T> {
    /// The backend answered.
    Live(T),
    /// The backend failed and `value` is the documented default.
    Fallback {
        /// Substituted value.
        value: T,
        /// Why the live value was unavailable.
        reason: String,
    },
}

impl<T> BestEffort<T> {
    /// Wraps a failure as a fallback to `value`.
    pub fn fallback(value: T, reason: impl fmt::Display) -> Self {
        Self::Fallback {
            value,
            reason: reason.to_string(),
        }
    }

    /// Returns the value regardless of where it came from.
    pub fn value(&self) -> &T {
        match self {
            Self::Live(value) | Self::Fallback { value, .. } => value,
        }
    }

    /// Consumes the wrapper and returns the value.
    pub fn into_value(self) -> T {
        match self {
            Self::Live(value) | Self::Fallback { value, .. } => value,
        }
    }

    /// Returns `true` if the value is a substitute.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    /// Returns the failure reason for a fallback.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Live(_) => None,
            Self::Fallback { reason, .. } => Some(reason),
        }
    }
}
