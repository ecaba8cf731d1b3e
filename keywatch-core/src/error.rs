//! Error types for keywatch.
//!
//! - [`CallbackError`] - A subscriber callback failed during dispatch
//! - [`KeySpecError`] - A key spec was rejected by validation
//!
//! Neither is ever returned from a dispatch pass: callback failures are
//! isolated and reported to an error sink, and invalid events are dropped.

use crate::handler::SubscriptionId;
use thiserror::Error;

/// A boxed error type for callback failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A subscriber callback failed while handling a dispatched key event.
#[derive(Error, Debug)]
pub enum CallbackError {
    /// The callback returned an error.
    #[error("callback for {subscription} failed on `{code}`")]
    Failed {
        /// The subscription whose callback failed.
        subscription: SubscriptionId,
        /// The key code being dispatched.
        code: String,
        /// The error returned by the callback.
        #[source]
        source: BoxError,
    },

    /// The callback panicked.
    #[error("callback for {subscription} panicked on `{code}`: {message}")]
    Panicked {
        /// The subscription whose callback panicked.
        subscription: SubscriptionId,
        /// The key code being dispatched.
        code: String,
        /// The panic payload, if it was a string.
        message: String,
    },
}

impl CallbackError {
    /// The subscription whose callback failed.
    pub fn subscription(&self) -> SubscriptionId {
        match self {
            CallbackError::Failed { subscription, .. }
            | CallbackError::Panicked { subscription, .. } => *subscription,
        }
    }

    /// The key code that was being dispatched.
    pub fn code(&self) -> &str {
        match self {
            CallbackError::Failed { code, .. } | CallbackError::Panicked { code, .. } => code,
        }
    }
}

/// A key spec that can never match anything.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeySpecError {
    /// A list spec with no codes in it.
    #[error("key spec lists no key codes")]
    Empty,

    /// A blank key code. Events without a code are never dispatched, so this
    /// could not match.
    #[error("key code at position {0} is empty")]
    EmptyCode(usize),
}
