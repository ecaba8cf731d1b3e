//! Errors returned by the consumer-facing API.

use keywatch_core::{KeySpecError, SubscriptionId};
use thiserror::Error;

/// Errors from [`Watcher`](crate::Watcher) operations that can be refused.
///
/// `watch` and `stop` themselves never fail; only the validating and
/// in-place-update variants do.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WatchError {
    /// The key spec can never match a real key.
    #[error("invalid key spec: {0}")]
    InvalidKeySpec(#[from] KeySpecError),

    /// The handle was stopped, or its registry cleared, before the update.
    #[error("{0} is no longer active")]
    Inactive(SubscriptionId),
}
