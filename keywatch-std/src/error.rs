//! Errors returned by the registry.

use keywatch_core::SubscriptionId;
use thiserror::Error;

/// Reasons [`Registry::subscribe`](crate::Registry::subscribe) refuses a
/// record.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeError {
    /// The record was allocated by a different registry. Ids are only unique
    /// per registry, so it could shadow a live subscription.
    #[error("{0} belongs to another registry")]
    ForeignSubscription(SubscriptionId),

    /// The record is already registered on a target.
    #[error("{0} is already subscribed")]
    AlreadySubscribed(SubscriptionId),
}
