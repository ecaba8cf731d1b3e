//! # keywatch-std
//!
//! The subscription multiplexer behind keywatch.
//!
//! This crate provides:
//! - **Registry**: [`Registry`], one shared native listener per target with
//!   exact attach/detach bookkeeping
//! - **Dispatch**: fan-out of native events to matching subscriptions with
//!   per-callback failure isolation
//! - **Subscriptions**: [`Subscription`] records keyed by identity
//! - **Testing**: [`testing::MockTarget`], [`testing::KeyRecorder`]

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use keywatch_core;

// Modules
pub mod dispatch;
pub mod error;
pub mod registry;
pub mod subscription;
pub mod testing;

pub use dispatch::{DispatchPolicy, DispatchReport, ErrorSink};
pub use error::SubscribeError;
pub use registry::{Registry, RegistryBuilder, RegistryRef};
pub use subscription::Subscription;
