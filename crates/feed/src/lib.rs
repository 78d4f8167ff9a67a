//! Reconnecting WebSocket client for the upstream sample feed.
//!
//! The feed is the outbound real-time connection to the source of
//! truth for unit telemetry. This crate owns the connection state
//! machine (`Disconnected -> Connecting -> Connected -> Reconnecting ->
//! Connected | Failed`), bounded-retry reconnection with exponential
//! backoff, and the message loop that forwards parsed samples into the
//! [`machmon_registry::UnitStore`].

pub mod client;
pub mod messages;
pub mod processor;
pub mod reconnect;
pub mod runner;

pub use client::{FeedClient, FeedClientError};
pub use reconnect::{ReconnectConfig, ReconnectOutcome};
pub use runner::{spawn_feed, FeedHandle, FeedState};
