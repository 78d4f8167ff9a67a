//! Status event fan-out for the machine monitor.
//!
//! This crate provides the live distribution side of the system:
//!
//! - [`StatusEvent`] — the canonical state-change message.
//! - [`EventHub`] — bounded-buffer publish/subscribe hub that drops
//!   slow or dead subscribers instead of letting them backpressure
//!   everyone else.

pub mod event;
pub mod hub;

pub use event::StatusEvent;
pub use hub::{EventHub, SubscriberId};
