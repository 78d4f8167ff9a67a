//! WebSocket endpoint for browser clients.
//!
//! Each connection is one subscriber on the [`machmon_events::EventHub`].
//! The hub never blocks on a slow client: a subscriber that cannot keep
//! up has its channel closed, which ends the sender task and tears the
//! connection down.

pub mod handler;
