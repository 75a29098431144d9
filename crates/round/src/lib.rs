//! Round state machine (C5): START_ROUND, ACCEPT, REJECT, DEFER,
//! CANCEL_ROUND, RESET, STATUS.
//!
//! Every function here takes the already-loaded `Catalog`/`RoundState` for
//! one club and mutates them in place; the caller (`cb-registry`) holds the
//! per-tenant lock for the duration and persists the result afterward, then
//! sends the returned `OutboundMessage`s only once that persistence commits
//! (§5). Nothing in this crate touches a filesystem or a network socket.

mod commands;
mod render;

pub use commands::{accept, cancel_round, defer, reject, reset, start_round, status, OutboundMessage};
