//! Shared data model and error type for the clubbot assignment engine.
//!
//! This crate has no I/O of its own: it defines the catalog and round
//! ledger shapes (`catalog`, `round`), the config schema (`config`), the
//! error enum every other crate propagates (`error`), and the structured
//! trace events the engine emits (`trace`).

pub mod catalog;
pub mod config;
pub mod error;
pub mod round;
pub mod trace;

pub use catalog::{Catalog, Member, Role};
pub use error::{Error, Result};
pub use round::{AcceptedRole, PendingOffer, RoundState};
