//! Atomic, mutex-guarded persistence for per-club catalog and round state.
//!
//! One directory per club holds `catalog.json` and `state.json`. Every write
//! serializes to a sibling temp file and renames it over the target, so a
//! reader never observes a torn file (invariant I6). A per-file mutex
//! guards the in-memory mirror, so a command's mutation is visible to the
//! very next read without a disk round-trip.

mod atomic;
mod club_store;

pub use atomic::AtomicJsonStore;
pub use club_store::ClubStore;
