//! beacon core: error surface and pipeline report types.
//!
//! This crate holds the contracts shared by the HTTP service and the tooling
//! that reports build results for it. It carries no HTTP or runtime
//! dependencies.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `BeaconError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod report;

/// Shared result type.
pub use error::{BeaconError, Result};
