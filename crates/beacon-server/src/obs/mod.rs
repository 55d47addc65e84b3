//! In-process request metrics.
//!
//! Series are stored as atomics in an explicitly constructed registry,
//! updated by the `track` middleware and rendered by the `/metrics` handler.

pub mod metrics;
pub mod process;
pub mod track;
