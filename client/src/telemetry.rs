//! Tracing bootstrap for host shells.
//!
//! The crate itself only emits `tracing` events; the embedding shell decides
//! whether and how they are rendered. [`init`] wires the conventional
//! JSON-over-env-filter subscriber for shells that want a default.

use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

/// Install the default JSON subscriber filtered by `RUST_LOG`.
///
/// Safe to call more than once; a second initialisation is logged and
/// ignored so embedding shells can layer their own subscriber instead.
pub fn init() {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }
}
