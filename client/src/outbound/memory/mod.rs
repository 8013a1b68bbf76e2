//! Deterministic in-process implementations of the domain ports.
//!
//! Used by integration tests and front-end previews: push keys are ordered,
//! accounts are scripted, and read failures can be injected per path.

mod auth;
mod store;

pub use auth::MemoryAuthProvider;
pub use store::MemoryDataStore;
