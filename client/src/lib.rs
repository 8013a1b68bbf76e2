//! Application core of the DocQ medical Q&A client.
//!
//! Patients post questions, doctors reply, and both authenticate against a
//! hosted backend. This crate owns the portable logic between the
//! presentation shell and the two hosted collaborators: a path-addressed
//! realtime store and an email/password auth service, both consumed through
//! the ports in [`domain::ports`]. The shell renders; this crate fetches,
//! joins, validates, and writes.
//!
//! Out of scope by design: offline caching, conflict resolution, pagination,
//! and transactional multi-record updates. Every operation is a direct
//! composition of store calls, and a hung network call simply never
//! resolves — there is no cancellation or timeout beyond the adapters'
//! configured request timeout.

pub mod config;
pub mod domain;
pub mod outbound;
pub mod telemetry;

pub use config::ClientSettings;
