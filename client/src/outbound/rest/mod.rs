//! Reqwest adapters for the hosted store and auth service.
//!
//! These adapters own transport details only: URL construction, HTTP error
//! mapping, and DTO decoding. Domain conventions (defaulted fields, path
//! layout) stay in `domain::records` and `domain::ports`.

mod auth;
mod dto;
mod store;

pub use auth::RestAuthProvider;
pub use store::RestDataStore;
