//! Domain primitives, ports, and services.
//!
//! Purpose: everything the presentation shell calls lives here, expressed
//! over the two ports in [`ports`]. Keep types immutable and document
//! invariants and serialisation contracts (serde) in each type's Rustdoc.
//!
//! Public surface:
//! - `Error` / `ErrorCode` — the coarse error taxonomy handed to the shell.
//! - `QuestionService` — aggregation, submission, and best-effort deletion.
//! - `AccountService` — registration, sign-in, password change, profile.
//! - `SessionResolver` — auth-state subscription plus role resolution.

pub mod account;
pub mod auth;
pub mod error;
pub mod ids;
pub mod ports;
pub mod questions;
pub mod records;
pub mod session;
pub mod session_resolver;

pub use self::account::{AccountService, UserProfile};
pub use self::auth::{Credentials, FormValidationError, PasswordChange, RegistrationForm};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::ids::{IdValidationError, QuestionId, ReplyId, UserId};
pub use self::questions::{HydratedQuestion, QuestionDraft, QuestionService, Reply, Scope};
pub use self::session::{AuthUser, Role, SessionState};
pub use self::session_resolver::SessionResolver;

/// Convenient result alias for service calls.
///
/// # Examples
/// ```
/// use client::domain::{ClientResult, Error};
///
/// fn guard(signed_in: bool) -> ClientResult<()> {
///     if signed_in {
///         Ok(())
///     } else {
///         Err(Error::not_authenticated("sign in first"))
///     }
/// }
/// ```
pub type ClientResult<T> = Result<T, Error>;
