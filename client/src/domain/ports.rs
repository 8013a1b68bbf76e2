//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with the two hosted
//! collaborators: the path-addressed realtime data store and the
//! authentication provider. Each trait exposes strongly typed errors so
//! adapters map their failures into predictable variants instead of
//! returning `anyhow::Result`.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::watch;

use super::{AuthUser, QuestionId, UserId};

/// Path of the question collection.
pub const QUESTIONS_PATH: &str = "questions";
/// Path of the reply collection, keyed per question below it.
pub const REPLIES_PATH: &str = "replies";
/// Path of the profile collection.
pub const USERS_PATH: &str = "users";

/// Path of a single question record.
#[must_use]
pub fn question_path(id: &QuestionId) -> String {
    format!("{QUESTIONS_PATH}/{id}")
}

/// Path of a question's reply group.
#[must_use]
pub fn replies_path(id: &QuestionId) -> String {
    format!("{REPLIES_PATH}/{id}")
}

/// Path of a user's profile record.
#[must_use]
pub fn user_path(id: &UserId) -> String {
    format!("{USERS_PATH}/{id}")
}

/// Errors surfaced by the data store adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataStoreError {
    /// The request never completed: connectivity, timeout, or client build
    /// failures.
    #[error("data store request failed: {message}")]
    Transport {
        /// Adapter-provided failure description.
        message: String,
    },
    /// The store answered with a non-success status.
    #[error("data store rejected the request with status {status}: {message}")]
    Status {
        /// HTTP-style status code returned by the store.
        status: u16,
        /// Adapter-provided failure description.
        message: String,
    },
    /// The store's payload could not be decoded.
    #[error("data store payload could not be decoded: {message}")]
    Decode {
        /// Adapter-provided failure description.
        message: String,
    },
}

impl DataStoreError {
    /// Helper for transport-level failures.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Helper for non-success status responses.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// Helper for payload decoding failures.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// Errors surfaced by the auth provider adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthProviderError {
    /// The provider rejected the supplied credentials.
    #[error("credentials were rejected: {message}")]
    InvalidCredentials {
        /// Provider-supplied rejection reason.
        message: String,
    },
    /// The operation needs a signed-in session and none exists.
    #[error("no user is signed in")]
    NoSession,
    /// The provider refused the requested account mutation.
    #[error("account operation was rejected: {message}")]
    Rejected {
        /// Provider-supplied rejection reason.
        message: String,
    },
    /// The request never completed.
    #[error("auth request failed: {message}")]
    Transport {
        /// Adapter-provided failure description.
        message: String,
    },
}

impl AuthProviderError {
    /// Helper for credential rejections.
    pub fn invalid_credentials(message: impl Into<String>) -> Self {
        Self::InvalidCredentials {
            message: message.into(),
        }
    }

    /// Helper for refused account mutations.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    /// Helper for transport-level failures.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

/// Path-addressed hierarchical store consumed by every service.
///
/// Paths are slash-separated node addresses such as `questions/-Nq1`. The
/// store holds free-form JSON; [`crate::domain::records`] owns the decoding
/// conventions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Single-event read of the node at `path`.
    ///
    /// Returns `None` when nothing exists there.
    async fn read(&self, path: &str) -> Result<Option<Value>, DataStoreError>;

    /// Single-event read of `path` filtered server-side to children whose
    /// `child_field` equals `value`.
    async fn read_matching(
        &self,
        path: &str,
        child_field: &str,
        value: &str,
    ) -> Result<Option<Value>, DataStoreError>;

    /// Append `record` under `path` with a server-generated child key.
    ///
    /// Returns the generated key once the store acknowledges the write.
    async fn push(&self, path: &str, record: Value) -> Result<String, DataStoreError>;

    /// Write `record` at exactly `path`, replacing any existing value.
    async fn write(&self, path: &str, record: Value) -> Result<(), DataStoreError>;

    /// Remove the value at `path`. Removing an absent node succeeds.
    async fn remove(&self, path: &str) -> Result<(), DataStoreError>;
}

/// Email/password authentication provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Create an account and establish a session for it.
    async fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, AuthProviderError>;

    /// Establish a session with existing credentials.
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthProviderError>;

    /// Tear down the current session.
    async fn sign_out(&self) -> Result<(), AuthProviderError>;

    /// Re-verify the current password ahead of a sensitive change.
    async fn reauthenticate(
        &self,
        email: &str,
        current_password: &str,
    ) -> Result<(), AuthProviderError>;

    /// Replace the current session's password.
    async fn update_password(&self, new_password: &str) -> Result<(), AuthProviderError>;

    /// The active session's user, if any.
    fn current_user(&self) -> Option<AuthUser>;

    /// Subscribe to session-state changes.
    ///
    /// The receiver yields the signed-in user or `None` after sign-out.
    fn subscribe(&self) -> watch::Receiver<Option<AuthUser>>;
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn paths_address_single_records() {
        let question = QuestionId::new("q1").expect("valid id");
        let user = UserId::new("u1").expect("valid id");
        assert_eq!(question_path(&question), "questions/q1");
        assert_eq!(replies_path(&question), "replies/q1");
        assert_eq!(user_path(&user), "users/u1");
    }

    #[rstest]
    fn store_errors_render_their_context() {
        let err = DataStoreError::status(404, "not found");
        assert_eq!(
            err.to_string(),
            "data store rejected the request with status 404: not found"
        );
        let err = DataStoreError::transport("connection refused");
        assert_eq!(
            err.to_string(),
            "data store request failed: connection refused"
        );
    }

    #[rstest]
    fn auth_errors_render_their_context() {
        let err = AuthProviderError::invalid_credentials("INVALID_PASSWORD");
        assert_eq!(
            err.to_string(),
            "credentials were rejected: INVALID_PASSWORD"
        );
        assert_eq!(AuthProviderError::NoSession.to_string(), "no user is signed in");
    }
}
