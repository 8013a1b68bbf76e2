//! Account lifecycle service: registration, sign-in, password change,
//! profile reads.
//!
//! Every operation is terminal-and-local: a failure is mapped to one coarse
//! error code plus a message and handed back to the shell, never retried.

use std::sync::Arc;

use serde_json::json;

use super::ports::{self, AuthProvider, AuthProviderError, DataStore};
use super::records::{self, ProfileRecord};
use super::{AuthUser, Credentials, Error, PasswordChange, RegistrationForm, Role};

/// Profile of a signed-in user as rendered by the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    /// Display name chosen at registration.
    pub name: String,
    /// Email address on the profile record.
    pub email: String,
    /// Resolved role tag; defaults to patient for unknown tags.
    pub role: Role,
}

fn map_auth_error(err: &AuthProviderError) -> Error {
    match err {
        AuthProviderError::InvalidCredentials { message } => Error::not_authenticated(message),
        AuthProviderError::NoSession => Error::not_authenticated("no user is signed in"),
        AuthProviderError::Rejected { .. } | AuthProviderError::Transport { .. } => {
            Error::write_failed(err.to_string())
        }
    }
}

/// Service owning account creation and session management.
#[derive(Clone)]
pub struct AccountService<S, A> {
    store: Arc<S>,
    auth: Arc<A>,
}

impl<S, A> AccountService<S, A> {
    /// Create a service over store and auth provider handles.
    pub const fn new(store: Arc<S>, auth: Arc<A>) -> Self {
        Self { store, auth }
    }
}

impl<S: DataStore, A: AuthProvider> AccountService<S, A> {
    /// Create an account and write its profile record.
    ///
    /// Field validation happens in [`RegistrationForm::try_from_parts`],
    /// before any remote call: a validation failure leaves no account and no
    /// profile record behind.
    ///
    /// # Errors
    ///
    /// - [`crate::domain::ErrorCode::WriteFailed`] when the provider refuses
    ///   the account, or when the profile write fails afterwards. In the
    ///   latter case the account already exists; the caller is told the
    ///   profile save failed.
    pub async fn register(&self, form: &RegistrationForm) -> Result<AuthUser, Error> {
        let user = self
            .auth
            .create_account(form.email(), form.password())
            .await
            .map_err(|err| map_auth_error(&err))?;

        let profile = json!({
            "name": form.name(),
            "email": form.email(),
            "userType": form.role().tag(),
        });
        self.store
            .write(&ports::user_path(&user.id), profile)
            .await
            .map_err(|err| Error::write_failed(format!("failed to save user data: {err}")))?;
        Ok(user)
    }

    /// Establish a session with existing credentials.
    ///
    /// # Errors
    ///
    /// [`crate::domain::ErrorCode::NotAuthenticated`] carrying the provider's
    /// rejection message.
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthUser, Error> {
        self.auth
            .sign_in(credentials.email(), credentials.password())
            .await
            .map_err(|err| match err {
                AuthProviderError::Transport { .. } => Error::fetch_failed(err.to_string()),
                _ => Error::not_authenticated(err.to_string()),
            })
    }

    /// Tear down the current session.
    ///
    /// # Errors
    ///
    /// [`crate::domain::ErrorCode::WriteFailed`] when the provider cannot
    /// complete the sign-out.
    pub async fn sign_out(&self) -> Result<(), Error> {
        self.auth
            .sign_out()
            .await
            .map_err(|err| map_auth_error(&err))
    }

    /// Reauthenticate with the current password, then set the new one.
    ///
    /// # Errors
    ///
    /// - [`crate::domain::ErrorCode::NotAuthenticated`] without a session or
    ///   when reauthentication is rejected; the password is left unchanged.
    /// - [`crate::domain::ErrorCode::WriteFailed`] when the update itself
    ///   fails.
    pub async fn change_password(
        &self,
        session: Option<&AuthUser>,
        change: &PasswordChange,
    ) -> Result<(), Error> {
        let user = session.ok_or_else(|| {
            Error::not_authenticated("you need to be signed in to change your password")
        })?;
        self.auth
            .reauthenticate(&user.email, change.current_password())
            .await
            .map_err(|err| Error::not_authenticated(format!("reauthentication failed: {err}")))?;
        self.auth
            .update_password(change.new_password())
            .await
            .map_err(|err| Error::write_failed(format!("failed to update password: {err}")))
    }

    /// Fetch the active session's profile record.
    ///
    /// # Errors
    ///
    /// - [`crate::domain::ErrorCode::NotAuthenticated`] without a session.
    /// - [`crate::domain::ErrorCode::FetchFailed`] when the lookup fails.
    /// - [`crate::domain::ErrorCode::ProfileIncomplete`] when the record is
    ///   missing or carries no usable display name.
    pub async fn profile(&self, session: Option<&AuthUser>) -> Result<UserProfile, Error> {
        let user = session.ok_or_else(|| {
            Error::not_authenticated("you need to be signed in to view your profile")
        })?;
        let snapshot = self
            .store
            .read(&ports::user_path(&user.id))
            .await
            .map_err(|err| Error::fetch_failed(format!("failed to load profile: {err}")))?;
        let record = records::decode_record::<ProfileRecord>(snapshot)
            .ok_or_else(|| Error::profile_incomplete("your profile could not be found"))?;
        if record.name.trim().is_empty() {
            return Err(Error::profile_incomplete("your profile has no display name"));
        }
        Ok(UserProfile {
            role: Role::from_tag(&record.user_type),
            name: record.name,
            email: record.email,
        })
    }
}
