//! In-memory auth provider fake.
//!
//! Accounts are held in a map keyed by email; the active session is mirrored
//! onto a watch channel exactly like the REST adapter so the session
//! resolver behaves identically under test.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::watch;

use crate::domain::ports::{AuthProvider, AuthProviderError};
use crate::domain::{AuthUser, UserId};

/// The hosted provider refuses passwords shorter than this.
const MIN_PASSWORD_LEN: usize = 6;

struct Account {
    password: String,
    user: AuthUser,
}

#[derive(Default)]
struct Inner {
    accounts: HashMap<String, Account>,
    next_uid: u64,
}

/// Deterministic in-memory implementation of [`AuthProvider`].
pub struct MemoryAuthProvider {
    inner: Mutex<Inner>,
    tx: watch::Sender<Option<AuthUser>>,
}

impl Default for MemoryAuthProvider {
    fn default() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            inner: Mutex::new(Inner::default()),
            tx,
        }
    }
}

impl MemoryAuthProvider {
    /// Create a provider with no accounts and no session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account without signing it in; returns its user id.
    ///
    /// # Panics
    ///
    /// Panics when `email` is already registered; scripted fixtures must not
    /// collide.
    pub fn seed_account(&self, email: &str, password: &str) -> UserId {
        let mut guard = self.lock();
        assert!(
            !guard.accounts.contains_key(email),
            "fixture account {email} already exists"
        );
        let user = next_user(&mut guard, email);
        let id = user.id.clone();
        guard.accounts.insert(
            email.to_owned(),
            Account {
                password: password.to_owned(),
                user,
            },
        );
        id
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn next_user(inner: &mut Inner, email: &str) -> AuthUser {
    inner.next_uid += 1;
    let id = UserId::new(format!("user-{}", inner.next_uid))
        .unwrap_or_else(|err| panic!("generated uid must validate: {err}"));
    AuthUser {
        id,
        email: email.to_owned(),
    }
}

#[async_trait]
impl AuthProvider for MemoryAuthProvider {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, AuthProviderError> {
        let mut guard = self.lock();
        if guard.accounts.contains_key(email) {
            return Err(AuthProviderError::rejected("EMAIL_EXISTS"));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AuthProviderError::rejected(
                "WEAK_PASSWORD : Password should be at least 6 characters",
            ));
        }
        let user = next_user(&mut guard, email);
        guard.accounts.insert(
            email.to_owned(),
            Account {
                password: password.to_owned(),
                user: user.clone(),
            },
        );
        drop(guard);
        let _ = self.tx.send(Some(user.clone()));
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthProviderError> {
        let guard = self.lock();
        let Some(account) = guard.accounts.get(email) else {
            return Err(AuthProviderError::invalid_credentials("EMAIL_NOT_FOUND"));
        };
        if account.password != password {
            return Err(AuthProviderError::invalid_credentials("INVALID_PASSWORD"));
        }
        let user = account.user.clone();
        drop(guard);
        let _ = self.tx.send(Some(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), AuthProviderError> {
        let _ = self.tx.send(None);
        Ok(())
    }

    async fn reauthenticate(
        &self,
        email: &str,
        current_password: &str,
    ) -> Result<(), AuthProviderError> {
        let guard = self.lock();
        match guard.accounts.get(email) {
            Some(account) if account.password == current_password => Ok(()),
            Some(_) => Err(AuthProviderError::invalid_credentials("INVALID_PASSWORD")),
            None => Err(AuthProviderError::invalid_credentials("EMAIL_NOT_FOUND")),
        }
    }

    async fn update_password(&self, new_password: &str) -> Result<(), AuthProviderError> {
        let current = self.tx.borrow().clone().ok_or(AuthProviderError::NoSession)?;
        if new_password.len() < MIN_PASSWORD_LEN {
            return Err(AuthProviderError::rejected(
                "WEAK_PASSWORD : Password should be at least 6 characters",
            ));
        }
        let mut guard = self.lock();
        let account = guard
            .accounts
            .get_mut(&current.email)
            .ok_or(AuthProviderError::NoSession)?;
        account.password = new_password.to_owned();
        Ok(())
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.tx.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<AuthUser>> {
        self.tx.subscribe()
    }
}
