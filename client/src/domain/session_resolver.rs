//! Session/role resolver.
//!
//! Observes the auth provider's session-state stream and, on every
//! transition to a signed-in state, issues one profile lookup to resolve the
//! acting user's role. The resolved [`SessionState`] is published on a watch
//! channel the shell subscribes to for selecting its top-level view
//! composition — the explicit-subscription replacement for ambient global
//! session state.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::warn;

use super::ports::{self, AuthProvider, DataStore};
use super::records::{self, ProfileRecord};
use super::{Role, SessionState, UserId};

/// Resolver owning one background task that mirrors auth-state changes.
///
/// Dropping the resolver aborts the task; the last published state remains
/// readable through outstanding receivers.
pub struct SessionResolver {
    rx: watch::Receiver<SessionState>,
    task: JoinHandle<()>,
}

impl SessionResolver {
    /// Spawn the resolver over store and auth provider handles.
    ///
    /// Roles are re-resolved on every sign-in transition; nothing is cached.
    /// Must be called from within a tokio runtime.
    pub fn spawn<S, A>(store: Arc<S>, auth: &A) -> Self
    where
        S: DataStore + 'static,
        A: AuthProvider + ?Sized,
    {
        let mut auth_rx = auth.subscribe();
        let (tx, rx) = watch::channel(SessionState::SignedOut);
        let task = tokio::spawn(async move {
            loop {
                let user = auth_rx.borrow_and_update().clone();
                let state = match user {
                    None => SessionState::SignedOut,
                    Some(user) => {
                        let role = resolve_role(store.as_ref(), &user.id).await;
                        SessionState::Active { user, role }
                    }
                };
                if tx.send(state).is_err() {
                    break;
                }
                if auth_rx.changed().await.is_err() {
                    break;
                }
            }
        });
        Self { rx, task }
    }

    /// The most recently published session state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.rx.borrow().clone()
    }

    /// Subscribe to session-state updates.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.rx.clone()
    }
}

impl Drop for SessionResolver {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Resolve a user's role with one profile lookup.
///
/// A failed lookup or an absent/unknown role tag resolves to the default
/// role, never an error.
async fn resolve_role<S: DataStore + ?Sized>(store: &S, user: &UserId) -> Role {
    match store.read(&ports::user_path(user)).await {
        Ok(snapshot) => records::decode_record::<ProfileRecord>(snapshot)
            .map(|profile| Role::from_tag(&profile.user_type))
            .unwrap_or_default(),
        Err(err) => {
            warn!(user = %user, error = %err, "role lookup failed, defaulting to patient");
            Role::default()
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit coverage for the resolver over mocked ports.
    use super::*;
    use crate::domain::AuthUser;
    use crate::domain::ports::{DataStoreError, MockAuthProvider, MockDataStore};
    use rstest::rstest;
    use serde_json::json;

    fn auth_user(id: &str) -> AuthUser {
        AuthUser {
            id: UserId::new(id).expect("valid fixture id"),
            email: format!("{id}@example.com"),
        }
    }

    fn auth_with_stream(rx: watch::Receiver<Option<AuthUser>>) -> MockAuthProvider {
        let mut auth = MockAuthProvider::new();
        auth.expect_subscribe().return_once(move || rx);
        auth
    }

    async fn wait_for_active(rx: &mut watch::Receiver<SessionState>) -> SessionState {
        rx.wait_for(|state| matches!(state, SessionState::Active { .. }))
            .await
            .expect("resolver publishes")
            .clone()
    }

    #[rstest]
    #[tokio::test]
    async fn sign_in_transitions_resolve_the_role() {
        let (auth_tx, auth_rx) = watch::channel(None);
        let mut store = MockDataStore::new();
        store
            .expect_read()
            .withf(|path| path == "users/d1")
            .returning(|_| Ok(Some(json!({ "name": "Dr. A", "userType": "Doctor" }))));

        let resolver = SessionResolver::spawn(Arc::new(store), &auth_with_stream(auth_rx));
        let mut states = resolver.subscribe();

        auth_tx.send(Some(auth_user("d1"))).expect("receiver alive");
        let state = wait_for_active(&mut states).await;
        assert_eq!(state.role(), Some(Role::Doctor));
        assert_eq!(state.user().map(|u| u.id.as_str()), Some("d1"));
    }

    #[rstest]
    #[tokio::test]
    async fn a_failed_role_lookup_defaults_to_patient() {
        let (auth_tx, auth_rx) = watch::channel(None);
        let mut store = MockDataStore::new();
        store
            .expect_read()
            .returning(|_| Err(DataStoreError::transport("offline")));

        let resolver = SessionResolver::spawn(Arc::new(store), &auth_with_stream(auth_rx));
        let mut states = resolver.subscribe();

        auth_tx.send(Some(auth_user("u1"))).expect("receiver alive");
        let state = wait_for_active(&mut states).await;
        assert_eq!(state.role(), Some(Role::Patient));
    }

    #[rstest]
    #[tokio::test]
    async fn sign_out_transitions_publish_signed_out() {
        let (auth_tx, auth_rx) = watch::channel(Some(auth_user("u1")));
        let mut store = MockDataStore::new();
        store.expect_read().returning(|_| Ok(None));

        let resolver = SessionResolver::spawn(Arc::new(store), &auth_with_stream(auth_rx));
        let mut states = resolver.subscribe();
        let _ = wait_for_active(&mut states).await;

        auth_tx.send(None).expect("receiver alive");
        let state = states
            .wait_for(|s| *s == SessionState::SignedOut)
            .await
            .expect("resolver publishes")
            .clone();
        assert_eq!(state, SessionState::SignedOut);
        assert_eq!(resolver.state(), SessionState::SignedOut);
    }
}
