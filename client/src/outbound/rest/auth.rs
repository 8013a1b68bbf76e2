//! Reqwest-backed auth provider adapter.
//!
//! Drives the hosted identity service's `accounts:signUp`,
//! `accounts:signInWithPassword`, and `accounts:update` endpoints, and owns
//! the local session: the signed-in user plus the short-lived token that
//! authorises account mutations. Session transitions are mirrored onto a
//! watch channel for the session resolver.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tokio::sync::watch;
use url::Url;

use super::dto::{
    AuthSessionDto, CredentialsRequestDto, PasswordUpdateRequestDto, auth_error_message,
};
use crate::domain::ports::{AuthProvider, AuthProviderError};
use crate::domain::{AuthUser, UserId};

/// Session material retained between calls.
struct ActiveSession {
    user: AuthUser,
    id_token: String,
}

/// Auth provider adapter performing HTTP requests against one base URL.
pub struct RestAuthProvider {
    client: Client,
    base: Url,
    api_key: String,
    session: Mutex<Option<ActiveSession>>,
    tx: watch::Sender<Option<AuthUser>>,
}

impl RestAuthProvider {
    /// Build an adapter using a reqwest client with an explicit request
    /// timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        base: Url,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        let (tx, _rx) = watch::channel(None);
        Ok(Self {
            client,
            base,
            api_key: api_key.into(),
            session: Mutex::new(None),
            tx,
        })
    }

    fn endpoint(&self, operation: &str) -> Result<Url, AuthProviderError> {
        endpoint(&self.base, &self.api_key, operation)
    }

    fn install_session(&self, dto: AuthSessionDto) -> Result<AuthUser, AuthProviderError> {
        let user = AuthUser {
            id: UserId::new(dto.local_id)
                .map_err(|err| AuthProviderError::transport(format!("unusable user id: {err}")))?,
            email: dto.email,
        };
        let mut guard = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(ActiveSession {
            user: user.clone(),
            id_token: dto.id_token,
        });
        drop(guard);
        let _ = self.tx.send(Some(user.clone()));
        Ok(user)
    }

    async fn credentials_call(
        &self,
        operation: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthSessionDto, AuthProviderError> {
        let url = self.endpoint(operation)?;
        let request = CredentialsRequestDto {
            email,
            password,
            return_secure_token: true,
        };
        let response = self
            .client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        serde_json::from_slice(body.as_ref())
            .map_err(|err| AuthProviderError::transport(format!("unexpected auth payload: {err}")))
    }
}

#[async_trait]
impl AuthProvider for RestAuthProvider {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, AuthProviderError> {
        let dto = self.credentials_call("signUp", email, password).await?;
        self.install_session(dto)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthProviderError> {
        let dto = self
            .credentials_call("signInWithPassword", email, password)
            .await?;
        self.install_session(dto)
    }

    async fn sign_out(&self) -> Result<(), AuthProviderError> {
        let mut guard = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = None;
        drop(guard);
        let _ = self.tx.send(None);
        Ok(())
    }

    async fn reauthenticate(
        &self,
        email: &str,
        current_password: &str,
    ) -> Result<(), AuthProviderError> {
        let dto = self
            .credentials_call("signInWithPassword", email, current_password)
            .await?;
        // Keep the fresher token for the follow-up password update.
        let mut guard = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(session) = guard.as_mut() {
            if session.user.id.as_str() == dto.local_id {
                session.id_token = dto.id_token;
            }
        }
        Ok(())
    }

    async fn update_password(&self, new_password: &str) -> Result<(), AuthProviderError> {
        let id_token = {
            let guard = self.session.lock().unwrap_or_else(PoisonError::into_inner);
            guard
                .as_ref()
                .map(|session| session.id_token.clone())
                .ok_or(AuthProviderError::NoSession)?
        };
        let url = self.endpoint("update")?;
        let request = PasswordUpdateRequestDto {
            id_token: &id_token,
            password: new_password,
            return_secure_token: true,
        };
        let response = self
            .client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        Ok(())
    }

    fn current_user(&self) -> Option<AuthUser> {
        let guard = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        guard.as_ref().map(|session| session.user.clone())
    }

    fn subscribe(&self) -> watch::Receiver<Option<AuthUser>> {
        self.tx.subscribe()
    }
}

fn endpoint(base: &Url, api_key: &str, operation: &str) -> Result<Url, AuthProviderError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| AuthProviderError::transport("auth base URL cannot hold paths"))?
        .pop_if_empty()
        .push(&format!("accounts:{operation}"));
    url.query_pairs_mut().append_pair("key", api_key);
    Ok(url)
}

fn map_transport_error(err: reqwest::Error) -> AuthProviderError {
    AuthProviderError::transport(err.to_string())
}

/// The identity endpoints answer 400 with a reason code for every credential
/// and policy rejection; anything else is a transport-level failure.
fn map_status_error(status: StatusCode, body: &[u8]) -> AuthProviderError {
    let message = auth_error_message(&String::from_utf8_lossy(body));
    match status {
        StatusCode::BAD_REQUEST => map_rejection(&message),
        _ => AuthProviderError::transport(format!("status {status}: {message}")),
    }
}

fn map_rejection(message: &str) -> AuthProviderError {
    const CREDENTIAL_CODES: [&str; 4] = [
        "EMAIL_NOT_FOUND",
        "INVALID_PASSWORD",
        "INVALID_LOGIN_CREDENTIALS",
        "USER_DISABLED",
    ];
    if CREDENTIAL_CODES
        .iter()
        .any(|code| message.starts_with(code))
    {
        AuthProviderError::invalid_credentials(message)
    } else {
        AuthProviderError::rejected(message)
    }
}
