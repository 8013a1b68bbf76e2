//! Wire DTOs for the hosted backend's REST dialect.

use serde::{Deserialize, Serialize};

/// Response of a `POST` push: the server-generated child key.
#[derive(Debug, Deserialize)]
pub(super) struct PushResponseDto {
    /// Generated key of the appended child node.
    pub name: String,
}

/// Request body shared by the sign-up and sign-in endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CredentialsRequestDto<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub return_secure_token: bool,
}

/// Request body of the password-update endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PasswordUpdateRequestDto<'a> {
    pub id_token: &'a str,
    pub password: &'a str,
    pub return_secure_token: bool,
}

/// Successful response of the account endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AuthSessionDto {
    /// Stable user identifier; doubles as the profile record key.
    pub local_id: String,
    /// Email the session was established with.
    #[serde(default)]
    pub email: String,
    /// Short-lived token authorising account mutations.
    pub id_token: String,
}

/// Error envelope returned by the auth endpoints.
#[derive(Debug, Deserialize)]
pub(super) struct AuthErrorDto {
    pub error: AuthErrorBodyDto,
}

/// Inner error body carrying the provider's reason code.
#[derive(Debug, Deserialize)]
pub(super) struct AuthErrorBodyDto {
    #[serde(default)]
    pub message: String,
}

/// Extract the provider's reason code from an error body, falling back to
/// the raw text when it is not the JSON envelope.
pub(super) fn auth_error_message(body: &str) -> String {
    serde_json::from_str::<AuthErrorDto>(body)
        .map(|dto| dto.error.message)
        .ok()
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| body.trim().to_owned())
}
