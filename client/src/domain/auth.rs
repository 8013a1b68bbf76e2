//! Authentication form primitives.
//!
//! Keep inbound field parsing outside the services by exposing constructors
//! that validate string inputs before anything talks to the auth provider.
//! Passwords are held in [`Zeroizing`] buffers so they are wiped on drop.

use std::fmt;

use zeroize::Zeroizing;

use super::Role;

/// Domain error returned when authentication form values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValidationError {
    /// A required field was missing or blank.
    MissingField,
    /// Password and confirmation did not match.
    PasswordMismatch,
}

impl fmt::Display for FormValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField => write!(f, "all fields are required"),
            Self::PasswordMismatch => write!(f, "passwords do not match"),
        }
    }
}

impl std::error::Error for FormValidationError {}

impl From<FormValidationError> for super::Error {
    fn from(value: FormValidationError) -> Self {
        Self::validation(value.to_string())
    }
}

/// Validated sign-in credentials.
///
/// ## Invariants
/// - `email` is trimmed and must not be empty after trimming.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace to avoid surprising credential comparisons.
///
/// # Examples
/// ```
/// use client::domain::Credentials;
///
/// let creds = Credentials::try_from_parts("ada@example.com", "hunter2").unwrap();
/// assert_eq!(creds.email(), "ada@example.com");
/// ```
#[derive(Debug, Clone)]
pub struct Credentials {
    email: String,
    password: Zeroizing<String>,
}

impl Credentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, FormValidationError> {
        let normalized = email.trim();
        if normalized.is_empty() || password.is_empty() {
            return Err(FormValidationError::MissingField);
        }
        Ok(Self {
            email: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email string used for the sign-in call.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password string provided by the caller.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated registration form.
///
/// Mismatched passwords are rejected here, before any remote call: a failed
/// validation must leave no account and no profile record behind.
#[derive(Debug, Clone)]
pub struct RegistrationForm {
    name: String,
    email: String,
    password: Zeroizing<String>,
    role: Role,
}

impl RegistrationForm {
    /// Construct a registration form from raw field inputs.
    pub fn try_from_parts(
        name: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
        role: Role,
    ) -> Result<Self, FormValidationError> {
        let name_trimmed = name.trim();
        let email_trimmed = email.trim();
        if name_trimmed.is_empty()
            || email_trimmed.is_empty()
            || password.is_empty()
            || confirm_password.is_empty()
        {
            return Err(FormValidationError::MissingField);
        }
        if password != confirm_password {
            return Err(FormValidationError::PasswordMismatch);
        }
        Ok(Self {
            name: name_trimmed.to_owned(),
            email: email_trimmed.to_owned(),
            password: Zeroizing::new(password.to_owned()),
            role,
        })
    }

    /// Display name written into the profile record.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Email for the new account.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password for the new account.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Role selected at registration.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }
}

/// Validated password-change request.
#[derive(Debug, Clone)]
pub struct PasswordChange {
    current_password: Zeroizing<String>,
    new_password: Zeroizing<String>,
}

impl PasswordChange {
    /// Construct a password change from raw field inputs.
    pub fn try_from_parts(
        current_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<Self, FormValidationError> {
        if current_password.is_empty() || new_password.is_empty() || confirm_password.is_empty() {
            return Err(FormValidationError::MissingField);
        }
        if new_password != confirm_password {
            return Err(FormValidationError::PasswordMismatch);
        }
        Ok(Self {
            current_password: Zeroizing::new(current_password.to_owned()),
            new_password: Zeroizing::new(new_password.to_owned()),
        })
    }

    /// Password used to reauthenticate before the change.
    #[must_use]
    pub fn current_password(&self) -> &str {
        self.current_password.as_str()
    }

    /// Password to set once reauthentication succeeds.
    #[must_use]
    pub fn new_password(&self) -> &str {
        self.new_password.as_str()
    }
}
