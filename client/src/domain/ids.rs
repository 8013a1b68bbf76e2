//! Validated identifier newtypes for store-addressed records.
//!
//! The hosted store forbids a handful of characters in node keys. Rejecting
//! them at construction keeps every path built from an identifier addressable
//! without escaping.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Characters the hosted store refuses inside a node key.
const FORBIDDEN_KEY_CHARS: [char; 6] = ['.', '$', '#', '[', ']', '/'];

/// Validation errors shared by all identifier newtypes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdValidationError {
    /// Identifier is empty after trimming whitespace.
    #[error("identifier must not be empty")]
    Empty,
    /// Identifier contains leading or trailing whitespace.
    #[error("identifier must not contain surrounding whitespace")]
    ContainsWhitespace,
    /// Identifier contains a character the store rejects in keys.
    #[error("identifier must not contain '{0}'")]
    ForbiddenCharacter(char),
}

fn validate_key(raw: &str) -> Result<(), IdValidationError> {
    if raw.trim().is_empty() {
        return Err(IdValidationError::Empty);
    }
    if raw.trim() != raw {
        return Err(IdValidationError::ContainsWhitespace);
    }
    if let Some(forbidden) = raw.chars().find(|c| FORBIDDEN_KEY_CHARS.contains(c)) {
        return Err(IdValidationError::ForbiddenCharacter(forbidden));
    }
    Ok(())
}

macro_rules! store_key_newtype {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Construct the identifier after validating the raw key.
            pub fn new(value: impl Into<String>) -> Result<Self, IdValidationError> {
                let raw = value.into();
                validate_key(&raw)?;
                Ok(Self(raw))
            }

            /// Borrow the underlying key as a string slice.
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

store_key_newtype!(
    /// Store-assigned key of a question record.
    QuestionId
);

store_key_newtype!(
    /// Store-assigned key of a reply record.
    ReplyId
);

store_key_newtype!(
    /// Identifier of a user; equals the auth session identifier.
    UserId
);
