//! Session identity and role primitives.
//!
//! Services receive an explicit session context instead of reading ambient
//! global state; the shell obtains it from the auth provider or the
//! [`SessionResolver`](crate::domain::SessionResolver).

use serde::{Deserialize, Serialize};

use super::UserId;

/// Tag stored in the profile record for doctor accounts.
const DOCTOR_TAG: &str = "Doctor";
/// Tag stored in the profile record for patient accounts.
const PATIENT_TAG: &str = "Patient";

/// Coarse actor classification governing the top-level view composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Role {
    /// Patient-equivalent actor; the default when the role cannot be
    /// resolved.
    #[default]
    Patient,
    /// Doctor-equivalent actor.
    Doctor,
}

impl Role {
    /// Parse the profile record's `userType` tag.
    ///
    /// Anything other than the exact doctor tag resolves to [`Role::Patient`],
    /// matching the store's loose typing: an absent or unknown tag is never an
    /// error.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        if tag == DOCTOR_TAG {
            Self::Doctor
        } else {
            Self::Patient
        }
    }

    /// Tag written into the profile record.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Doctor => DOCTOR_TAG,
            Self::Patient => PATIENT_TAG,
        }
    }
}

/// Identity of a signed-in user as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    /// Session identifier; doubles as the profile record key.
    pub id: UserId,
    /// Email address the session was established with.
    pub email: String,
}

/// Resolved session state published by the session resolver.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No session is active.
    #[default]
    SignedOut,
    /// A session is active and its role has been resolved.
    Active {
        /// The signed-in user.
        user: AuthUser,
        /// The resolved role; defaults to patient when the profile lookup
        /// fails.
        role: Role,
    },
}

impl SessionState {
    /// The signed-in user, when a session is active.
    #[must_use]
    pub const fn user(&self) -> Option<&AuthUser> {
        match self {
            Self::SignedOut => None,
            Self::Active { user, .. } => Some(user),
        }
    }

    /// The resolved role, when a session is active.
    #[must_use]
    pub const fn role(&self) -> Option<Role> {
        match self {
            Self::SignedOut => None,
            Self::Active { role, .. } => Some(*role),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Doctor", Role::Doctor)]
    #[case("Patient", Role::Patient)]
    #[case("doctor", Role::Patient)]
    #[case("", Role::Patient)]
    #[case("Admin", Role::Patient)]
    fn unknown_tags_fall_back_to_patient(#[case] tag: &str, #[case] expected: Role) {
        assert_eq!(Role::from_tag(tag), expected);
    }

    #[rstest]
    fn tags_round_trip() {
        assert_eq!(Role::from_tag(Role::Doctor.tag()), Role::Doctor);
        assert_eq!(Role::from_tag(Role::Patient.tag()), Role::Patient);
    }

    #[rstest]
    fn signed_out_state_exposes_nothing() {
        let state = SessionState::SignedOut;
        assert!(state.user().is_none());
        assert!(state.role().is_none());
    }

    #[rstest]
    fn active_state_exposes_user_and_role() {
        let user = AuthUser {
            id: UserId::new("u1").expect("valid id"),
            email: "u1@example.com".to_owned(),
        };
        let state = SessionState::Active {
            user: user.clone(),
            role: Role::Doctor,
        };
        assert_eq!(state.user(), Some(&user));
        assert_eq!(state.role(), Some(Role::Doctor));
    }
}
