//! Bundled reference directory of doctors for the DocQ client.
//!
//! The directory is static reference data: a JSON dataset shipped with the
//! app, loaded once, never written. It also carries the fixed speciality
//! list the question form offers as categories. The crate is independent of
//! the client's domain types so the presentation shell can embed it on its
//! own.
//!
//! # Example
//!
//! ```
//! use doctor_directory::DoctorDirectory;
//!
//! let directory = DoctorDirectory::bundled();
//! assert!(!directory.is_empty());
//! assert!(directory.doctors().iter().all(|d| !d.name.is_empty()));
//! ```

use std::collections::HashSet;
use std::sync::OnceLock;

use serde::Deserialize;
use thiserror::Error;

/// The specialities offered as question categories, in picker order.
pub const SPECIALITIES: [&str; 5] = [
    "Cardiologist",
    "Pediatrician",
    "Neurologist",
    "Dermatologist",
    "Orthopedic Surgeon",
];

const BUNDLED_DATASET: &str = include_str!("../data/doctors.json");

/// One entry of the bundled dataset.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Doctor {
    /// Stable identifier within the dataset.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Medical speciality.
    pub specialization: String,
    /// Free-text experience description, e.g. `"14 years"`.
    pub experience: String,
}

/// Errors raised while parsing a directory dataset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// The dataset is not the expected JSON shape.
    #[error("directory dataset could not be parsed: {message}")]
    Parse {
        /// Underlying parse failure.
        message: String,
    },
    /// Two entries share an identifier.
    #[error("directory dataset contains duplicate id {id}")]
    DuplicateId {
        /// The offending identifier.
        id: String,
    },
    /// An entry has a blank display name.
    #[error("directory entry {id} has a blank name")]
    BlankName {
        /// Identifier of the offending entry.
        id: String,
    },
}

#[derive(Debug, Deserialize)]
struct DoctorListDto {
    doctors: Vec<Doctor>,
}

/// Parsed, validated directory of doctors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorDirectory {
    doctors: Vec<Doctor>,
}

impl DoctorDirectory {
    /// Parse a directory from its JSON dataset.
    ///
    /// # Errors
    ///
    /// Fails on malformed JSON, duplicate ids, or blank names.
    pub fn from_json(json: &str) -> Result<Self, DirectoryError> {
        let dto: DoctorListDto = serde_json::from_str(json).map_err(|err| {
            DirectoryError::Parse {
                message: err.to_string(),
            }
        })?;
        let mut seen = HashSet::new();
        for doctor in &dto.doctors {
            if !seen.insert(doctor.id.clone()) {
                return Err(DirectoryError::DuplicateId {
                    id: doctor.id.clone(),
                });
            }
            if doctor.name.trim().is_empty() {
                return Err(DirectoryError::BlankName {
                    id: doctor.id.clone(),
                });
            }
        }
        Ok(Self {
            doctors: dto.doctors,
        })
    }

    /// The dataset shipped with the app, parsed once on first access.
    ///
    /// # Panics
    ///
    /// Panics when the bundled dataset fails validation; that is a build
    /// defect, not a runtime condition.
    #[must_use]
    pub fn bundled() -> &'static Self {
        static BUNDLED: OnceLock<DoctorDirectory> = OnceLock::new();
        BUNDLED.get_or_init(|| {
            Self::from_json(BUNDLED_DATASET)
                .unwrap_or_else(|err| panic!("bundled dataset must validate: {err}"))
        })
    }

    /// Every doctor, in dataset order.
    #[must_use]
    pub fn doctors(&self) -> &[Doctor] {
        self.doctors.as_slice()
    }

    /// Doctors practising the given speciality, in dataset order.
    #[must_use]
    pub fn by_specialization(&self, specialization: &str) -> Vec<&Doctor> {
        self.doctors
            .iter()
            .filter(|doctor| doctor.specialization == specialization)
            .collect()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.doctors.len()
    }

    /// Whether the directory holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.doctors.is_empty()
    }
}
