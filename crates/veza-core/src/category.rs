//! # Record Categories
//!
//! The closed set of personal-record categories an owner can scope a grant
//! to. A single enum definition with exhaustive `match` everywhere — adding
//! a category forces every consumer to handle it.

use serde::{Deserialize, Serialize};

/// A category of personal records covered by an access grant.
///
/// Serialized in kebab-case (`"lab-results"`) on the wire and in digest
/// computation. The `Ord` derivation gives category sets a stable sorted
/// order, which the consent digest depends on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum RecordCategory {
    /// Laboratory test results.
    LabResults,
    /// Medication and prescription history.
    Prescriptions,
    /// Radiology and imaging studies.
    Imaging,
    /// Clinical visit and consultation notes.
    VisitNotes,
    /// Immunization records.
    Immunizations,
    /// Insurance and billing records.
    Billing,
}

impl RecordCategory {
    /// The canonical wire label for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LabResults => "lab-results",
            Self::Prescriptions => "prescriptions",
            Self::Imaging => "imaging",
            Self::VisitNotes => "visit-notes",
            Self::Immunizations => "immunizations",
            Self::Billing => "billing",
        }
    }
}

impl std::fmt::Display for RecordCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
