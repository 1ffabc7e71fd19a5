// models/src/prescription.rs

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::{ModelError, ModelResult};

/// Lifecycle status of a prescription.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrescriptionStatus {
    #[default]
    #[serde(rename = "valide")]
    Valide,
    #[serde(rename = "en_attente")]
    EnAttente,
    #[serde(rename = "suppr")]
    Suppr,
}

impl PrescriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrescriptionStatus::Valide => "valide",
            PrescriptionStatus::EnAttente => "en_attente",
            PrescriptionStatus::Suppr => "suppr",
        }
    }
}

impl fmt::Display for PrescriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrescriptionStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "valide" => Ok(PrescriptionStatus::Valide),
            "en_attente" => Ok(PrescriptionStatus::EnAttente),
            "suppr" => Ok(PrescriptionStatus::Suppr),
            other => Err(ModelError::InvalidStatus(other.to_string())),
        }
    }
}

/// A prescription linking a patient to a medication over a date range.
/// `patient` and `medication` are record ids; the store cascade-deletes
/// prescriptions when either referenced record is removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prescription {
    pub id: u64,
    pub patient: u64,
    pub medication: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: PrescriptionStatus,
    pub comment: String,
}

/// Input for creating a prescription, before the store assigns an id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPrescription {
    pub patient: u64,
    pub medication: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub status: PrescriptionStatus,
    #[serde(default)]
    pub comment: String,
}

impl NewPrescription {
    /// Model-level date guard, usable outside the HTTP layer
    /// (the API runs its own copy producing a field-scoped 400).
    pub fn validate(&self) -> ModelResult<()> {
        validate_dates(self.start_date, self.end_date)
    }
}

impl Prescription {
    pub fn validate(&self) -> ModelResult<()> {
        validate_dates(self.start_date, self.end_date)
    }
}

/// End date must not precede start date.
pub fn validate_dates(start: NaiveDate, end: NaiveDate) -> ModelResult<()> {
    if end < start {
        return Err(ModelError::EndBeforeStart);
    }
    Ok(())
}
