// models/src/medication.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Lifecycle status of a medication in the formulary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MedicationStatus {
    #[default]
    #[serde(rename = "actif")]
    Actif,
    #[serde(rename = "suppr")]
    Suppr,
}

impl MedicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MedicationStatus::Actif => "actif",
            MedicationStatus::Suppr => "suppr",
        }
    }
}

impl fmt::Display for MedicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MedicationStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "actif" => Ok(MedicationStatus::Actif),
            "suppr" => Ok(MedicationStatus::Suppr),
            other => Err(ModelError::InvalidStatus(other.to_string())),
        }
    }
}

/// A medication record. Read-only over the API; `code` is unique
/// across the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medication {
    pub id: u64,
    pub code: String,
    pub label: String,
    pub status: MedicationStatus,
}

/// Input for creating a medication, before the store assigns an id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMedication {
    pub code: String,
    pub label: String,
    #[serde(default)]
    pub status: MedicationStatus,
}
