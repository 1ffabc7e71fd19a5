// models/src/patient.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A patient record. The API surface for patients is read-only;
/// records are created through the store (seeding or fixtures).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: u64,
    pub last_name: String,
    pub first_name: String,
    pub birth_date: Option<NaiveDate>,
}

/// Input for creating a patient, before the store assigns an id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPatient {
    pub last_name: String,
    pub first_name: String,
    pub birth_date: Option<NaiveDate>,
}

impl Patient {
    /// Default collection ordering key: last name, first name, then id.
    pub fn ordering_key(&self) -> (&str, &str, u64) {
        (&self.last_name, &self.first_name, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_birth_date_as_iso_date() {
        let p = Patient {
            id: 1,
            last_name: "Martin".into(),
            first_name: "Jeanne".into(),
            birth_date: NaiveDate::from_ymd_opt(1992, 3, 10),
        };
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["birth_date"], "1992-03-10");
    }

    #[test]
    fn ordering_key_sorts_by_name_then_id() {
        let a = Patient {
            id: 2,
            last_name: "Martin".into(),
            first_name: "Jeanne".into(),
            birth_date: None,
        };
        let b = Patient {
            id: 1,
            last_name: "Martin".into(),
            first_name: "Jeanne".into(),
            birth_date: None,
        };
        assert!(b.ordering_key() < a.ordering_key());
    }
}
