// rest_api/src/filters.rs
//
// Query-string to predicate translation. Each resource has a filter
// struct parsed from the raw query string (raw because the `id`
// parameter may repeat) and evaluated record by record over the
// store's ordered listing. Recognized parameters combine by AND;
// unknown and absent parameters are ignored.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use url::form_urlencoded;

use models::{Medication, Patient, Prescription};

use crate::ApiError;

const DATE_MESSAGE: &str = "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.";
const NUMBER_MESSAGE: &str = "A valid number is required.";

fn parse_pairs(raw: Option<&str>) -> Vec<(String, String)> {
    raw.map(|query| {
        form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect()
    })
    .unwrap_or_default()
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ApiError::field(field, DATE_MESSAGE))
}

// Reference filters accept any integer; a negative or otherwise
// unmatched value filters to an empty list rather than erroring.
fn parse_id(field: &str, value: &str) -> Result<i64, ApiError> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| ApiError::field(field, NUMBER_MESSAGE))
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Filters for `GET /Patient`.
#[derive(Debug, Default, PartialEq)]
pub struct PatientFilter {
    nom: Option<String>,
    prenom: Option<String>,
    date_naissance: Option<NaiveDate>,
    /// `None` means the id filter is a no-op, never an empty match set.
    ids: Option<BTreeSet<u64>>,
}

impl PatientFilter {
    pub fn from_query(raw: Option<&str>) -> Result<Self, ApiError> {
        let mut filter = PatientFilter::default();
        let mut id_values: Vec<String> = Vec::new();
        for (key, value) in parse_pairs(raw) {
            match key.as_str() {
                "nom" => filter.nom = Some(value),
                "prenom" => filter.prenom = Some(value),
                "date_naissance" => {
                    filter.date_naissance = Some(parse_date("date_naissance", &value)?)
                }
                "id" => id_values.push(value),
                _ => {}
            }
        }
        filter.ids = collect_ids(&id_values);
        Ok(filter)
    }

    pub fn matches(&self, patient: &Patient) -> bool {
        if let Some(nom) = &self.nom {
            if !contains_ci(&patient.last_name, nom) {
                return false;
            }
        }
        if let Some(prenom) = &self.prenom {
            if !contains_ci(&patient.first_name, prenom) {
                return false;
            }
        }
        if let Some(date) = self.date_naissance {
            if patient.birth_date != Some(date) {
                return false;
            }
        }
        if let Some(ids) = &self.ids {
            if !ids.contains(&patient.id) {
                return false;
            }
        }
        true
    }
}

/// Gather candidate ids from every `id` occurrence, splitting each on
/// commas. Tokens are trimmed and kept only when made of digits alone
/// (a sign prefix disqualifies the token); everything else is dropped
/// silently. An empty result disables the filter rather than matching
/// nothing.
fn collect_ids(values: &[String]) -> Option<BTreeSet<u64>> {
    let ids: BTreeSet<u64> = values
        .iter()
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|token| !token.is_empty() && token.chars().all(|c| c.is_ascii_digit()))
        .filter_map(|token| token.parse::<u64>().ok())
        .collect();
    if ids.is_empty() { None } else { Some(ids) }
}

/// Filters for `GET /Medication`. `status` compares the raw token
/// exactly, so an unknown status matches nothing instead of erroring.
#[derive(Debug, Default, PartialEq)]
pub struct MedicationFilter {
    code: Option<String>,
    label: Option<String>,
    status: Option<String>,
}

impl MedicationFilter {
    pub fn from_query(raw: Option<&str>) -> Result<Self, ApiError> {
        let mut filter = MedicationFilter::default();
        for (key, value) in parse_pairs(raw) {
            match key.as_str() {
                "code" => filter.code = Some(value),
                "label" => filter.label = Some(value),
                "status" => filter.status = Some(value),
                _ => {}
            }
        }
        Ok(filter)
    }

    pub fn matches(&self, medication: &Medication) -> bool {
        if let Some(code) = &self.code {
            if !contains_ci(&medication.code, code) {
                return false;
            }
        }
        if let Some(label) = &self.label {
            if !contains_ci(&medication.label, label) {
                return false;
            }
        }
        if let Some(status) = &self.status {
            if medication.status.as_str() != status {
                return false;
            }
        }
        true
    }
}

/// Filters for `GET /Prescription`, including the date range bounds.
#[derive(Debug, Default, PartialEq)]
pub struct PrescriptionFilter {
    status: Option<String>,
    patient: Option<i64>,
    medication: Option<i64>,
    start_date: Option<NaiveDate>,
    start_date_gte: Option<NaiveDate>,
    start_date_lte: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    end_date_gte: Option<NaiveDate>,
    end_date_lte: Option<NaiveDate>,
}

impl PrescriptionFilter {
    pub fn from_query(raw: Option<&str>) -> Result<Self, ApiError> {
        let mut filter = PrescriptionFilter::default();
        for (key, value) in parse_pairs(raw) {
            match key.as_str() {
                "status" => filter.status = Some(value),
                "patient" => filter.patient = Some(parse_id("patient", &value)?),
                "medication" => filter.medication = Some(parse_id("medication", &value)?),
                "start_date" => filter.start_date = Some(parse_date("start_date", &value)?),
                "start_date__gte" => {
                    filter.start_date_gte = Some(parse_date("start_date__gte", &value)?)
                }
                "start_date__lte" => {
                    filter.start_date_lte = Some(parse_date("start_date__lte", &value)?)
                }
                "end_date" => filter.end_date = Some(parse_date("end_date", &value)?),
                "end_date__gte" => {
                    filter.end_date_gte = Some(parse_date("end_date__gte", &value)?)
                }
                "end_date__lte" => {
                    filter.end_date_lte = Some(parse_date("end_date__lte", &value)?)
                }
                _ => {}
            }
        }
        Ok(filter)
    }

    pub fn matches(&self, rx: &Prescription) -> bool {
        if let Some(status) = &self.status {
            if rx.status.as_str() != status {
                return false;
            }
        }
        if let Some(patient) = self.patient {
            if i64::try_from(rx.patient).map_or(true, |id| id != patient) {
                return false;
            }
        }
        if let Some(medication) = self.medication {
            if i64::try_from(rx.medication).map_or(true, |id| id != medication) {
                return false;
            }
        }
        if let Some(date) = self.start_date {
            if rx.start_date != date {
                return false;
            }
        }
        if let Some(bound) = self.start_date_gte {
            if rx.start_date < bound {
                return false;
            }
        }
        if let Some(bound) = self.start_date_lte {
            if rx.start_date > bound {
                return false;
            }
        }
        if let Some(date) = self.end_date {
            if rx.end_date != date {
                return false;
            }
        }
        if let Some(bound) = self.end_date_gte {
            if rx.end_date < bound {
                return false;
            }
        }
        if let Some(bound) = self.end_date_lte {
            if rx.end_date > bound {
                return false;
            }
        }
        true
    }
}
