// rest_api/src/payload.rs
//
// Prescription write payloads. Bodies are decoded field by field from
// the incoming JSON object so every malformed or missing field lands in
// the 400 error map under its own name, instead of one opaque decode
// failure for the whole body.

use chrono::NaiveDate;
use serde_json::{Map, Value};

use models::{FieldErrors, NewPrescription, Prescription, PrescriptionStatus};

use crate::ApiError;

const REQUIRED_MESSAGE: &str = "This field is required.";
const INTEGER_MESSAGE: &str = "A valid integer is required.";
const DATE_MESSAGE: &str = "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.";
const STRING_MESSAGE: &str = "Not a valid string.";
const NULL_MESSAGE: &str = "This field may not be null.";

/// One prescription write body with every field optional. Create and
/// replace require the reference and date fields afterwards; partial
/// update merges present fields onto the stored record.
#[derive(Debug, Default)]
pub struct PrescriptionPayload {
    pub patient: Option<u64>,
    pub medication: Option<u64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<PrescriptionStatus>,
    pub comment: Option<String>,
}

fn take_u64(obj: &Map<String, Value>, field: &str, errors: &mut FieldErrors) -> Option<u64> {
    match obj.get(field) {
        None | Some(Value::Null) => None,
        Some(value) => match value.as_u64() {
            Some(id) => Some(id),
            None => {
                errors.push(field, INTEGER_MESSAGE);
                None
            }
        },
    }
}

fn take_date(obj: &Map<String, Value>, field: &str, errors: &mut FieldErrors) -> Option<NaiveDate> {
    match obj.get(field) {
        None | Some(Value::Null) => None,
        Some(value) => match value
            .as_str()
            .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
        {
            Some(date) => Some(date),
            None => {
                errors.push(field, DATE_MESSAGE);
                None
            }
        },
    }
}

fn take_status(
    obj: &Map<String, Value>,
    field: &str,
    errors: &mut FieldErrors,
) -> Option<PrescriptionStatus> {
    match obj.get(field) {
        None | Some(Value::Null) => None,
        Some(value) => {
            let parsed = value.as_str().and_then(|raw| raw.parse().ok());
            if parsed.is_none() {
                errors.push(field, format!("{value} is not a valid choice."));
            }
            parsed
        }
    }
}

// Unlike the other fields, comment defaults when absent but an
// explicit null is rejected, so null and absence must stay distinct.
fn take_string(obj: &Map<String, Value>, field: &str, errors: &mut FieldErrors) -> Option<String> {
    match obj.get(field) {
        None => None,
        Some(Value::Null) => {
            errors.push(field, NULL_MESSAGE);
            None
        }
        Some(value) => match value.as_str() {
            Some(raw) => Some(raw.to_string()),
            None => {
                errors.push(field, STRING_MESSAGE);
                None
            }
        },
    }
}

impl PrescriptionPayload {
    pub fn parse(body: &Value) -> Result<Self, ApiError> {
        let obj = body
            .as_object()
            .ok_or_else(|| ApiError::BadRequest("expected a JSON object".to_string()))?;

        let mut errors = FieldErrors::new();
        let payload = PrescriptionPayload {
            patient: take_u64(obj, "patient", &mut errors),
            medication: take_u64(obj, "medication", &mut errors),
            start_date: take_date(obj, "start_date", &mut errors),
            end_date: take_date(obj, "end_date", &mut errors),
            status: take_status(obj, "status", &mut errors),
            comment: take_string(obj, "comment", &mut errors),
        };
        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }
        Ok(payload)
    }

    /// Promote to a full write: references and both dates must be
    /// present. Status defaults to `valide` and comment to "".
    pub fn require_full(self) -> Result<NewPrescription, ApiError> {
        let mut errors = FieldErrors::new();
        for (field, present) in [
            ("patient", self.patient.is_some()),
            ("medication", self.medication.is_some()),
            ("start_date", self.start_date.is_some()),
            ("end_date", self.end_date.is_some()),
        ] {
            if !present {
                errors.push(field, REQUIRED_MESSAGE);
            }
        }
        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }

        match (self.patient, self.medication, self.start_date, self.end_date) {
            (Some(patient), Some(medication), Some(start_date), Some(end_date)) => {
                Ok(NewPrescription {
                    patient,
                    medication,
                    start_date,
                    end_date,
                    status: self.status.unwrap_or_default(),
                    comment: self.comment.unwrap_or_default(),
                })
            }
            _ => Err(ApiError::BadRequest("incomplete prescription body".to_string())),
        }
    }

    /// Merge present fields onto a stored record; absent fields keep
    /// their stored values, so validation always sees concrete dates.
    pub fn merge_into(&self, existing: &Prescription) -> Prescription {
        Prescription {
            id: existing.id,
            patient: self.patient.unwrap_or(existing.patient),
            medication: self.medication.unwrap_or(existing.medication),
            start_date: self.start_date.unwrap_or(existing.start_date),
            end_date: self.end_date.unwrap_or(existing.end_date),
            status: self.status.unwrap_or(existing.status),
            comment: self
                .comment
                .clone()
                .unwrap_or_else(|| existing.comment.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn full_body_parses_with_defaults() {
        let body = json!({
            "patient": 1,
            "medication": 2,
            "start_date": "2026-02-01",
            "end_date": "2026-02-10"
        });
        let new = PrescriptionPayload::parse(&body)
            .unwrap()
            .require_full()
            .unwrap();
        assert_eq!(new.status, PrescriptionStatus::Valide);
        assert_eq!(new.comment, "");
    }

    #[test]
    fn missing_required_fields_are_each_named() {
        let err = PrescriptionPayload::parse(&json!({"comment": "x"}))
            .unwrap()
            .require_full()
            .unwrap_err();
        match err {
            ApiError::Validation(errors) => {
                for field in ["patient", "medication", "start_date", "end_date"] {
                    assert!(errors.contains(field), "missing error for {field}");
                }
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn malformed_date_is_scoped_to_its_field() {
        let err = PrescriptionPayload::parse(&json!({
            "patient": 1,
            "medication": 2,
            "start_date": "02/01/2026",
            "end_date": "2026-02-10"
        }))
        .unwrap_err();
        match err {
            ApiError::Validation(errors) => {
                assert!(errors.contains("start_date"));
                assert!(!errors.contains("end_date"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        let err = PrescriptionPayload::parse(&json!({"status": "cancelled"})).unwrap_err();
        match err {
            ApiError::Validation(errors) => assert!(errors.contains("status")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn explicit_null_comment_is_rejected() {
        let err = PrescriptionPayload::parse(&json!({"comment": null})).unwrap_err();
        match err {
            ApiError::Validation(errors) => assert!(errors.contains("comment")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_object_body_is_a_bad_request() {
        assert!(matches!(
            PrescriptionPayload::parse(&json!([1, 2])),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn merge_keeps_stored_values_for_absent_fields() {
        let existing = Prescription {
            id: 7,
            patient: 1,
            medication: 2,
            start_date: date(2026, 1, 15),
            end_date: date(2026, 1, 20),
            status: PrescriptionStatus::EnAttente,
            comment: "as needed".into(),
        };
        let patch = PrescriptionPayload::parse(&json!({"status": "valide"})).unwrap();
        let merged = patch.merge_into(&existing);
        assert_eq!(merged.status, PrescriptionStatus::Valide);
        assert_eq!(merged.start_date, existing.start_date);
        assert_eq!(merged.comment, "as needed");
        assert_eq!(merged.id, 7);
    }
}
