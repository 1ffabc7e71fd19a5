// rest_api/src/handlers.rs

use axum::{
    Json,
    extract::{Path, RawQuery, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::Value;

use models::{FieldErrors, Medication, NewPrescription, Patient, Prescription};

use crate::filters::{MedicationFilter, PatientFilter, PrescriptionFilter};
use crate::payload::PrescriptionPayload;
use crate::{ApiError, AppState};

// Item paths parse their id by hand so that a non-numeric id is a plain
// 404, the same as an unknown numeric one.
fn parse_path_id(raw: &str) -> Result<u64, ApiError> {
    raw.parse::<u64>().map_err(|_| ApiError::NotFound)
}

// --- Patient endpoints (read-only) ---

pub async fn list_patients(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Json<Vec<Patient>>, ApiError> {
    let filter = PatientFilter::from_query(raw.as_deref())?;
    let mut patients = state.store.patients()?;
    patients.retain(|patient| filter.matches(patient));
    Ok(Json(patients))
}

pub async fn retrieve_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Patient>, ApiError> {
    let id = parse_path_id(&id)?;
    let patient = state.store.get_patient(id)?.ok_or(ApiError::NotFound)?;
    Ok(Json(patient))
}

// --- Medication endpoints (read-only) ---

pub async fn list_medications(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Json<Vec<Medication>>, ApiError> {
    let filter = MedicationFilter::from_query(raw.as_deref())?;
    let mut medications = state.store.medications()?;
    medications.retain(|medication| filter.matches(medication));
    Ok(Json(medications))
}

pub async fn retrieve_medication(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Medication>, ApiError> {
    let id = parse_path_id(&id)?;
    let medication = state.store.get_medication(id)?.ok_or(ApiError::NotFound)?;
    Ok(Json(medication))
}

// --- Prescription endpoints ---

pub async fn list_prescriptions(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Json<Vec<Prescription>>, ApiError> {
    let filter = PrescriptionFilter::from_query(raw.as_deref())?;
    let mut prescriptions = state.store.prescriptions()?;
    prescriptions.retain(|rx| filter.matches(rx));
    Ok(Json(prescriptions))
}

pub async fn retrieve_prescription(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Prescription>, ApiError> {
    let id = parse_path_id(&id)?;
    let prescription = state.store.get_prescription(id)?.ok_or(ApiError::NotFound)?;
    Ok(Json(prescription))
}

pub async fn delete_prescription(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_path_id(&id)?;
    state.store.delete_prescription(id)?;
    tracing::info!(id, "deleted prescription");
    Ok(StatusCode::NO_CONTENT)
}

/// Cross-field checks shared by create, replace and partial update.
/// Referenced records are looked up here even though the store checks
/// again at write time; this is the request-level enforcement point.
fn validate_write(
    state: &AppState,
    patient: u64,
    medication: u64,
    start_date: chrono::NaiveDate,
    end_date: chrono::NaiveDate,
) -> Result<(), ApiError> {
    let mut errors = FieldErrors::new();
    if state.store.get_patient(patient)?.is_none() {
        errors.push("patient", "Patient does not exist.");
    }
    if state.store.get_medication(medication)?.is_none() {
        errors.push("medication", "Medication does not exist.");
    }
    if end_date < start_date {
        errors.push("end_date", "End date cannot be before start date");
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

pub async fn create_prescription(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let new: NewPrescription = PrescriptionPayload::parse(&body)?.require_full()?;
    validate_write(&state, new.patient, new.medication, new.start_date, new.end_date)?;
    let created = state.store.create_prescription(new)?;
    tracing::info!(id = created.id, "created prescription");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn replace_prescription(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Prescription>, ApiError> {
    let id = parse_path_id(&id)?;
    state.store.get_prescription(id)?.ok_or(ApiError::NotFound)?;

    let new = PrescriptionPayload::parse(&body)?.require_full()?;
    validate_write(&state, new.patient, new.medication, new.start_date, new.end_date)?;
    let replaced = Prescription {
        id,
        patient: new.patient,
        medication: new.medication,
        start_date: new.start_date,
        end_date: new.end_date,
        status: new.status,
        comment: new.comment,
    };
    state.store.update_prescription(&replaced)?;
    tracing::info!(id, "replaced prescription");
    Ok(Json(replaced))
}

pub async fn patch_prescription(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Prescription>, ApiError> {
    let id = parse_path_id(&id)?;
    let existing = state.store.get_prescription(id)?.ok_or(ApiError::NotFound)?;

    // Merge first so the date rule always compares two concrete dates.
    let merged = PrescriptionPayload::parse(&body)?.merge_into(&existing);
    validate_write(
        &state,
        merged.patient,
        merged.medication,
        merged.start_date,
        merged.end_date,
    )?;
    state.store.update_prescription(&merged)?;
    tracing::info!(id, "updated prescription");
    Ok(Json(merged))
}
