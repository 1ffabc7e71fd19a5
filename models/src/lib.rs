// models/src/lib.rs

pub mod errors;
pub mod medication;
pub mod patient;
pub mod prescription;

pub use errors::{FieldErrors, ModelError, ModelResult};
pub use medication::{Medication, MedicationStatus, NewMedication};
pub use patient::{NewPatient, Patient};
pub use prescription::{NewPrescription, Prescription, PrescriptionStatus};
