// storage/src/lib.rs
//
// Sled-backed record store for patients, medications and prescriptions.
// One tree per entity with JSON values and big-endian u64 keys; id
// counters live in a separate meta tree. Collections are small and
// unpaginated, so ordered listings sort in memory at read time.

use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use sled::{Batch, Db, IVec, Tree};

use models::{
    Medication, NewMedication, NewPatient, NewPrescription, Patient, Prescription,
};

pub mod errors;
pub mod seed;

pub use errors::{StoreError, StoreResult};

const PATIENTS_TREE: &str = "patients";
const MEDICATIONS_TREE: &str = "medications";
const PRESCRIPTIONS_TREE: &str = "prescriptions";
const META_TREE: &str = "meta";

pub struct RecordStore {
    db: Db,
    patients: Tree,
    medications: Tree,
    prescriptions: Tree,
    meta: Tree,
}

fn decode<T: DeserializeOwned>(value: &IVec) -> StoreResult<T> {
    Ok(serde_json::from_slice(value)?)
}

fn encode<T: Serialize>(value: &T) -> StoreResult<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

fn scan<T: DeserializeOwned>(tree: &Tree) -> StoreResult<Vec<T>> {
    let mut records = Vec::new();
    for item in tree.iter() {
        let (_key, value) = item?;
        records.push(decode(&value)?);
    }
    Ok(records)
}

impl RecordStore {
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let db = sled::open(path)?;
        let patients = db.open_tree(PATIENTS_TREE)?;
        let medications = db.open_tree(MEDICATIONS_TREE)?;
        let prescriptions = db.open_tree(PRESCRIPTIONS_TREE)?;
        let meta = db.open_tree(META_TREE)?;
        Ok(Self {
            db,
            patients,
            medications,
            prescriptions,
            meta,
        })
    }

    /// Atomically bump and return the next id for one entity tree.
    fn next_id(&self, counter: &str) -> StoreResult<u64> {
        let bumped = self.meta.update_and_fetch(counter, |old| {
            let current = old
                .and_then(|bytes| bytes.try_into().ok())
                .map(u64::from_be_bytes)
                .unwrap_or(0);
            Some(current.saturating_add(1).to_be_bytes().to_vec())
        })?;
        bumped
            .as_deref()
            .and_then(|bytes| <[u8; 8]>::try_from(bytes).ok())
            .map(u64::from_be_bytes)
            .ok_or_else(|| {
                StoreError::Sled(sled::Error::ReportableBug(
                    "id counter missing after update".into(),
                ))
            })
    }

    // --- Patient operations ---

    pub fn create_patient(&self, new: NewPatient) -> StoreResult<Patient> {
        let patient = Patient {
            id: self.next_id(PATIENTS_TREE)?,
            last_name: new.last_name,
            first_name: new.first_name,
            birth_date: new.birth_date,
        };
        self.patients
            .insert(patient.id.to_be_bytes(), encode(&patient)?)?;
        Ok(patient)
    }

    pub fn get_patient(&self, id: u64) -> StoreResult<Option<Patient>> {
        match self.patients.get(id.to_be_bytes())? {
            Some(value) => Ok(Some(decode(&value)?)),
            None => Ok(None),
        }
    }

    /// All patients, ordered by last name, first name, then id.
    pub fn patients(&self) -> StoreResult<Vec<Patient>> {
        let mut records: Vec<Patient> = scan(&self.patients)?;
        records.sort_by(|a, b| a.ordering_key().cmp(&b.ordering_key()));
        Ok(records)
    }

    /// Remove a patient and cascade-delete its prescriptions.
    pub fn delete_patient(&self, id: u64) -> StoreResult<()> {
        if self.patients.remove(id.to_be_bytes())?.is_none() {
            return Err(StoreError::NotFound { kind: "patient", id });
        }
        self.cascade_prescriptions(|p| p.patient == id)
    }

    // --- Medication operations ---

    pub fn create_medication(&self, new: NewMedication) -> StoreResult<Medication> {
        let medications: Vec<Medication> = scan(&self.medications)?;
        if medications.iter().any(|m| m.code == new.code) {
            return Err(StoreError::DuplicateCode(new.code));
        }
        let medication = Medication {
            id: self.next_id(MEDICATIONS_TREE)?,
            code: new.code,
            label: new.label,
            status: new.status,
        };
        self.medications
            .insert(medication.id.to_be_bytes(), encode(&medication)?)?;
        Ok(medication)
    }

    pub fn get_medication(&self, id: u64) -> StoreResult<Option<Medication>> {
        match self.medications.get(id.to_be_bytes())? {
            Some(value) => Ok(Some(decode(&value)?)),
            None => Ok(None),
        }
    }

    /// All medications, ordered by code.
    pub fn medications(&self) -> StoreResult<Vec<Medication>> {
        let mut records: Vec<Medication> = scan(&self.medications)?;
        records.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(records)
    }

    /// Remove a medication and cascade-delete its prescriptions.
    pub fn delete_medication(&self, id: u64) -> StoreResult<()> {
        if self.medications.remove(id.to_be_bytes())?.is_none() {
            return Err(StoreError::NotFound { kind: "medication", id });
        }
        self.cascade_prescriptions(|p| p.medication == id)
    }

    // --- Prescription operations ---

    /// Validate and persist a new prescription. Referenced records must
    /// exist and the date invariant must hold before anything is written.
    pub fn create_prescription(&self, new: NewPrescription) -> StoreResult<Prescription> {
        self.check_references(new.patient, new.medication)?;
        new.validate()?;
        let prescription = Prescription {
            id: self.next_id(PRESCRIPTIONS_TREE)?,
            patient: new.patient,
            medication: new.medication,
            start_date: new.start_date,
            end_date: new.end_date,
            status: new.status,
            comment: new.comment,
        };
        self.prescriptions
            .insert(prescription.id.to_be_bytes(), encode(&prescription)?)?;
        Ok(prescription)
    }

    pub fn get_prescription(&self, id: u64) -> StoreResult<Option<Prescription>> {
        match self.prescriptions.get(id.to_be_bytes())? {
            Some(value) => Ok(Some(decode(&value)?)),
            None => Ok(None),
        }
    }

    /// All prescriptions, ordered by patient id.
    pub fn prescriptions(&self) -> StoreResult<Vec<Prescription>> {
        let mut records: Vec<Prescription> = scan(&self.prescriptions)?;
        records.sort_by_key(|p| (p.patient, p.id));
        Ok(records)
    }

    /// Replace a stored prescription wholesale. The record keeps its id;
    /// the same guards as creation apply.
    pub fn update_prescription(&self, prescription: &Prescription) -> StoreResult<()> {
        let key = prescription.id.to_be_bytes();
        if self.prescriptions.get(key)?.is_none() {
            return Err(StoreError::NotFound {
                kind: "prescription",
                id: prescription.id,
            });
        }
        self.check_references(prescription.patient, prescription.medication)?;
        prescription.validate()?;
        self.prescriptions.insert(key, encode(prescription)?)?;
        Ok(())
    }

    pub fn delete_prescription(&self, id: u64) -> StoreResult<()> {
        if self.prescriptions.remove(id.to_be_bytes())?.is_none() {
            return Err(StoreError::NotFound {
                kind: "prescription",
                id,
            });
        }
        Ok(())
    }

    fn check_references(&self, patient: u64, medication: u64) -> StoreResult<()> {
        if self.get_patient(patient)?.is_none() {
            return Err(StoreError::MissingPatient(patient));
        }
        if self.get_medication(medication)?.is_none() {
            return Err(StoreError::MissingMedication(medication));
        }
        Ok(())
    }

    fn cascade_prescriptions(&self, doomed: impl Fn(&Prescription) -> bool) -> StoreResult<()> {
        let mut batch = Batch::default();
        let mut removed = 0usize;
        for item in self.prescriptions.iter() {
            let (key, value) = item?;
            let prescription: Prescription = decode(&value)?;
            if doomed(&prescription) {
                batch.remove(key);
                removed += 1;
            }
        }
        self.prescriptions.apply_batch(batch)?;
        if removed > 0 {
            tracing::info!(removed, "cascade-deleted prescriptions");
        }
        Ok(())
    }

    /// Force pending writes to disk.
    pub fn flush(&self) -> StoreResult<()> {
        self.db.flush()?;
        Ok(())
    }

    /// Drop every record. Id counters are kept so later inserts never
    /// reuse an id. Called only from the explicit seeding wipe path.
    pub fn clear_records(&self) -> StoreResult<()> {
        self.patients.clear()?;
        self.medications.clear()?;
        self.prescriptions.clear()?;
        Ok(())
    }
}
