// storage/src/seed.rs
//
// Demo data generator. Record removal happens only here and only when
// `wipe` is set explicitly; seeding on top of existing data is additive.

use std::collections::HashSet;

use chrono::{Duration, NaiveDate};
use models::{MedicationStatus, NewMedication, NewPatient, NewPrescription, PrescriptionStatus};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::{RecordStore, StoreError, StoreResult};

const LAST_NAMES: &[&str] = &[
    "Martin", "Bernard", "Thomas", "Petit", "Robert",
    "Richard", "Durand", "Dubois", "Moreau", "Laurent",
    "Michel", "Garcia", "David", "Bertrand", "Roux",
    "Vincent", "Fournier", "Morel", "Lefebvre", "Mercier",
    "Dupont", "Lambert", "Bonnet", "Francois", "Martinez",
    "Legrand", "Garnier", "Faure", "Andre", "Rousseau",
    "Simon", "Leroy", "Girard", "Colin", "Lefevre",
    "Boyer", "Chevalier", "Robin", "Masson", "Picard",
    "Blanc", "Gautier", "Nicolas", "Henry", "Perrin",
    "Morin", "Mathieu", "Clement", "Gauthier", "Dumont",
    "Lopez", "Fontaine", "Schmitt", "Rodriguez", "Dufour",
    "Blanchard", "Meunier", "Brunet", "Roy",
];

const FIRST_NAMES: &[&str] = &[
    "Jean", "Jeanne", "Marie", "Luc", "Lucie",
    "Paul", "Camille", "Pierre", "Sophie", "Emma",
    "Louis", "Louise", "Alice", "Gabriel", "Jules",
    "Lucas", "Hugo", "Arthur", "Adam", "Raphael",
    "Leo", "Nathan", "Tom", "Zoe", "Chloe",
    "Ines", "Lea", "Lena", "Eva", "Nina",
    "Ethan", "Noah", "Liam", "Rose", "Anna",
    "Jade", "Maeva", "Sarah", "Laura", "Clara",
    "Julie", "Nicolas", "Thomas", "Antoine", "Emilie",
    "Mathilde", "Charlotte", "Manon", "Julia", "Elise",
    "Victor", "Alex", "Samuel", "Valentin", "Axel",
    "Simon", "Romain", "Vincent", "Marc", "David",
];

const BASE_LABELS: &[&str] = &[
    "Paracetamol", "Ibuprofen", "Amoxicillin", "Aspirin", "Omeprazole",
    "Metformin", "Loratadine", "Cetirizine", "Azithromycin", "Atorvastatin",
    "Simvastatin", "Lisinopril", "Amlodipine", "Metoprolol", "Sertraline",
    "Fluoxetine", "Escitalopram", "Gabapentin", "Pregabalin", "Tramadol",
    "Prednisone", "Methylprednisolone", "Hydrocortisone", "Fluticasone", "Montelukast",
    "Albuterol", "Fluconazole", "Terbinafine", "Metronidazole", "Ciprofloxacin",
    "Doxycycline", "Cephalexin", "Nitrofurantoin", "Pantoprazole", "Ranitidine",
    "Famotidine", "Dicyclomine", "Ondansetron", "Promethazine", "Meclizine",
];

const DOSES: &[u32] = &[15, 20, 25, 50, 100, 200, 250, 300, 400, 500, 800, 1000];

#[derive(Debug, Clone)]
pub struct SeedOptions {
    pub patients: usize,
    pub medications: usize,
    pub prescriptions: usize,
    /// Drop all existing records before seeding.
    pub wipe: bool,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            patients: 10,
            medications: 5,
            prescriptions: 30,
            wipe: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub patients: usize,
    pub medications: usize,
    pub prescriptions: usize,
}

fn random_date(rng: &mut impl Rng, start_year: i32, end_year: i32) -> NaiveDate {
    let start = NaiveDate::from_ymd_opt(start_year, 1, 1).unwrap_or_default();
    let end = NaiveDate::from_ymd_opt(end_year, 12, 31).unwrap_or_default();
    let span = (end - start).num_days().max(0);
    start + Duration::days(rng.gen_range(0..=span))
}

pub fn run(store: &RecordStore, opts: &SeedOptions) -> StoreResult<SeedReport> {
    let mut rng = rand::thread_rng();

    if opts.wipe {
        tracing::warn!("wiping existing records before seeding");
        store.clear_records()?;
    }

    let mut patients = Vec::with_capacity(opts.patients);
    for _ in 0..opts.patients {
        patients.push(store.create_patient(NewPatient {
            last_name: (*LAST_NAMES.choose(&mut rng).unwrap_or(&"Martin")).to_string(),
            first_name: (*FIRST_NAMES.choose(&mut rng).unwrap_or(&"Jean")).to_string(),
            birth_date: Some(random_date(&mut rng, 1940, 2025)),
        })?);
    }

    let mut used_codes: HashSet<String> = store
        .medications()?
        .into_iter()
        .map(|m| m.code)
        .collect();
    let mut medications = Vec::with_capacity(opts.medications);
    for _ in 0..opts.medications {
        let code = loop {
            let letter = (b'A' + rng.gen_range(0..26u8)) as char;
            let candidate = format!("MED{}{}", rng.gen_range(1000..10000), letter);
            if used_codes.insert(candidate.clone()) {
                break candidate;
            }
        };
        let label = format!(
            "{} {}{}",
            BASE_LABELS.choose(&mut rng).unwrap_or(&"Paracetamol"),
            DOSES.choose(&mut rng).unwrap_or(&500),
            ["mg", "g"].choose(&mut rng).unwrap_or(&"mg"),
        );
        let status = if rng.gen_bool(0.8) {
            MedicationStatus::Actif
        } else {
            MedicationStatus::Suppr
        };
        medications.push(store.create_medication(NewMedication { code, label, status })?);
    }

    // Prescriptions may target pre-existing records when this run
    // created none of its own.
    let patient_ids: Vec<u64> = if patients.is_empty() {
        store.patients()?.iter().map(|p| p.id).collect()
    } else {
        patients.iter().map(|p| p.id).collect()
    };
    let medication_ids: Vec<u64> = if medications.is_empty() {
        store.medications()?.iter().map(|m| m.id).collect()
    } else {
        medications.iter().map(|m| m.id).collect()
    };
    if opts.prescriptions > 0 {
        if patient_ids.is_empty() {
            return Err(StoreError::MissingPatient(0));
        }
        if medication_ids.is_empty() {
            return Err(StoreError::MissingMedication(0));
        }
    }

    let mut prescriptions = 0usize;
    for i in 0..opts.prescriptions {
        let patient = *patient_ids.choose(&mut rng).unwrap_or(&1);
        let medication = *medication_ids.choose(&mut rng).unwrap_or(&1);
        let status = match rng.gen_range(0..9) {
            0..=6 => PrescriptionStatus::Valide,
            7 => PrescriptionStatus::EnAttente,
            _ => PrescriptionStatus::Suppr,
        };
        // Generated ranges always satisfy end_date >= start_date.
        let start_date = random_date(&mut rng, 2022, 2026);
        let end_date = start_date + Duration::days(rng.gen_range(1..=100));
        let comment = if rng.gen_bool(0.7) {
            format!("Demo comment {}", i + 1)
        } else {
            String::new()
        };
        store.create_prescription(NewPrescription {
            patient,
            medication,
            start_date,
            end_date,
            status,
            comment,
        })?;
        prescriptions += 1;
    }

    let report = SeedReport {
        patients: patients.len(),
        medications: medications.len(),
        prescriptions,
    };
    tracing::info!(
        patients = report.patients,
        medications = report.medications,
        prescriptions = report.prescriptions,
        "seeded demo records"
    );
    Ok(report)
}
