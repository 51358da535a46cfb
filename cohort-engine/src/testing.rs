//! Fixture cohort and record builders shared by the unit tests.

use cohort_core::{ClinicalDate, Observation, RecordStore};

use crate::ingest::{store_from_json_strs, CollectionSources};

pub(crate) fn fixture_store() -> RecordStore {
    store_from_json_strs(CollectionSources {
        patients: include_str!("../tests/data/patients.json"),
        conditions: include_str!("../tests/data/conditions.json"),
        medications: include_str!("../tests/data/medications.json"),
        observations: include_str!("../tests/data/observations.json"),
        encounters: include_str!("../tests/data/encounters.json"),
    })
    .expect("fixture cohort is well-formed")
}

pub(crate) fn observation(id: &str, kind: &str, date: &str, value: f64) -> Observation {
    Observation {
        observation_id: id.to_string(),
        patient_id: "P001".to_string(),
        observation_type: kind.to_string(),
        observation_date: ClinicalDate::parse(date).expect("valid test date"),
        value,
        unit: String::new(),
        normal_range_low: 0.0,
        normal_range_high: 0.0,
        normal_flag: true,
    }
}
