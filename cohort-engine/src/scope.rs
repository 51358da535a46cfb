//! Per-patient filtering of the cohort collections.

use cohort_core::{Condition, Encounter, Medication, Observation, Patient, RecordStore};
use serde::Serialize;

/// One patient's slice of the store. Source order is preserved in every list.
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct PatientScope<'a> {
    pub patient: Option<&'a Patient>,
    pub conditions: Vec<&'a Condition>,
    pub chronic_conditions: Vec<&'a Condition>,
    pub medications: Vec<&'a Medication>,
    pub active_medications: Vec<&'a Medication>,
    pub observations: Vec<&'a Observation>,
    pub encounters: Vec<&'a Encounter>,
}

impl PatientScope<'_> {
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
            && self.medications.is_empty()
            && self.observations.is_empty()
            && self.encounters.is_empty()
    }
}

/// Collect the records belonging to `patient_id`.
///
/// An identifier with no Patient record yields an empty scope, even when
/// clinical records reference it.
pub fn scope<'a>(patient_id: &str, store: &'a RecordStore) -> PatientScope<'a> {
    let Some(patient) = store.patient(patient_id) else {
        tracing::trace!(patient_id, "no such patient, returning empty scope");
        return PatientScope::default();
    };

    let conditions: Vec<&Condition> = store
        .conditions()
        .iter()
        .filter(|c| c.patient_id == patient_id)
        .collect();
    let chronic_conditions = conditions.iter().copied().filter(|c| c.chronic_flag).collect();

    let medications: Vec<&Medication> = store
        .medications()
        .iter()
        .filter(|m| m.patient_id == patient_id)
        .collect();
    let active_medications = medications.iter().copied().filter(|m| m.active_flag).collect();

    PatientScope {
        patient: Some(patient),
        conditions,
        chronic_conditions,
        medications,
        active_medications,
        observations: store
            .observations()
            .iter()
            .filter(|o| o.patient_id == patient_id)
            .collect(),
        encounters: store
            .encounters()
            .iter()
            .filter(|e| e.patient_id == patient_id)
            .collect(),
    }
}
