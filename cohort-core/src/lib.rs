//! Record types, derived entities and configuration shared by the cohort engine.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

mod date;
mod error;

pub use date::ClinicalDate;
pub use error::{CohortError, FieldProblem, MalformedRecordError, RecordKind};

/// Observation type labels the engine knows about.
pub mod observation_types {
    pub const SYSTOLIC_BP: &str = "Systolic BP";
    pub const DIASTOLIC_BP: &str = "Diastolic BP";
    pub const HBA1C: &str = "HbA1c";
    pub const HEART_RATE: &str = "Heart Rate";
    pub const BMI: &str = "BMI";
    pub const TOTAL_CHOLESTEROL: &str = "Total Cholesterol";
}

/// Default number of primary-condition buckets in the analytics view.
pub const PRIMARY_CONDITION_BUCKETS: usize = 8;

/// Settings for the dashboard summaries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    /// How many primary-condition buckets to keep, in first-seen order.
    pub primary_condition_buckets: usize,
    /// Observation types listed in the latest-values panel.
    pub key_vitals: Vec<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        use observation_types::*;

        Self {
            primary_condition_buckets: PRIMARY_CONDITION_BUCKETS,
            key_vitals: [
                SYSTOLIC_BP,
                DIASTOLIC_BP,
                HBA1C,
                HEART_RATE,
                BMI,
                TOTAL_CHOLESTEROL,
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Patient {
    pub patient_id: String,
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub gender: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub marital_status: String,
    pub insurance_type: String,
    pub primary_condition_code: String,
    pub primary_condition_name: String,
    pub birth_date: ClinicalDate,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Condition {
    pub condition_id: String,
    pub patient_id: String,
    pub condition_code: String,
    pub condition_name: String,
    pub onset_date: ClinicalDate,
    pub chronic_flag: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Medication {
    pub medication_id: String,
    pub patient_id: String,
    pub medication_name: String,
    pub atc_code: String,
    pub start_date: ClinicalDate,
    /// `None` while the medication is ongoing.
    pub end_date: Option<ClinicalDate>,
    pub active_flag: bool,
}

impl Medication {
    pub fn is_ongoing(&self) -> bool {
        self.end_date.is_none()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Observation {
    pub observation_id: String,
    pub patient_id: String,
    pub observation_type: String,
    pub observation_date: ClinicalDate,
    pub value: f64,
    pub unit: String,
    pub normal_range_low: f64,
    pub normal_range_high: f64,
    /// Precomputed by the data source; never re-derived from the range.
    pub normal_flag: bool,
}

impl Observation {
    pub fn is_out_of_range(&self) -> bool {
        !self.normal_flag
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Encounter {
    pub encounter_id: String,
    pub patient_id: String,
    pub encounter_type: String,
    pub department: String,
    pub encounter_date: ClinicalDate,
    pub length_of_stay_days: f64,
    pub total_cost_usd: f64,
    pub readmitted_30d_flag: bool,
}

impl Encounter {
    pub fn readmitted(&self) -> bool {
        self.readmitted_30d_flag
    }
}

/// The five collections of a cohort, immutable once built.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    patients: Vec<Patient>,
    conditions: Vec<Condition>,
    medications: Vec<Medication>,
    observations: Vec<Observation>,
    encounters: Vec<Encounter>,
    patient_index: HashMap<String, usize>,
}

impl RecordStore {
    /// Assemble a store, rejecting a Patient collection with repeated identifiers.
    pub fn new(
        patients: Vec<Patient>,
        conditions: Vec<Condition>,
        medications: Vec<Medication>,
        observations: Vec<Observation>,
        encounters: Vec<Encounter>,
    ) -> Result<Self, MalformedRecordError> {
        let patient_index = index_patients(&patients)?;

        Ok(Self {
            patients,
            conditions,
            medications,
            observations,
            encounters,
            patient_index,
        })
    }

    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn medications(&self) -> &[Medication] {
        &self.medications
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn encounters(&self) -> &[Encounter] {
        &self.encounters
    }

    pub fn patient(&self, patient_id: &str) -> Option<&Patient> {
        self.patient_index
            .get(patient_id)
            .and_then(|&position| self.patients.get(position))
    }

    /// Patient selected when nothing has been chosen yet: the first one loaded.
    pub fn default_patient(&self) -> Option<&Patient> {
        self.patients.first()
    }
}

/// Map each `patient_id` to its position, failing on the first repeat.
pub fn index_patients(
    patients: &[Patient],
) -> Result<HashMap<String, usize>, MalformedRecordError> {
    let mut index = HashMap::with_capacity(patients.len());
    for (position, patient) in patients.iter().enumerate() {
        if index.insert(patient.patient_id.clone(), position).is_some() {
            return Err(MalformedRecordError {
                kind: RecordKind::Patient,
                id: Some(patient.patient_id.clone()),
                field: "patient_id",
                problem: FieldProblem::Duplicate,
            });
        }
    }
    Ok(index)
}

/// One date on the blood-pressure chart. A missing reading stays `None`
/// and is left out of the serialized point.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TrendPoint {
    pub date: ClinicalDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sbp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dbp: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskLabel {
    Low,
    Medium,
    High,
}

impl RiskLabel {
    pub fn badge_text(self) -> &'static str {
        match self {
            RiskLabel::Low => "Low risk",
            RiskLabel::Medium => "Medium risk",
            RiskLabel::High => "High risk",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct RiskAssessment {
    pub label: RiskLabel,
    pub score: u32,
}

/// Count of records sharing one grouping key.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AggregateBucket {
    pub key: String,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient(id: &str) -> Patient {
        Patient {
            patient_id: id.to_string(),
            first_name: "Ada".to_string(),
            last_name: "Moreno".to_string(),
            age: 61,
            gender: "Female".to_string(),
            city: "Austin".to_string(),
            state: "TX".to_string(),
            zip_code: "73301".to_string(),
            marital_status: "Married".to_string(),
            insurance_type: "Medicare".to_string(),
            primary_condition_code: "E11".to_string(),
            primary_condition_name: "Type 2 diabetes".to_string(),
            birth_date: ClinicalDate::parse("1962-04-09").unwrap(),
        }
    }

    #[test]
    fn store_indexes_patients() {
        let store = RecordStore::new(
            vec![patient("P1"), patient("P2")],
            Vec::new(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
        )
        .unwrap();

        assert_eq!(store.patient("P2").map(|p| p.patient_id.as_str()), Some("P2"));
        assert!(store.patient("P3").is_none());
        assert_eq!(store.default_patient().map(|p| p.patient_id.as_str()), Some("P1"));
    }

    #[test]
    fn store_rejects_duplicate_patient_ids() {
        let err = RecordStore::new(
            vec![patient("P1"), patient("P1")],
            Vec::new(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
        )
        .unwrap_err();

        assert_eq!(err.kind, RecordKind::Patient);
        assert_eq!(err.id.as_deref(), Some("P1"));
        assert_eq!(err.problem, FieldProblem::Duplicate);
    }

    #[test]
    fn index_reports_the_first_repeat() {
        let err = index_patients(&[patient("P1"), patient("P2"), patient("P2")]).unwrap_err();
        assert_eq!(err.field, "patient_id");
        assert_eq!(err.id.as_deref(), Some("P2"));
        assert_eq!(err.problem, FieldProblem::Duplicate);

        let index = index_patients(&[patient("P1"), patient("P2")]).unwrap();
        assert_eq!(index.get("P2"), Some(&1));
    }

    #[test]
    fn default_config_uses_shared_bucket_count() {
        assert_eq!(
            DashboardConfig::default().primary_condition_buckets,
            PRIMARY_CONDITION_BUCKETS
        );
    }

    #[test]
    fn empty_store_has_no_default_patient() {
        assert!(RecordStore::default().default_patient().is_none());
    }

    #[test]
    fn trend_point_omits_missing_readings() {
        let point = TrendPoint {
            date: ClinicalDate::parse("2023-01-02").unwrap(),
            sbp: None,
            dbp: Some(80.0),
        };
        assert_eq!(
            serde_json::to_value(&point).unwrap(),
            serde_json::json!({ "date": "2023-01-02", "dbp": 80.0 })
        );
    }

    #[test]
    fn config_fills_missing_keys_with_defaults() {
        let cfg: DashboardConfig =
            serde_json::from_str(r#"{ "primary_condition_buckets": 5 }"#).unwrap();
        assert_eq!(cfg.primary_condition_buckets, 5);
        assert_eq!(cfg.key_vitals, DashboardConfig::default().key_vitals);
    }
}
