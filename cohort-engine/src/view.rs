//! Dashboard-ready summaries assembled from the individual derivations.

use cohort_core::{
    AggregateBucket, DashboardConfig, Encounter, Observation, Patient, RecordStore,
    RiskAssessment, TrendPoint,
};
use serde::Serialize;

use crate::aggregate::{by_city, by_encounter_type, by_primary_condition_limited};
use crate::risk::classify;
use crate::scope::{scope, PatientScope};
use crate::temporal::{latest_by_type, most_recent_first};
use crate::trend::build_bp_trend;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
pub struct PatientCounts {
    pub chronic_conditions: usize,
    pub active_medications: usize,
    pub encounters: usize,
}

/// Latest value of one observation type, if the patient has any.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LatestReading<'a> {
    pub observation_type: String,
    pub observation: Option<&'a Observation>,
}

/// Everything the detail screen shows for one patient.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PatientView<'a> {
    pub patient: Option<&'a Patient>,
    pub counts: PatientCounts,
    /// `None` when the identifier matches no patient.
    pub risk: Option<RiskAssessment>,
    pub latest: Vec<LatestReading<'a>>,
    pub bp_trend: Vec<TrendPoint>,
    /// Last point of `bp_trend`.
    pub latest_bp: Option<TrendPoint>,
    pub observations_recent_first: Vec<&'a Observation>,
    pub encounters_recent_first: Vec<&'a Encounter>,
    pub scope: PatientScope<'a>,
}

impl<'a> PatientView<'a> {
    pub fn latest(&self, observation_type: &str) -> Option<&'a Observation> {
        self.latest
            .iter()
            .find(|reading| reading.observation_type == observation_type)
            .and_then(|reading| reading.observation)
    }
}

pub fn summarize_patient<'a>(
    store: &'a RecordStore,
    patient_id: &str,
    config: &DashboardConfig,
) -> PatientView<'a> {
    let scoped = scope(patient_id, store);

    let latest = config
        .key_vitals
        .iter()
        .map(|observation_type| LatestReading {
            observation_type: observation_type.clone(),
            observation: latest_by_type(scoped.observations.iter().copied(), observation_type),
        })
        .collect();

    let bp_trend = build_bp_trend(scoped.observations.iter().copied());
    let latest_bp = bp_trend.last().cloned();

    let mut encounters_recent_first = scoped.encounters.clone();
    encounters_recent_first.sort_by(|a, b| {
        b.encounter_date
            .instant()
            .cmp(&a.encounter_date.instant())
    });

    let view = PatientView {
        patient: scoped.patient,
        counts: PatientCounts {
            chronic_conditions: scoped.chronic_conditions.len(),
            active_medications: scoped.active_medications.len(),
            encounters: scoped.encounters.len(),
        },
        risk: scoped.patient.map(|_| classify(&scoped)),
        latest,
        bp_trend,
        latest_bp,
        observations_recent_first: most_recent_first(scoped.observations.iter().copied()),
        encounters_recent_first,
        scope: scoped,
    };

    tracing::debug!(
        patient_id,
        found = view.patient.is_some(),
        risk = ?view.risk,
        "patient view summarized"
    );

    view
}

/// Collection sizes shown on the landing screen.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct CohortOverview {
    pub patients: usize,
    pub conditions: usize,
    pub medications: usize,
    pub observations: usize,
    pub encounters: usize,
}

impl CohortOverview {
    pub fn of(store: &RecordStore) -> Self {
        Self {
            patients: store.patients().len(),
            conditions: store.conditions().len(),
            medications: store.medications().len(),
            observations: store.observations().len(),
            encounters: store.encounters().len(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CohortAnalytics {
    pub overview: CohortOverview,
    pub by_city: Vec<AggregateBucket>,
    pub by_primary_condition: Vec<AggregateBucket>,
    pub by_encounter_type: Vec<AggregateBucket>,
}

pub fn summarize_cohort(store: &RecordStore, config: &DashboardConfig) -> CohortAnalytics {
    CohortAnalytics {
        overview: CohortOverview::of(store),
        by_city: by_city(store.patients()),
        by_primary_condition: by_primary_condition_limited(
            store.patients(),
            config.primary_condition_buckets,
        ),
        by_encounter_type: by_encounter_type(store.encounters()),
    }
}
