//! Three-level risk badge derived from a patient's scope.

use cohort_core::observation_types::{DIASTOLIC_BP, HBA1C, SYSTOLIC_BP};
use cohort_core::{RiskAssessment, RiskLabel};
use serde::Serialize;

use crate::scope::PatientScope;
use crate::temporal::latest_by_type;

/// The only inputs the risk rule looks at.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct RiskFactors {
    pub chronic_conditions: usize,
    pub latest_hba1c: Option<f64>,
    /// Latest systolic and diastolic values, present only when both exist.
    pub latest_bp: Option<(f64, f64)>,
}

impl RiskFactors {
    pub fn from_scope(scope: &PatientScope<'_>) -> Self {
        let observations = || scope.observations.iter().copied();
        let systolic = latest_by_type(observations(), SYSTOLIC_BP);
        let diastolic = latest_by_type(observations(), DIASTOLIC_BP);

        Self {
            chronic_conditions: scope.chronic_conditions.len(),
            latest_hba1c: latest_by_type(observations(), HBA1C).map(|o| o.value),
            latest_bp: systolic.zip(diastolic).map(|(s, d)| (s.value, d.value)),
        }
    }

    pub fn score(&self) -> u32 {
        let chronic = match self.chronic_conditions {
            0 => 0,
            1 | 2 => 1,
            _ => 2,
        };

        let glycemic = match self.latest_hba1c {
            Some(v) if v >= 8.0 => 2,
            Some(v) if v >= 7.0 => 1,
            _ => 0,
        };

        let pressure = match self.latest_bp {
            Some((sbp, dbp)) if sbp >= 160.0 || dbp >= 100.0 => 2,
            Some((sbp, dbp)) if sbp >= 140.0 || dbp >= 90.0 => 1,
            _ => 0,
        };

        chronic + glycemic + pressure
    }

    pub fn assess(&self) -> RiskAssessment {
        let score = self.score();
        RiskAssessment {
            label: label_for(score),
            score,
        }
    }
}

fn label_for(score: u32) -> RiskLabel {
    match score {
        0 | 1 => RiskLabel::Low,
        2 | 3 => RiskLabel::Medium,
        _ => RiskLabel::High,
    }
}

/// Classify a scoped patient. Never fails; an empty scope is `Low` with score 0.
pub fn classify(scope: &PatientScope<'_>) -> RiskAssessment {
    RiskFactors::from_scope(scope).assess()
}
