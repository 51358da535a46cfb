//! Blood-pressure trend series for charting.

use std::collections::HashMap;

use cohort_core::observation_types::{DIASTOLIC_BP, SYSTOLIC_BP};
use cohort_core::{Observation, TrendPoint};

/// Points keyed by the exact date string, in first-insertion order.
#[derive(Default)]
struct TrendAccumulator {
    points: Vec<TrendPoint>,
    by_date: HashMap<String, usize>,
}

impl TrendAccumulator {
    fn point_for(&mut self, observation: &Observation) -> &mut TrendPoint {
        let key = observation.observation_date.as_str();
        let position = match self.by_date.get(key) {
            Some(&position) => position,
            None => {
                self.points.push(TrendPoint {
                    date: observation.observation_date.clone(),
                    sbp: None,
                    dbp: None,
                });
                let position = self.points.len() - 1;
                self.by_date.insert(key.to_string(), position);
                position
            }
        };
        &mut self.points[position]
    }

    fn finish(mut self) -> Vec<TrendPoint> {
        // Stable: points on the same instant keep insertion order.
        self.points.sort_by_key(|point| point.date.instant());
        self.points
    }
}

/// Merge systolic and diastolic readings into one series, ascending by date.
///
/// All systolic readings are placed first, then diastolic readings are merged
/// onto the same date key. A later reading of the same type on the same date
/// replaces the earlier one.
pub fn build_bp_trend<'a, I>(observations: I) -> Vec<TrendPoint>
where
    I: IntoIterator<Item = &'a Observation>,
{
    let (systolic, diastolic): (Vec<&Observation>, Vec<&Observation>) = observations
        .into_iter()
        .filter(|o| o.observation_type == SYSTOLIC_BP || o.observation_type == DIASTOLIC_BP)
        .partition(|o| o.observation_type == SYSTOLIC_BP);

    let mut acc = TrendAccumulator::default();
    for reading in systolic {
        acc.point_for(reading).sbp = Some(reading.value);
    }
    for reading in diastolic {
        acc.point_for(reading).dbp = Some(reading.value);
    }

    let points = acc.finish();
    tracing::trace!(points = points.len(), "blood pressure trend built");
    points
}
