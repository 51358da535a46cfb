//! Group-by-count statistics over the whole cohort.

use std::collections::HashMap;

use cohort_core::{AggregateBucket, Encounter, Patient, PRIMARY_CONDITION_BUCKETS};

/// Count records per key. Buckets come out in the order keys are first seen.
pub fn count_by<'a, T, I, F>(records: I, key: F) -> Vec<AggregateBucket>
where
    T: 'a,
    I: IntoIterator<Item = &'a T>,
    F: Fn(&'a T) -> &'a str,
{
    let mut buckets: Vec<AggregateBucket> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let name = key(record);
        match positions.get(name) {
            Some(&position) => buckets[position].count += 1,
            None => {
                positions.insert(name, buckets.len());
                buckets.push(AggregateBucket {
                    key: name.to_string(),
                    count: 1,
                });
            }
        }
    }

    buckets
}

pub fn by_city(patients: &[Patient]) -> Vec<AggregateBucket> {
    count_by(patients, |p| p.city.as_str())
}

/// The first eight primary conditions in order of appearance. This is not a
/// top-eight ranking: a frequent condition first seen late is left out.
pub fn by_primary_condition(patients: &[Patient]) -> Vec<AggregateBucket> {
    by_primary_condition_limited(patients, PRIMARY_CONDITION_BUCKETS)
}

pub fn by_primary_condition_limited(patients: &[Patient], limit: usize) -> Vec<AggregateBucket> {
    let mut buckets = count_by(patients, |p| p.primary_condition_name.as_str());
    buckets.truncate(limit);
    buckets
}

pub fn by_encounter_type(encounters: &[Encounter]) -> Vec<AggregateBucket> {
    count_by(encounters, |e| e.encounter_type.as_str())
}
