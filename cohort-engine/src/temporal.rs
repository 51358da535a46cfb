//! Latest-reading lookup over observations.

use cohort_core::Observation;

/// Most recent observation of `observation_type` (exact match).
///
/// Dates are compared chronologically. When several readings share the
/// latest date, the one that comes first in `observations` wins.
pub fn latest_by_type<'a, I>(observations: I, observation_type: &str) -> Option<&'a Observation>
where
    I: IntoIterator<Item = &'a Observation>,
{
    observations
        .into_iter()
        .filter(|o| o.observation_type == observation_type)
        .reduce(|latest, candidate| {
            if candidate.observation_date.instant() > latest.observation_date.instant() {
                candidate
            } else {
                latest
            }
        })
}

/// Observations ordered most recent first; same-date readings keep input order.
pub fn most_recent_first<'a, I>(observations: I) -> Vec<&'a Observation>
where
    I: IntoIterator<Item = &'a Observation>,
{
    let mut ordered: Vec<&Observation> = observations.into_iter().collect();
    ordered.sort_by(|a, b| {
        b.observation_date
            .instant()
            .cmp(&a.observation_date.instant())
    });
    ordered
}
