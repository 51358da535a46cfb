//! Derivations behind the cohort dashboard: per-patient scoping, latest
//! readings, blood-pressure trends, risk badges, cohort counts and search.
//!
//! Every function here is pure. Callers that want caching can key it on the
//! store, the patient identifier and the config.

pub mod aggregate;
pub mod ingest;
pub mod risk;
pub mod scope;
pub mod search;
pub mod temporal;
pub mod trend;
pub mod view;

#[cfg(test)]
mod testing;

pub use aggregate::{by_city, by_encounter_type, by_primary_condition, count_by};
pub use ingest::{
    patients_from_value, store_from_collections, store_from_json_strs, store_from_values,
    CollectionSources,
};
pub use risk::{classify, RiskFactors};
pub use scope::{scope, PatientScope};
pub use search::{filter_visible_list, matches, search_suggestions};
pub use temporal::latest_by_type;
pub use trend::build_bp_trend;
pub use view::{summarize_cohort, summarize_patient, CohortAnalytics, CohortOverview, PatientView};
