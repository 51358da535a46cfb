//! Free-text patient lookup by name or identifier.

use cohort_core::Patient;

fn normalize_term(term: &str) -> String {
    term.trim().to_lowercase()
}

fn matches_normalized(patient: &Patient, needle: &str) -> bool {
    format!(
        "{} {} {}",
        patient.first_name, patient.last_name, patient.patient_id
    )
    .to_lowercase()
    .contains(needle)
}

/// Case-insensitive substring match of `term` against "first last id".
///
/// The term is trimmed first; an empty term matches every patient.
pub fn matches(patient: &Patient, term: &str) -> bool {
    matches_normalized(patient, &normalize_term(term))
}

/// Results for the dedicated search screen. A blank term returns nothing so
/// the screen can show a prompt instead of the whole cohort.
pub fn search_suggestions<'a>(patients: &'a [Patient], term: &str) -> Vec<&'a Patient> {
    let needle = normalize_term(term);
    if needle.is_empty() {
        return Vec::new();
    }
    patients
        .iter()
        .filter(|p| matches_normalized(p, &needle))
        .collect()
}

/// Patients shown in the sidebar list. A blank term keeps everyone visible.
pub fn filter_visible_list<'a>(patients: &'a [Patient], term: &str) -> Vec<&'a Patient> {
    let needle = normalize_term(term);
    patients
        .iter()
        .filter(|p| matches_normalized(p, &needle))
        .collect()
}
