//! Errors raised when input records do not have the expected shape.

use std::fmt;

use serde::Serialize;

/// The five record collections making up a cohort.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Patient,
    Condition,
    Medication,
    Observation,
    Encounter,
}

impl RecordKind {
    /// Field holding the record's own identifier.
    pub fn id_field(self) -> &'static str {
        match self {
            RecordKind::Patient => "patient_id",
            RecordKind::Condition => "condition_id",
            RecordKind::Medication => "medication_id",
            RecordKind::Observation => "observation_id",
            RecordKind::Encounter => "encounter_id",
        }
    }

    /// Name of the collection (and of its data file, minus `.json`).
    pub fn collection(self) -> &'static str {
        match self {
            RecordKind::Patient => "patients",
            RecordKind::Condition => "conditions",
            RecordKind::Medication => "medications",
            RecordKind::Observation => "observations",
            RecordKind::Encounter => "encounters",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordKind::Patient => "Patient",
            RecordKind::Condition => "Condition",
            RecordKind::Medication => "Medication",
            RecordKind::Observation => "Observation",
            RecordKind::Encounter => "Encounter",
        };
        f.write_str(name)
    }
}

/// What was wrong with a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldProblem {
    Missing,
    InvalidType { expected: &'static str },
    Duplicate,
    NotACollection,
}

impl fmt::Display for FieldProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldProblem::Missing => f.write_str("is missing"),
            FieldProblem::InvalidType { expected } => write!(f, "is not {expected}"),
            FieldProblem::Duplicate => f.write_str("is not unique"),
            FieldProblem::NotACollection => f.write_str("is not an array of records"),
        }
    }
}

/// A record (or a whole collection) violating the expected input shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed {kind} record {}: `{field}` {problem}", .id.as_deref().unwrap_or("<unidentified>"))]
pub struct MalformedRecordError {
    pub kind: RecordKind,
    /// Identifier of the offending record, when it could be read.
    pub id: Option<String>,
    pub field: &'static str,
    pub problem: FieldProblem,
}

impl MalformedRecordError {
    pub fn missing(kind: RecordKind, id: Option<&str>, field: &'static str) -> Self {
        Self {
            kind,
            id: id.map(str::to_string),
            field,
            problem: FieldProblem::Missing,
        }
    }

    pub fn invalid(
        kind: RecordKind,
        id: Option<&str>,
        field: &'static str,
        expected: &'static str,
    ) -> Self {
        Self {
            kind,
            id: id.map(str::to_string),
            field,
            problem: FieldProblem::InvalidType { expected },
        }
    }

    pub fn not_a_collection(kind: RecordKind) -> Self {
        Self {
            kind,
            id: None,
            field: kind.collection(),
            problem: FieldProblem::NotACollection,
        }
    }
}

/// Errors at the boundary where raw input enters the engine.
#[derive(Debug, thiserror::Error)]
pub enum CohortError {
    #[error(transparent)]
    Malformed(#[from] MalformedRecordError),
    #[error("could not parse {collection}: {message}")]
    Parse {
        collection: &'static str,
        message: String,
    },
}
