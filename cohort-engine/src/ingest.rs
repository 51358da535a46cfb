//! Shape validation of raw JSON collections into typed records.

use cohort_core::{
    ClinicalDate, CohortError, Condition, Encounter, MalformedRecordError, Medication,
    Observation, Patient, RecordKind, RecordStore,
};
use serde_json::{Map, Value};

/// Raw JSON text of the five collections, as read by a loader.
#[derive(Debug, Clone, Copy)]
pub struct CollectionSources<'a> {
    pub patients: &'a str,
    pub conditions: &'a str,
    pub medications: &'a str,
    pub observations: &'a str,
    pub encounters: &'a str,
}

/// Parse and validate the five collections from JSON text.
pub fn store_from_json_strs(sources: CollectionSources<'_>) -> Result<RecordStore, CohortError> {
    let parse = |kind: RecordKind, text: &str| -> Result<Value, CohortError> {
        serde_json::from_str(text).map_err(|err| CohortError::Parse {
            collection: kind.collection(),
            message: err.to_string(),
        })
    };

    let patients = parse(RecordKind::Patient, sources.patients)?;
    let conditions = parse(RecordKind::Condition, sources.conditions)?;
    let medications = parse(RecordKind::Medication, sources.medications)?;
    let observations = parse(RecordKind::Observation, sources.observations)?;
    let encounters = parse(RecordKind::Encounter, sources.encounters)?;

    Ok(store_from_values(
        &patients,
        &conditions,
        &medications,
        &observations,
        &encounters,
    )?)
}

/// Validate an object holding the five collections under their plural names
/// (`patients`, `conditions`, ...).
pub fn store_from_collections(collections: &Value) -> Result<RecordStore, MalformedRecordError> {
    let get = |kind: RecordKind| {
        collections
            .get(kind.collection())
            .ok_or_else(|| MalformedRecordError::not_a_collection(kind))
    };

    store_from_values(
        get(RecordKind::Patient)?,
        get(RecordKind::Condition)?,
        get(RecordKind::Medication)?,
        get(RecordKind::Observation)?,
        get(RecordKind::Encounter)?,
    )
}

/// Validate the five collections and assemble the store. Any malformed record
/// fails the whole load.
pub fn store_from_values(
    patients: &Value,
    conditions: &Value,
    medications: &Value,
    observations: &Value,
    encounters: &Value,
) -> Result<RecordStore, MalformedRecordError> {
    let store = RecordStore::new(
        patients_from_value(patients)?,
        parse_collection(RecordKind::Condition, conditions, parse_condition)?,
        parse_collection(RecordKind::Medication, medications, parse_medication)?,
        parse_collection(RecordKind::Observation, observations, parse_observation)?,
        parse_collection(RecordKind::Encounter, encounters, parse_encounter)?,
    )?;

    tracing::debug!(
        patients = store.patients().len(),
        conditions = store.conditions().len(),
        medications = store.medications().len(),
        observations = store.observations().len(),
        encounters = store.encounters().len(),
        "cohort store loaded"
    );

    Ok(store)
}

/// Validate only the Patient collection (enough for the search flows).
///
/// Repeated `patient_id`s are rejected here as they are for a full store.
pub fn patients_from_value(value: &Value) -> Result<Vec<Patient>, MalformedRecordError> {
    let patients = parse_collection(RecordKind::Patient, value, parse_patient)?;
    cohort_core::index_patients(&patients)?;
    Ok(patients)
}

fn parse_collection<T>(
    kind: RecordKind,
    value: &Value,
    parse: fn(&RecordReader<'_>) -> Result<T, MalformedRecordError>,
) -> Result<Vec<T>, MalformedRecordError> {
    let records = value
        .as_array()
        .ok_or_else(|| MalformedRecordError::not_a_collection(kind))?;

    records
        .iter()
        .map(|record| RecordReader::new(kind, record).and_then(|reader| parse(&reader)))
        .collect()
}

fn parse_patient(r: &RecordReader<'_>) -> Result<Patient, MalformedRecordError> {
    Ok(Patient {
        patient_id: r.id.clone(),
        first_name: r.text("first_name")?,
        last_name: r.text("last_name")?,
        age: r.count("age")?,
        gender: r.text("gender")?,
        city: r.text("city")?,
        state: r.text("state")?,
        zip_code: r.code("zip_code")?,
        marital_status: r.text("marital_status")?,
        insurance_type: r.text("insurance_type")?,
        primary_condition_code: r.code("primary_condition_code")?,
        primary_condition_name: r.text("primary_condition_name")?,
        birth_date: r.date("birth_date")?,
    })
}

fn parse_condition(r: &RecordReader<'_>) -> Result<Condition, MalformedRecordError> {
    Ok(Condition {
        condition_id: r.id.clone(),
        patient_id: r.identifier("patient_id")?,
        condition_code: r.code("condition_code")?,
        condition_name: r.text("condition_name")?,
        onset_date: r.date("onset_date")?,
        chronic_flag: r.flag("chronic_flag")?,
    })
}

fn parse_medication(r: &RecordReader<'_>) -> Result<Medication, MalformedRecordError> {
    Ok(Medication {
        medication_id: r.id.clone(),
        patient_id: r.identifier("patient_id")?,
        medication_name: r.text("medication_name")?,
        atc_code: r.code("atc_code")?,
        start_date: r.date("start_date")?,
        end_date: r.optional_date("end_date")?,
        active_flag: r.flag("active_flag")?,
    })
}

fn parse_observation(r: &RecordReader<'_>) -> Result<Observation, MalformedRecordError> {
    Ok(Observation {
        observation_id: r.id.clone(),
        patient_id: r.identifier("patient_id")?,
        observation_type: r.text("observation_type")?,
        observation_date: r.date("observation_date")?,
        value: r.number("value")?,
        unit: r.text("unit")?,
        normal_range_low: r.number("normal_range_low")?,
        normal_range_high: r.number("normal_range_high")?,
        normal_flag: r.flag("normal_flag")?,
    })
}

fn parse_encounter(r: &RecordReader<'_>) -> Result<Encounter, MalformedRecordError> {
    Ok(Encounter {
        encounter_id: r.id.clone(),
        patient_id: r.identifier("patient_id")?,
        encounter_type: r.text("encounter_type")?,
        department: r.text("department")?,
        encounter_date: r.date("encounter_date")?,
        length_of_stay_days: r.number("length_of_stay_days")?,
        total_cost_usd: r.number("total_cost_usd")?,
        readmitted_30d_flag: r.flag("readmitted_30d_flag")?,
    })
}

/// Field accessor for one record; every error carries the record's kind and id.
struct RecordReader<'a> {
    kind: RecordKind,
    id: String,
    fields: &'a Map<String, Value>,
}

impl<'a> RecordReader<'a> {
    fn new(kind: RecordKind, record: &'a Value) -> Result<Self, MalformedRecordError> {
        let fields = record
            .as_object()
            .ok_or_else(|| MalformedRecordError::invalid(kind, None, "record", "a JSON object"))?;

        let id_field = kind.id_field();
        let id = match present(fields, id_field) {
            None => return Err(MalformedRecordError::missing(kind, None, id_field)),
            Some(value) => as_identifier(value)
                .ok_or_else(|| MalformedRecordError::invalid(kind, None, id_field, "an identifier"))?,
        };

        Ok(Self { kind, id, fields })
    }

    fn require(&self, field: &'static str) -> Result<&'a Value, MalformedRecordError> {
        present(self.fields, field)
            .ok_or_else(|| MalformedRecordError::missing(self.kind, Some(&self.id), field))
    }

    fn invalid(&self, field: &'static str, expected: &'static str) -> MalformedRecordError {
        MalformedRecordError::invalid(self.kind, Some(&self.id), field, expected)
    }

    fn text(&self, field: &'static str) -> Result<String, MalformedRecordError> {
        self.require(field)?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.invalid(field, "a string"))
    }

    /// A reference to another record: a non-blank string or an integer.
    fn identifier(&self, field: &'static str) -> Result<String, MalformedRecordError> {
        as_identifier(self.require(field)?).ok_or_else(|| self.invalid(field, "an identifier"))
    }

    /// Codes may arrive as strings or integers. An empty code is kept as-is.
    fn code(&self, field: &'static str) -> Result<String, MalformedRecordError> {
        match self.require(field)? {
            Value::String(text) => Ok(text.clone()),
            value => {
                as_integer_text(value).ok_or_else(|| self.invalid(field, "a string or integer"))
            }
        }
    }

    fn number(&self, field: &'static str) -> Result<f64, MalformedRecordError> {
        self.require(field)?
            .as_f64()
            .ok_or_else(|| self.invalid(field, "a number"))
    }

    fn count(&self, field: &'static str) -> Result<u32, MalformedRecordError> {
        let value = self.require(field)?;
        value
            .as_u64()
            .or_else(|| {
                value
                    .as_f64()
                    .filter(|n| *n >= 0.0 && n.fract() == 0.0)
                    .map(|n| n as u64)
            })
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| self.invalid(field, "a non-negative integer"))
    }

    fn flag(&self, field: &'static str) -> Result<bool, MalformedRecordError> {
        let value = self.require(field)?;
        if let Some(flag) = value.as_bool() {
            return Ok(flag);
        }
        match value.as_f64() {
            Some(n) if n == 0.0 => Ok(false),
            Some(n) if n == 1.0 => Ok(true),
            _ => Err(self.invalid(field, "a 0/1 flag")),
        }
    }

    fn date(&self, field: &'static str) -> Result<ClinicalDate, MalformedRecordError> {
        self.require(field)?
            .as_str()
            .and_then(ClinicalDate::parse)
            .ok_or_else(|| self.invalid(field, "an ISO date"))
    }

    /// Absent, `null` and empty values all mean "no date".
    fn optional_date(&self, field: &'static str) -> Result<Option<ClinicalDate>, MalformedRecordError> {
        match present(self.fields, field) {
            None => Ok(None),
            Some(Value::String(text)) if text.trim().is_empty() => Ok(None),
            Some(value) => value
                .as_str()
                .and_then(ClinicalDate::parse)
                .map(Some)
                .ok_or_else(|| self.invalid(field, "an ISO date")),
        }
    }
}

fn present<'a>(fields: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    fields.get(field).filter(|value| !value.is_null())
}

fn as_identifier(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        value => as_integer_text(value),
    }
}

fn as_integer_text(value: &Value) -> Option<String> {
    match value {
        Value::Number(number) if number.is_i64() || number.is_u64() => Some(number.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cohort_core::FieldProblem;
    use serde_json::json;

    fn patient_json(id: Value) -> Value {
        json!({
            "patient_id": id,
            "first_name": "Lena",
            "last_name": "Okafor",
            "age": 58,
            "gender": "Female",
            "city": "Denver",
            "state": "CO",
            "zip_code": 80202,
            "marital_status": "Single",
            "insurance_type": "Commercial",
            "primary_condition_code": "I10",
            "primary_condition_name": "Hypertension",
            "birth_date": "1966-02-14"
        })
    }

    fn observation_json() -> Value {
        json!({
            "observation_id": "O1",
            "patient_id": "P001",
            "observation_type": "HbA1c",
            "observation_date": "2023-06-01",
            "value": 7.4,
            "unit": "%",
            "normal_range_low": 4.0,
            "normal_range_high": 5.6,
            "normal_flag": 0
        })
    }

    #[test]
    fn numeric_identifiers_become_strings() {
        let patients = patients_from_value(&json!([patient_json(json!(42))])).unwrap();
        assert_eq!(patients[0].patient_id, "42");
        assert_eq!(patients[0].zip_code, "80202");
    }

    #[test]
    fn flags_decode_from_integers() {
        let store = store_from_values(
            &json!([patient_json(json!("P001"))]),
            &json!([]),
            &json!([]),
            &json!([observation_json()]),
            &json!([]),
        )
        .unwrap();

        let observation = &store.observations()[0];
        assert!(!observation.normal_flag);
        assert!(observation.is_out_of_range());
    }

    #[test]
    fn missing_patient_id_names_the_record() {
        let mut record = observation_json();
        record.as_object_mut().unwrap().remove("patient_id");

        let err = parse_collection(RecordKind::Observation, &json!([record]), parse_observation)
            .unwrap_err();
        assert_eq!(err.kind, RecordKind::Observation);
        assert_eq!(err.id.as_deref(), Some("O1"));
        assert_eq!(err.field, "patient_id");
        assert_eq!(err.problem, FieldProblem::Missing);
    }

    #[test]
    fn missing_own_id_leaves_the_record_unidentified() {
        let record = json!({
            "patient_id": "P001",
            "condition_code": "E11",
            "condition_name": "Type 2 diabetes",
            "onset_date": "2019-05-01",
            "chronic_flag": 1
        });

        let err = parse_collection(RecordKind::Condition, &json!([record]), parse_condition)
            .unwrap_err();
        assert_eq!(err.kind, RecordKind::Condition);
        assert_eq!(err.id, None);
        assert_eq!(err.field, "condition_id");
        assert_eq!(err.problem, FieldProblem::Missing);
    }

    #[test]
    fn empty_codes_and_names_are_kept() {
        let mut patient = patient_json(json!("P001"));
        patient["zip_code"] = json!("");
        patient["first_name"] = json!("");
        patient["city"] = json!("");

        let patients = patients_from_value(&json!([patient])).unwrap();
        assert_eq!(patients[0].zip_code, "");
        assert_eq!(patients[0].city, "");

        let meds = json!([{
            "medication_id": "M1",
            "patient_id": "P001",
            "medication_name": "Metformin",
            "atc_code": "",
            "start_date": "2021-03-01",
            "end_date": null,
            "active_flag": 1
        }]);
        let parsed = parse_collection(RecordKind::Medication, &meds, parse_medication).unwrap();
        assert_eq!(parsed[0].atc_code, "");
    }

    #[test]
    fn blank_patient_reference_is_rejected() {
        let mut record = observation_json();
        record["patient_id"] = json!("  ");

        let err = parse_collection(RecordKind::Observation, &json!([record]), parse_observation)
            .unwrap_err();
        assert_eq!(err.field, "patient_id");
        assert_eq!(
            err.problem,
            FieldProblem::InvalidType {
                expected: "an identifier"
            }
        );
    }

    #[test]
    fn null_is_not_coerced() {
        let mut record = observation_json();
        record["value"] = Value::Null;

        let err = parse_collection(RecordKind::Observation, &json!([record]), parse_observation)
            .unwrap_err();
        assert_eq!(err.field, "value");
        assert_eq!(err.problem, FieldProblem::Missing);
    }

    #[test]
    fn flags_outside_zero_one_are_rejected() {
        let mut record = observation_json();
        record["normal_flag"] = json!(2);

        let err = parse_collection(RecordKind::Observation, &json!([record]), parse_observation)
            .unwrap_err();
        assert_eq!(
            err.problem,
            FieldProblem::InvalidType {
                expected: "a 0/1 flag"
            }
        );
    }

    #[test]
    fn unparseable_dates_are_rejected() {
        let mut record = observation_json();
        record["observation_date"] = json!("June 1st");

        let err = parse_collection(RecordKind::Observation, &json!([record]), parse_observation)
            .unwrap_err();
        assert_eq!(err.field, "observation_date");
    }

    #[test]
    fn ongoing_medications_have_no_end_date() {
        let meds = json!([
            {
                "medication_id": "M1",
                "patient_id": "P001",
                "medication_name": "Metformin",
                "atc_code": "A10BA02",
                "start_date": "2021-03-01",
                "end_date": "",
                "active_flag": 1
            },
            {
                "medication_id": "M2",
                "patient_id": "P001",
                "medication_name": "Lisinopril",
                "atc_code": "C09AA03",
                "start_date": "2020-01-10",
                "end_date": "2022-01-10",
                "active_flag": 0
            }
        ]);

        let parsed = parse_collection(RecordKind::Medication, &meds, parse_medication).unwrap();
        assert!(parsed[0].is_ongoing());
        assert!(parsed[0].active_flag);
        assert_eq!(
            parsed[1].end_date.as_ref().map(ClinicalDate::as_str),
            Some("2022-01-10")
        );
    }

    #[test]
    fn collections_must_be_arrays() {
        let err = patients_from_value(&json!({ "patient_id": "P1" })).unwrap_err();
        assert_eq!(err.problem, FieldProblem::NotACollection);
        assert_eq!(err.kind, RecordKind::Patient);
    }

    #[test]
    fn collections_object_needs_every_key() {
        let err = store_from_collections(&json!({
            "patients": [],
            "conditions": [],
            "medications": [],
            "observations": []
        }))
        .unwrap_err();
        assert_eq!(err.kind, RecordKind::Encounter);
    }

    #[test]
    fn invalid_json_text_reports_collection() {
        let err = store_from_json_strs(CollectionSources {
            patients: "[]",
            conditions: "[",
            medications: "[]",
            observations: "[]",
            encounters: "[]",
        })
        .unwrap_err();
        assert!(matches!(
            err,
            CohortError::Parse {
                collection: "conditions",
                ..
            }
        ));
    }

    #[test]
    fn duplicate_patients_fail_the_load() {
        let err = store_from_values(
            &json!([patient_json(json!("P001")), patient_json(json!("P001"))]),
            &json!([]),
            &json!([]),
            &json!([]),
            &json!([]),
        )
        .unwrap_err();
        assert_eq!(err.problem, FieldProblem::Duplicate);
    }

    #[test]
    fn patient_only_loads_reject_duplicates() {
        let err = patients_from_value(&json!([
            patient_json(json!("P001")),
            patient_json(json!("P002")),
            patient_json(json!("P001"))
        ]))
        .unwrap_err();
        assert_eq!(err.kind, RecordKind::Patient);
        assert_eq!(err.id.as_deref(), Some("P001"));
        assert_eq!(err.problem, FieldProblem::Duplicate);
    }
}
