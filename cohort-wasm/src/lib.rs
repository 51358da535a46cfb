//! WASM <-> JavaScript bridge for the dashboard front end.
//!
//! The front end passes the five collections it fetched on every call; no
//! state is kept on the Rust side.

use cohort_core::{DashboardConfig, MalformedRecordError};
use serde::Deserialize;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

#[derive(Deserialize, Default)]
struct JsDashboardConfig {
    #[serde(default)]
    primary_condition_buckets: Option<usize>,
    #[serde(default)]
    key_vitals: Option<Vec<String>>,
}

impl From<JsDashboardConfig> for DashboardConfig {
    fn from(cfg: JsDashboardConfig) -> Self {
        let mut base = DashboardConfig::default();
        if let Some(limit) = cfg.primary_condition_buckets {
            base.primary_condition_buckets = limit;
        }
        if let Some(vitals) = cfg.key_vitals {
            base.key_vitals = vitals;
        }
        base
    }
}

/// Detail-screen data for one patient.
#[wasm_bindgen]
pub fn summarize_patient(
    collections: JsValue,
    patient_id: String,
    config: Option<JsValue>,
) -> Result<JsValue, JsValue> {
    install_panic_hook();

    let store = cohort_engine::store_from_collections(&read_json(collections, "collections")?)
        .map_err(malformed)?;
    let cfg = read_config(config)?;

    let view = cohort_engine::summarize_patient(&store, &patient_id, &cfg);
    to_value(&view).map_err(|err| JsValue::from_str(&format!("could not serialize view: {err}")))
}

/// Overview counts and the three cohort groupings.
#[wasm_bindgen]
pub fn cohort_analytics(collections: JsValue, config: Option<JsValue>) -> Result<JsValue, JsValue> {
    install_panic_hook();

    let store = cohort_engine::store_from_collections(&read_json(collections, "collections")?)
        .map_err(malformed)?;
    let cfg = read_config(config)?;

    let analytics = cohort_engine::summarize_cohort(&store, &cfg);
    to_value(&analytics)
        .map_err(|err| JsValue::from_str(&format!("could not serialize analytics: {err}")))
}

/// Search screen results; a blank term yields an empty list.
///
/// Only the Patient collection is read, but repeated ids are still an error.
#[wasm_bindgen]
pub fn search_suggestions(patients: JsValue, term: String) -> Result<JsValue, JsValue> {
    install_panic_hook();

    let patients = cohort_engine::patients_from_value(&read_json(patients, "patients")?)
        .map_err(malformed)?;
    let found = cohort_engine::search_suggestions(&patients, &term);
    to_value(&found).map_err(|err| JsValue::from_str(&format!("could not serialize patients: {err}")))
}

/// Sidebar list filter; a blank term keeps every patient.
#[wasm_bindgen]
pub fn filter_visible_list(patients: JsValue, term: String) -> Result<JsValue, JsValue> {
    install_panic_hook();

    let patients = cohort_engine::patients_from_value(&read_json(patients, "patients")?)
        .map_err(malformed)?;
    let visible = cohort_engine::filter_visible_list(&patients, &term);
    to_value(&visible).map_err(|err| JsValue::from_str(&format!("could not serialize patients: {err}")))
}

fn install_panic_hook() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

fn read_json(value: JsValue, what: &str) -> Result<serde_json::Value, JsValue> {
    from_value::<serde_json::Value>(value)
        .map_err(|err| JsValue::from_str(&format!("could not read {what}: {err}")))
}

fn read_config(config: Option<JsValue>) -> Result<DashboardConfig, JsValue> {
    match config {
        Some(js_cfg) if !js_cfg.is_undefined() && !js_cfg.is_null() => {
            let cfg: JsDashboardConfig = from_value(js_cfg)
                .map_err(|err| JsValue::from_str(&format!("could not read config: {err}")))?;
            Ok(DashboardConfig::from(cfg))
        }
        _ => Ok(DashboardConfig::default()),
    }
}

fn malformed(err: MalformedRecordError) -> JsValue {
    JsValue::from_str(&format!("Cohort data error: {err}"))
}
