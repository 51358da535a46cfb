use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use cohort_core::{DashboardConfig, RecordKind, RecordStore};
use cohort_engine::{
    filter_visible_list, search_suggestions, store_from_json_strs, summarize_cohort,
    summarize_patient, CohortAnalytics, CollectionSources, PatientView,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "cohort-cli",
    about = "Summarize a synthetic clinical cohort from its JSON data files."
)]
struct Args {
    /// Directory holding patients.json, conditions.json, medications.json,
    /// observations.json and encounters.json.
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    /// Optional JSON file overriding dashboard settings.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print JSON instead of text.
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Collection sizes and cohort groupings.
    Overview,
    /// Detail view for one patient (the first patient when omitted).
    Patient { patient_id: Option<String> },
    /// Search patients by name or identifier.
    Search { term: String },
    /// List patients, optionally filtered.
    List {
        #[arg(short, long, default_value = "")]
        filter: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cohort_cli=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    let store = load_store(&args.data_dir)?;
    tracing::info!(
        patients = store.patients().len(),
        "loaded cohort from {}",
        args.data_dir.display()
    );

    match args.command {
        Command::Overview => {
            let analytics = summarize_cohort(&store, &config);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&analytics)?);
            } else {
                print_overview(&analytics);
            }
        }
        Command::Patient { patient_id } => {
            let patient_id = match patient_id {
                Some(id) => id,
                None => store
                    .default_patient()
                    .map(|p| p.patient_id.clone())
                    .context("the cohort has no patients")?,
            };
            let view = summarize_patient(&store, &patient_id, &config);
            if view.patient.is_none() {
                tracing::warn!("no patient with id {patient_id}");
            }
            if args.json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print_patient(&view);
            }
        }
        Command::Search { term } => {
            let found = search_suggestions(store.patients(), &term);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&found)?);
            } else if term.trim().is_empty() {
                println!("Type a name or patient ID to search.");
            } else if found.is_empty() {
                println!("No patients match \"{}\".", term.trim());
            } else {
                for patient in found {
                    println!("{}  {}", patient.patient_id, patient.full_name());
                }
            }
        }
        Command::List { filter } => {
            let visible = filter_visible_list(store.patients(), &filter);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&visible)?);
            } else {
                for patient in visible {
                    println!(
                        "{}  {}  ({}, {})",
                        patient.patient_id,
                        patient.full_name(),
                        patient.city,
                        patient.primary_condition_name
                    );
                }
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<DashboardConfig> {
    let Some(path) = path else {
        return Ok(DashboardConfig::default());
    };
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("could not read config file {}", path.display()))?;
    serde_json::from_str(&data)
        .with_context(|| format!("invalid config file {}", path.display()))
}

fn load_store(dir: &Path) -> anyhow::Result<RecordStore> {
    let read = |kind: RecordKind| {
        let path = dir.join(format!("{}.json", kind.collection()));
        std::fs::read_to_string(&path)
            .with_context(|| format!("could not read {}", path.display()))
    };

    let patients = read(RecordKind::Patient)?;
    let conditions = read(RecordKind::Condition)?;
    let medications = read(RecordKind::Medication)?;
    let observations = read(RecordKind::Observation)?;
    let encounters = read(RecordKind::Encounter)?;

    let store = store_from_json_strs(CollectionSources {
        patients: &patients,
        conditions: &conditions,
        medications: &medications,
        observations: &observations,
        encounters: &encounters,
    })?;
    Ok(store)
}

fn print_overview(analytics: &CohortAnalytics) {
    let overview = &analytics.overview;
    println!(
        "{} patients • {} conditions • {} meds • {} observations • {} encounters",
        overview.patients,
        overview.conditions,
        overview.medications,
        overview.observations,
        overview.encounters
    );

    for (title, buckets) in [
        ("Patients by city", &analytics.by_city),
        ("Patients by primary condition", &analytics.by_primary_condition),
        ("Encounters by type", &analytics.by_encounter_type),
    ] {
        println!("\n{title}");
        for bucket in buckets {
            println!("  {:<32} {}", bucket.key, bucket.count);
        }
    }
}

fn print_patient(view: &PatientView<'_>) {
    let Some(patient) = view.patient else {
        println!("Select a patient");
        return;
    };

    let risk = view
        .risk
        .map(|r| format!("{} (score {})", r.label.badge_text(), r.score))
        .unwrap_or_default();
    println!("{}  [{risk}]", patient.full_name());
    println!(
        "ID: {} • {} • Age {} • DOB: {}",
        patient.patient_id, patient.gender, patient.age, patient.birth_date
    );
    println!(
        "Chronic conditions: {} • Active medications: {} • Encounters: {}",
        view.counts.chronic_conditions, view.counts.active_medications, view.counts.encounters
    );

    println!("\nKey latest values");
    for reading in &view.latest {
        match reading.observation {
            Some(o) => println!(
                "  {:<20} {} {} ({}){}",
                reading.observation_type,
                o.value,
                o.unit,
                o.observation_date,
                if o.is_out_of_range() { "  out of range" } else { "" }
            ),
            None => println!("  {:<20} Not available", reading.observation_type),
        }
    }

    println!("\nBlood pressure trend");
    if view.bp_trend.is_empty() {
        println!("  No blood pressure readings.");
    }
    for point in &view.bp_trend {
        println!(
            "  {}  {}/{}",
            point.date,
            point.sbp.map(|v| v.to_string()).unwrap_or_else(|| "–".to_string()),
            point.dbp.map(|v| v.to_string()).unwrap_or_else(|| "–".to_string())
        );
    }

    println!("\nEncounters (most recent first)");
    for encounter in &view.encounters_recent_first {
        let readmission = if encounter.readmitted() {
            "  30-day readmission"
        } else {
            ""
        };
        println!(
            "  {}  {} – {}  LOS {} days  ${}{readmission}",
            encounter.encounter_date,
            encounter.encounter_type,
            encounter.department,
            encounter.length_of_stay_days,
            encounter.total_cost_usd
        );
    }
}
