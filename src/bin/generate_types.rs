//! Export TypeScript bindings and JSON schemas for the wizard wire types.
//!
//! Run with: cargo run --bin generate_types -- --out bindings

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use schemars::schema_for;
use ts_rs::TS;

use confradar::replay::WizardScript;
use confradar::validation::{FieldError, PricePhase, SaleWindow, ValidationReport};
use confradar::wizard::{
    ConferenceKind, DeleteCategory, DraftLists, LoadedConference, SaveAllRequest,
    StepSaveRequest, StepSaveResponse, WizardMode, WizardState,
};

#[derive(Parser)]
#[command(name = "generate_types")]
struct Args {
    /// Output directory; `ts/` and `schema/` are created beneath it
    #[arg(short, long, default_value = "bindings")]
    out: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let ts_dir = args.out.join("ts");
    let schema_dir = args.out.join("schema");
    fs::create_dir_all(&ts_dir)
        .with_context(|| format!("Failed to create {}", ts_dir.display()))?;
    fs::create_dir_all(&schema_dir)
        .with_context(|| format!("Failed to create {}", schema_dir.display()))?;

    // export_all_to also writes every type these depend on
    WizardState::export_all_to(&ts_dir)?;
    WizardMode::export_all_to(&ts_dir)?;
    ConferenceKind::export_all_to(&ts_dir)?;
    DeleteCategory::export_all_to(&ts_dir)?;
    StepSaveRequest::export_all_to(&ts_dir)?;
    StepSaveResponse::export_all_to(&ts_dir)?;
    SaveAllRequest::export_all_to(&ts_dir)?;
    LoadedConference::export_all_to(&ts_dir)?;
    DraftLists::export_all_to(&ts_dir)?;
    FieldError::export_all_to(&ts_dir)?;
    ValidationReport::export_all_to(&ts_dir)?;
    PricePhase::export_all_to(&ts_dir)?;
    SaleWindow::export_all_to(&ts_dir)?;
    println!("TypeScript bindings written to {}", ts_dir.display());

    write_schema(&schema_dir, "WizardState", &schema_for!(WizardState))?;
    write_schema(&schema_dir, "StepSaveRequest", &schema_for!(StepSaveRequest))?;
    write_schema(&schema_dir, "SaveAllRequest", &schema_for!(SaveAllRequest))?;
    write_schema(&schema_dir, "LoadedConference", &schema_for!(LoadedConference))?;
    write_schema(&schema_dir, "ValidationReport", &schema_for!(ValidationReport))?;
    write_schema(&schema_dir, "PricePhase", &schema_for!(PricePhase))?;
    write_schema(&schema_dir, "WizardScript", &schema_for!(WizardScript))?;
    println!("JSON schemas written to {}", schema_dir.display());

    Ok(())
}

fn write_schema(dir: &Path, name: &str, schema: &schemars::Schema) -> Result<()> {
    let path = dir.join(format!("{name}.schema.json"));
    let json = serde_json::to_string_pretty(schema)?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
