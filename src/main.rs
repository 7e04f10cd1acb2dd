use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use confradar::config::Config;
use confradar::logging;
use confradar::replay;
use confradar::validation::{
    validate_price_phase, FormKind, PricePhase, SaleWindow, ValidationReport,
};

#[derive(Parser)]
#[command(name = "confradar")]
#[command(about = "Conference creation wizard core for ConfRadar")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a wizard action script (.json or .toml) and print the result
    Replay {
        /// Script file
        script: PathBuf,

        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check a ticket price phase against a sale window
    CheckPhase {
        /// Sale window start (YYYY-MM-DD)
        #[arg(long)]
        sale_start: NaiveDate,

        /// Sale window end (YYYY-MM-DD)
        #[arg(long)]
        sale_end: NaiveDate,

        /// Phase start (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,

        /// Phase length in days
        #[arg(long)]
        days: u32,

        /// Percentage of the base price charged
        #[arg(long, default_value_t = 100.0)]
        percentage: f64,

        /// Slots available in the phase
        #[arg(long, default_value_t = 1)]
        slots: u32,
    },

    /// Validate a JSON object against a form's rule table
    Validate {
        /// Form name (category, publisher, user, room, destination)
        form: FormKind,

        /// JSON file holding the form values
        file: PathBuf,
    },

    /// Print the effective configuration as TOML
    Config {
        /// Also write it to the user config file
        #[arg(long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (needed for logging setup)
    let config = Config::load(cli.config.as_deref())?;
    let _logging_handle = logging::init_logging(&config, cli.debug)?;

    match cli.command {
        Commands::Replay { script, output } => cmd_replay(&config, &script, output).await,
        Commands::CheckPhase {
            sale_start,
            sale_end,
            start,
            days,
            percentage,
            slots,
        } => {
            let window = SaleWindow::new(sale_start, sale_end);
            let phase = PricePhase {
                name: "Phase".to_string(),
                start_date: start,
                duration_in_days: days,
                price_percentage: percentage,
                slots,
            };
            let report =
                validate_price_phase(&window, &[], &phase, &config.validation.date_format);
            finish(&report)
        }
        Commands::Validate { form, file } => cmd_validate(form, &file),
        Commands::Config { save } => cmd_config(&config, save),
    }
}

async fn cmd_replay(
    config: &Config,
    script: &std::path::Path,
    output: Option<PathBuf>,
) -> Result<()> {
    let script = replay::load_script(script)?;
    let report = replay::run_script(script, config).await;
    let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;

    match output {
        Some(path) => {
            std::fs::write(&path, json)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            println!("Report written to {}", path.display());
        }
        None => println!("{json}"),
    }

    if report.failures() > 0 {
        eprintln!("{} action(s) failed", report.failures());
    }
    Ok(())
}

fn cmd_validate(form: FormKind, file: &std::path::Path) -> Result<()> {
    let contents = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let values: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(&contents).context("Form values must be a JSON object")?;

    let report = form.rules().validate(&values);
    finish(&report)
}

fn cmd_config(config: &Config, save: bool) -> Result<()> {
    let toml_str = toml::to_string_pretty(config).context("Failed to serialize config")?;
    println!("{toml_str}");

    if save {
        let path = Config::user_config_path().context("No user config directory available")?;
        config.save_to(&path)?;
        println!("Saved to {}", path.display());
    }
    Ok(())
}

/// Print a validation report. A failed report becomes an error so `main`
/// exits non-zero after the logging guard has flushed.
fn finish(report: &ValidationReport) -> Result<()> {
    if report.is_valid() {
        println!("OK");
        return Ok(());
    }

    for error in &report.errors {
        eprintln!("{}: {}", error.field, error.message);
    }
    bail!("validation failed for {} field(s)", report.errors.len())
}
