//! Diabetes Risk Prediction - Main Entry Point
//!
//! Batch mode scores an uploaded CSV with every available model and ranks the
//! models by mean predicted risk; predict mode scores one patient with one
//! chosen model.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use diabetes_risk::{
    config::{AppConfig, LoggingConfig},
    dashboard,
    features::FIELD_BOUNDS,
    input,
    models::{ModelRegistry, SinglePredictor},
    BatchPipeline, ModelName, PatientRecord,
};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(
    name = "diabetes-risk",
    version,
    about = "Batch and individual diabetes risk prediction using pre-trained models"
)]
struct Cli {
    /// Configuration file (defaults to config/config.toml when present)
    #[arg(short, long, global = true, env = "DIABETES_RISK_CONFIG")]
    config: Option<PathBuf>,

    /// Override the models directory
    #[arg(long, global = true)]
    models_dir: Option<PathBuf>,

    /// Increase verbosity level (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Score every row of a CSV file with all available models and rank them
    Batch {
        /// Patient table with a header row
        file: PathBuf,

        /// Print the report as JSON instead of the dashboard view
        #[arg(long)]
        json: bool,

        /// Also write the JSON report to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Predict diabetes risk for one patient
    Predict(PredictArgs),

    /// Show which model artifacts are available
    Models,
}

#[derive(Debug, Args)]
struct PredictArgs {
    /// Model used for the prediction
    #[arg(long, value_enum, default_value_t = ModelName::Logistic)]
    model: ModelName,

    #[arg(long, default_value_t = FIELD_BOUNDS[0].default as u32, value_parser = int_field(0))]
    pregnancies: u32,

    #[arg(long, default_value_t = FIELD_BOUNDS[1].default as u32, value_parser = int_field(1))]
    glucose: u32,

    #[arg(long, default_value_t = FIELD_BOUNDS[2].default as u32, value_parser = int_field(2))]
    blood_pressure: u32,

    #[arg(long, default_value_t = FIELD_BOUNDS[3].default as u32, value_parser = int_field(3))]
    skin_thickness: u32,

    #[arg(long, default_value_t = FIELD_BOUNDS[4].default as u32, value_parser = int_field(4))]
    insulin: u32,

    #[arg(long, default_value_t = FIELD_BOUNDS[5].default, value_parser = float_field(5))]
    bmi: f64,

    #[arg(long, default_value_t = FIELD_BOUNDS[6].default, value_parser = float_field(6))]
    diabetes_pedigree_function: f64,

    #[arg(long, default_value_t = FIELD_BOUNDS[7].default as u32, value_parser = int_field(7))]
    age: u32,

    /// Print the prediction as JSON
    #[arg(long)]
    json: bool,
}

impl PredictArgs {
    fn record(&self) -> PatientRecord {
        PatientRecord {
            pregnancies: self.pregnancies,
            glucose: self.glucose,
            blood_pressure: self.blood_pressure,
            skin_thickness: self.skin_thickness,
            insulin: self.insulin,
            bmi: self.bmi,
            diabetes_pedigree_function: self.diabetes_pedigree_function,
            age: self.age,
        }
    }
}

/// Parse a form value and reject it outside the field's declared range.
fn parse_bounded(raw: &str, index: usize) -> Result<f64, String> {
    let bounds = &FIELD_BOUNDS[index];
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{raw}' is not a number"))?;
    if bounds.integer && value.fract() != 0.0 {
        return Err(format!("{} must be a whole number", bounds.name));
    }
    if !bounds.contains(value) {
        return Err(format!(
            "{} must be between {} and {}",
            bounds.name, bounds.min, bounds.max
        ));
    }
    Ok(value)
}

fn int_field(index: usize) -> impl Fn(&str) -> Result<u32, String> + Clone + Send + Sync + 'static {
    move |raw| parse_bounded(raw, index).map(|v| v as u32)
}

fn float_field(index: usize) -> impl Fn(&str) -> Result<f64, String> + Clone + Send + Sync + 'static {
    move |raw| parse_bounded(raw, index)
}

fn init_logging(config: &LoggingConfig, verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => config.level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(format!("diabetes_risk={level}")))
        .context("Invalid log filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    if config.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    if let Some(dir) = &cli.models_dir {
        config.models.models_dir = dir.clone();
    }

    init_logging(&config.logging, cli.verbose)?;
    info!(models_dir = %config.models.models_dir.display(), "Configuration loaded");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let stderr = io::stderr();
    let mut err = stderr.lock();

    match cli.command {
        Command::Batch { file, json, output } => {
            run_batch(&config, &file, json, output, &mut out, &mut err)
        }
        Command::Predict(args) => run_predict(&config, &args, &mut out, &mut err),
        Command::Models => {
            let registry = ModelRegistry::from_config(&config.models);
            dashboard::render_model_status(&mut out, &registry)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Results go to `out`; user-facing errors go to `err`.
fn run_batch<W: Write, E: Write>(
    config: &AppConfig,
    file: &Path,
    json: bool,
    output: Option<PathBuf>,
    out: &mut W,
    err: &mut E,
) -> Result<ExitCode> {
    let delimiter = config.dashboard.delimiter_byte()?;

    let table = match input::read_table_path(file, delimiter) {
        Ok(table) => table,
        Err(e) => {
            error!(file = %file.display(), error = %e, "Could not read upload");
            writeln!(err, "Error: {e}")?;
            return Ok(ExitCode::FAILURE);
        }
    };

    // The preview is shown even when validation then rejects the table
    if !json {
        dashboard::render_preview(out, &table.preview(config.dashboard.preview_rows))?;
    }

    let pipeline = BatchPipeline::from_config(config);
    let report = match pipeline.run(&table) {
        Ok(report) => report,
        Err(e) => {
            writeln!(err, "Error: {e}")?;
            return Ok(ExitCode::FAILURE);
        }
    };

    if json {
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
    } else {
        dashboard::render_results(out, &report)?;
    }

    if let Some(path) = output {
        let writer = BufWriter::new(
            File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?,
        );
        serde_json::to_writer_pretty(writer, &report)?;
        info!(report_id = %report.report_id, path = %path.display(), "Report written");
    }

    Ok(ExitCode::SUCCESS)
}

fn run_predict<W: Write, E: Write>(
    config: &AppConfig,
    args: &PredictArgs,
    out: &mut W,
    err: &mut E,
) -> Result<ExitCode> {
    let registry = ModelRegistry::from_config(&config.models);

    match SinglePredictor::new(&registry).predict(args.model, &args.record()) {
        Ok(prediction) => {
            if args.json {
                serde_json::to_writer_pretty(&mut *out, &prediction)?;
                writeln!(out)?;
            } else {
                dashboard::render_prediction(out, &prediction)?;
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!(model = %args.model, error = %e, "Prediction failed");
            writeln!(err, "Error: {e}")?;
            Ok(ExitCode::FAILURE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_predict_defaults_match_form() {
        let cli = Cli::parse_from(["diabetes-risk", "predict"]);
        let Command::Predict(args) = cli.command else {
            panic!("expected predict");
        };
        assert_eq!(args.record(), PatientRecord::default());
        assert_eq!(args.model, ModelName::Logistic);
    }

    #[test]
    fn test_out_of_range_rejected_at_input() {
        let result = Cli::try_parse_from(["diabetes-risk", "predict", "--glucose", "250"]);
        assert!(result.is_err());
        let result = Cli::try_parse_from(["diabetes-risk", "predict", "--bmi", "70.5"]);
        assert!(result.is_err());
        let result = Cli::try_parse_from(["diabetes-risk", "predict", "--age", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_model_choice() {
        let cli = Cli::parse_from(["diabetes-risk", "predict", "--model", "random-forest"]);
        let Command::Predict(args) = cli.command else {
            panic!("expected predict");
        };
        assert_eq!(args.model, ModelName::RandomForest);
    }

    #[test]
    fn test_config_flag_reads_environment() {
        let cmd = Cli::command();
        let config = cmd
            .get_arguments()
            .find(|arg| arg.get_id() == "config")
            .unwrap();
        assert_eq!(
            config.get_env(),
            Some(std::ffi::OsStr::new("DIABETES_RISK_CONFIG"))
        );
    }

    fn config_for(models_dir: &Path) -> AppConfig {
        let mut config = AppConfig::default();
        config.models.models_dir = models_dir.to_path_buf();
        config
    }

    #[test]
    fn test_rejected_table_still_previewed() {
        let tmp = tempfile::tempdir().unwrap();
        let csv = tmp.path().join("upload.csv");
        std::fs::write(&csv, "Glucose,Age\n148,50\n").unwrap();

        let (mut out, mut err) = (Vec::new(), Vec::new());
        let code = run_batch(&config_for(tmp.path()), &csv, false, None, &mut out, &mut err).unwrap();

        assert_eq!(code, ExitCode::FAILURE);
        let out = String::from_utf8(out).unwrap();
        let err = String::from_utf8(err).unwrap();
        assert!(out.contains("Uploaded Data Preview"));
        assert!(out.contains("148"));
        assert!(!out.contains("Error:"));
        assert!(err.starts_with("Error: Missing columns: Pregnancies, BloodPressure"));
    }

    #[test]
    fn test_json_output_stays_clean_on_error() {
        let tmp = tempfile::tempdir().unwrap();
        let csv = tmp.path().join("upload.csv");
        std::fs::write(
            &csv,
            "Pregnancies,Glucose,BloodPressure,SkinThickness,Insulin,BMI,DiabetesPedigreeFunction,Age\n\
             6,148,72,35,0,33.6,0.627,50\n",
        )
        .unwrap();

        let (mut out, mut err) = (Vec::new(), Vec::new());
        let code = run_batch(&config_for(tmp.path()), &csv, true, None, &mut out, &mut err).unwrap();

        assert_eq!(code, ExitCode::FAILURE);
        assert!(out.is_empty());
        assert_eq!(
            String::from_utf8(err).unwrap(),
            "Error: No valid models found for prediction\n"
        );
    }

    #[test]
    fn test_unavailable_model_reported_on_stderr() {
        let tmp = tempfile::tempdir().unwrap();
        let cli = Cli::parse_from(["diabetes-risk", "predict", "--model", "svm"]);
        let Command::Predict(args) = cli.command else {
            panic!("expected predict");
        };

        let (mut out, mut err) = (Vec::new(), Vec::new());
        let code = run_predict(&config_for(tmp.path()), &args, &mut out, &mut err).unwrap();

        assert_eq!(code, ExitCode::FAILURE);
        assert!(out.is_empty());
        assert!(String::from_utf8(err).unwrap().starts_with("Error: Model unavailable: svm"));
    }

    #[test]
    fn test_parse_bounded() {
        assert_eq!(parse_bounded("33.6", 5), Ok(33.6));
        assert!(parse_bounded("2.5", 0).is_err());
        assert!(parse_bounded("abc", 1).is_err());
    }
}
