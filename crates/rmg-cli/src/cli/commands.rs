use super::CliError;
use super::helpers::*;
use rmg_core::domain::RmgError;
use rmg_core::ml::{EstimatorConfig, InputMode, MlEstimator};
use rmg_core::thermo::{ThermoData, Wilhoit};
use serde::Serialize;
use std::path::PathBuf;
use tracing::warn;

#[derive(clap::Args)]
pub(super) struct LogArgs {
    /// Log file written by a supported quantum-chemistry program
    #[arg(value_name = "PATH")]
    path: PathBuf,
}

#[derive(clap::Args)]
pub(super) struct LogsArgs {
    /// Directory holding the logs
    #[arg(value_name = "DIR")]
    directory: PathBuf,

    /// File-name glob; repeatable (default: *.out and *.log)
    #[arg(long = "pattern", value_name = "GLOB")]
    patterns: Vec<String>,
}

#[derive(clap::Args)]
pub(super) struct ThermoArgs {
    /// Molecule as a SMILES string
    #[arg(value_name = "SMILES")]
    smiles: String,

    /// Model identifier, resolved as <model-dir>/<NAME>.json
    #[arg(long, value_name = "NAME", default_value = "attn_mpn")]
    model: String,

    /// Input path into the model: from_smiles or from_rdkit_mol
    #[arg(long, value_name = "MODE", default_value = "from_smiles")]
    mode: InputMode,

    /// Model directory (overrides RMG_ML_MODEL_DIR)
    #[arg(long, value_name = "DIR")]
    model_dir: Option<PathBuf>,

    /// Also fit a Wilhoit polynomial with this scale temperature, K
    #[arg(long, value_name = "K")]
    wilhoit_b: Option<f64>,
}

#[derive(Serialize)]
struct ThermoReport<'a> {
    smiles: &'a str,
    model: &'a str,
    mode: InputMode,
    thermo: ThermoData,
    #[serde(skip_serializing_if = "Option::is_none")]
    wilhoit: Option<Wilhoit>,
}

pub(super) fn run_log_command(args: LogArgs) -> Result<i32, CliError> {
    let summary = summarize_log(&args.path)?;
    print_json(&summary)?;
    Ok(0)
}

/// Failures are reported per file. The exit status is that of the first
/// failing log, or zero.
pub(super) fn run_logs_command(args: LogsArgs) -> Result<i32, CliError> {
    let matchers = compile_patterns(&args.patterns)?;
    let files = collect_log_files(&args.directory, &matchers)?;
    if files.is_empty() {
        return Err(CliError::Compute(RmgError::input_validation(
            "INPUT.CLI_LOGS",
            format!("no log files matched in '{}'", args.directory.display()),
        )));
    }

    let mut exit_code = 0;
    let mut entries = Vec::with_capacity(files.len());
    for path in files {
        match summarize_log(&path) {
            Ok(summary) => entries.push(BatchEntry {
                path,
                summary: Some(summary),
                error: None,
            }),
            Err(error) => {
                let error = RmgError::from(error);
                warn!(path = %path.display(), "{}", error.message());
                if exit_code == 0 {
                    exit_code = error.exit_code();
                }
                entries.push(BatchEntry {
                    path,
                    summary: None,
                    error: Some(ErrorReport::from(&error)),
                });
            }
        }
    }
    print_json(&entries)?;
    Ok(exit_code)
}

pub(super) fn run_thermo_command(args: ThermoArgs) -> Result<i32, CliError> {
    let mut config = EstimatorConfig::from_env();
    if let Some(model_dir) = args.model_dir {
        config = config.with_model_dir(model_dir);
    }
    let estimator = MlEstimator::with_config(&args.model, &config)?;
    let thermo = estimator.get_thermo_data(&args.smiles, args.mode)?;
    let wilhoit = args.wilhoit_b.map(|b| thermo.to_wilhoit(b)).transpose()?;

    print_json(&ThermoReport {
        smiles: &args.smiles,
        model: estimator.name(),
        mode: args.mode,
        thermo,
        wilhoit,
    })?;
    Ok(0)
}
