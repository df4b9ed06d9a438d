use super::CliError;
use anyhow::Context;
use globset::{Glob, GlobMatcher};
use rmg_core::domain::{EssProgram, RmgError};
use rmg_core::ess::{LogError, ess_factory};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use tracing::debug;

pub(super) const DEFAULT_LOG_PATTERNS: [&str; 2] = ["*.out", "*.log"];

/// `RUST_LOG` filtering, `warn` when unset, written to stderr so stdout
/// stays machine-readable.
pub(super) fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[derive(Debug, Serialize)]
pub(super) struct LogSummary {
    pub(super) path: PathBuf,
    pub(super) program: EssProgram,
    pub(super) atoms: usize,
    pub(super) symbols: Vec<String>,
    pub(super) spin_multiplicity: u32,
    pub(super) energy_j_per_mol: f64,
    pub(super) zero_point_energy_j_per_mol: Option<f64>,
    pub(super) frequencies_cm1: Option<Vec<f64>>,
    pub(super) negative_frequency_cm1: Option<f64>,
}

#[derive(Debug, Serialize)]
pub(super) struct BatchEntry {
    pub(super) path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) summary: Option<LogSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) error: Option<ErrorReport>,
}

#[derive(Debug, Serialize)]
pub(super) struct ErrorReport {
    pub(super) category: &'static str,
    pub(super) placeholder: &'static str,
    pub(super) message: String,
}

impl From<&RmgError> for ErrorReport {
    fn from(error: &RmgError) -> Self {
        Self {
            category: error.category().name(),
            placeholder: error.placeholder(),
            message: error.message().to_string(),
        }
    }
}

/// Sections a job did not produce are reported as absent; anything else
/// aborts the summary. Saddle points of higher order carry no single
/// negative frequency.
pub(super) fn summarize_log(path: &Path) -> Result<LogSummary, LogError> {
    let log = ess_factory(path)?;
    let geometry = log.load_geometry()?;
    let frequencies = optional_section(log.load_frequencies())?;
    let negative_frequency = match &frequencies {
        Some(values) if values.iter().any(|value| *value < 0.0) => {
            match log.load_negative_frequency() {
                Ok(value) => Some(value),
                Err(LogError::MultipleNegativeFrequencies { .. }) => None,
                Err(error) => return Err(error),
            }
        }
        _ => None,
    };

    Ok(LogSummary {
        path: path.to_path_buf(),
        program: log.program(),
        atoms: geometry.len(),
        symbols: geometry.symbols.clone(),
        spin_multiplicity: log.load_spin_multiplicity()?,
        energy_j_per_mol: log.load_energy()?,
        zero_point_energy_j_per_mol: optional_section(log.load_zero_point_energy())?,
        frequencies_cm1: frequencies,
        negative_frequency_cm1: negative_frequency,
    })
}

fn optional_section<T>(result: Result<T, LogError>) -> Result<Option<T>, LogError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(LogError::MissingSection { .. }) => Ok(None),
        Err(error) => Err(error),
    }
}

pub(super) fn compile_patterns(patterns: &[String]) -> Result<Vec<GlobMatcher>, CliError> {
    let patterns: Vec<&str> = if patterns.is_empty() {
        DEFAULT_LOG_PATTERNS.to_vec()
    } else {
        patterns.iter().map(String::as_str).collect()
    };
    patterns
        .into_iter()
        .map(|pattern| {
            Glob::new(pattern)
                .map(|glob| glob.compile_matcher())
                .map_err(|source| {
                    CliError::Compute(RmgError::input_validation(
                        "INPUT.CLI_PATTERN",
                        format!("invalid glob pattern '{pattern}': {source}"),
                    ))
                })
        })
        .collect()
}

/// Regular files directly inside `directory` whose names match any pattern,
/// sorted by path.
pub(super) fn collect_log_files(
    directory: &Path,
    matchers: &[GlobMatcher],
) -> Result<Vec<PathBuf>, CliError> {
    let entries = fs::read_dir(directory)
        .with_context(|| format!("failed to list log directory '{}'", directory.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry
            .with_context(|| format!("failed to read entry in '{}'", directory.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name() else {
            continue;
        };
        if matchers.iter().any(|matcher| matcher.is_match(name)) {
            files.push(path);
        }
    }
    files.sort();
    debug!(directory = %directory.display(), count = files.len(), "collected log files");
    Ok(files)
}

pub(super) fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let rendered =
        serde_json::to_string_pretty(value).context("failed to render JSON output")?;
    println!("{rendered}");
    Ok(())
}
