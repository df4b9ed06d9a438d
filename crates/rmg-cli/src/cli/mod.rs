mod commands;
mod helpers;

use clap::Parser;
use rmg_core::domain::RmgError;

pub fn run_from_env() -> i32 {
    helpers::init_tracing();
    let args: Vec<String> = std::env::args().skip(1).collect();

    match run(args) {
        Ok(code) => code,
        Err(error) => {
            let compatibility_error = error.as_rmg_error();
            eprintln!("{}", compatibility_error.diagnostic_line());
            eprintln!("{}", compatibility_error.fatal_exit_line());
            compatibility_error.exit_code()
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once("rmg-rs".to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();
    parse_and_dispatch(full_args)
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => dispatch_parsed(cli.command),
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

#[derive(Parser)]
#[command(
    name = "rmg-rs",
    version,
    about = "Quantum-chemistry log reader and ML thermochemistry estimator"
)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Summarize one electronic-structure log as JSON
    Log(commands::LogArgs),
    /// Summarize every matching log in a directory
    Logs(commands::LogsArgs),
    /// Estimate thermochemistry for a SMILES string
    Thermo(commands::ThermoArgs),
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Log(args) => commands::run_log_command(args),
        CliCommand::Logs(args) => commands::run_logs_command(args),
        CliCommand::Thermo(args) => commands::run_thermo_command(args),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Compute(RmgError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    fn as_rmg_error(&self) -> RmgError {
        match self {
            Self::Usage(message) => RmgError::input_validation("INPUT.CLI_USAGE", message.clone()),
            Self::Compute(error) => error.clone(),
            Self::Internal(error) => RmgError::io_system("IO.CLI", format!("{error:#}")),
        }
    }
}

impl From<RmgError> for CliError {
    fn from(error: RmgError) -> Self {
        Self::Compute(error)
    }
}

impl From<rmg_core::ess::LogError> for CliError {
    fn from(error: rmg_core::ess::LogError) -> Self {
        Self::Compute(error.into())
    }
}

impl From<rmg_core::ml::EstimatorError> for CliError {
    fn from(error: rmg_core::ml::EstimatorError) -> Self {
        Self::Compute(error.into())
    }
}

impl From<rmg_core::thermo::ThermoError> for CliError {
    fn from(error: rmg_core::thermo::ThermoError) -> Self {
        Self::Compute(error.into())
    }
}
