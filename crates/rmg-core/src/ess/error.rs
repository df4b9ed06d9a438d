use crate::domain::{EssProgram, RmgError};
use crate::numerics::LinalgError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("failed to read log '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{program} job '{}' errored at line {line}: {reason}", path.display())]
    ReportedFailure {
        program: EssProgram,
        path: PathBuf,
        line: usize,
        reason: String,
    },
    #[error("could not identify the program that wrote '{}'", path.display())]
    UnsupportedProgram { path: PathBuf },
    #[error("log has no {section} section")]
    MissingSection { section: &'static str },
    #[error("malformed {section} at line {line}: {details}")]
    Parse {
        section: &'static str,
        line: usize,
        details: String,
    },
    #[error("{section} has dimension {actual}, expected {expected}")]
    DimensionMismatch {
        section: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("unable to find an imaginary frequency in the vibrational analysis")]
    NoNegativeFrequency,
    #[error("expected exactly one imaginary frequency, found {count}")]
    MultipleNegativeFrequencies { count: usize },
    #[error("geometry analysis failed: {0}")]
    Numerics(#[from] LinalgError),
}

impl LogError {
    pub fn placeholder(&self) -> &'static str {
        match self {
            Self::Io { .. } => "IO.LOG_READ",
            Self::ReportedFailure { .. } => "LOG.REPORTED_FAILURE",
            Self::UnsupportedProgram { .. } => "INPUT.LOG_PROGRAM",
            Self::MissingSection { .. } | Self::Parse { .. } | Self::DimensionMismatch { .. } => {
                "LOG.PARSE"
            }
            Self::NoNegativeFrequency | Self::MultipleNegativeFrequencies { .. } => {
                "LOG.NEGATIVE_FREQUENCY"
            }
            Self::Numerics(_) => "RUN.GEOMETRY",
        }
    }
}

impl From<LogError> for RmgError {
    fn from(error: LogError) -> Self {
        let placeholder = error.placeholder();
        let message = error.to_string();
        match error {
            LogError::Io { .. } => RmgError::io_system(placeholder, message),
            LogError::UnsupportedProgram { .. } => {
                RmgError::input_validation(placeholder, message)
            }
            LogError::Numerics(_) => RmgError::computation(placeholder, message),
            _ => RmgError::log(placeholder, message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::LogError;
    use crate::domain::{EssProgram, RmgError, RmgErrorCategory};
    use std::path::PathBuf;

    #[test]
    fn reported_failures_map_to_log_category() {
        let error = LogError::ReportedFailure {
            program: EssProgram::Psi4,
            path: PathBuf::from("IO_error.out"),
            line: 42,
            reason: "PSIO_ERROR: 13 (error writing to file)".to_string(),
        };
        let converted = RmgError::from(error);
        assert_eq!(converted.category(), RmgErrorCategory::LogError);
        assert_eq!(converted.placeholder(), "LOG.REPORTED_FAILURE");
        assert_eq!(
            converted.message(),
            "Psi4 job 'IO_error.out' errored at line 42: PSIO_ERROR: 13 (error writing to file)"
        );
    }

    #[test]
    fn io_and_program_errors_use_their_own_categories() {
        let io = LogError::Io {
            path: PathBuf::from("missing.out"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(RmgError::from(io).exit_code(), 3);

        let unsupported = LogError::UnsupportedProgram {
            path: PathBuf::from("gaussian.log"),
        };
        assert_eq!(RmgError::from(unsupported).exit_code(), 2);

        assert_eq!(
            RmgError::from(LogError::MultipleNegativeFrequencies { count: 2 }).placeholder(),
            "LOG.NEGATIVE_FREQUENCY"
        );
    }
}
