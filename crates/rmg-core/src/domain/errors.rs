use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure classes, each mapped to a process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RmgErrorCategory {
    InputValidationError,
    IoSystemError,
    ComputationError,
    InternalError,
    LogError,
}

impl RmgErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::InputValidationError => 2,
            Self::IoSystemError => 3,
            Self::ComputationError => 4,
            Self::InternalError => 5,
            Self::LogError => 6,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::InputValidationError => "InputValidationError",
            Self::IoSystemError => "IoSystemError",
            Self::ComputationError => "ComputationError",
            Self::InternalError => "InternalError",
            Self::LogError => "LogError",
        }
    }
}

/// Workspace-level error carried to the CLI boundary.
///
/// `placeholder` is a stable dotted token (`LOG.PARSE`, `ML.UNKNOWN_MODEL`, ...)
/// that scripts can match on without parsing the free-form message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RmgError {
    category: RmgErrorCategory,
    placeholder: &'static str,
    message: String,
}

impl RmgError {
    pub fn new(
        category: RmgErrorCategory,
        placeholder: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            placeholder,
            message: message.into(),
        }
    }

    pub fn input_validation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(RmgErrorCategory::InputValidationError, placeholder, message)
    }

    pub fn io_system(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(RmgErrorCategory::IoSystemError, placeholder, message)
    }

    pub fn computation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(RmgErrorCategory::ComputationError, placeholder, message)
    }

    pub fn log(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(RmgErrorCategory::LogError, placeholder, message)
    }

    pub const fn category(&self) -> RmgErrorCategory {
        self.category
    }

    pub const fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        format!("ERROR: [{}] {}", self.placeholder, self.message)
    }

    pub fn fatal_exit_line(&self) -> String {
        format!("FATAL EXIT CODE: {}", self.exit_code())
    }
}

impl Display for RmgError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.category.name(),
            self.placeholder,
            self.message
        )
    }
}

impl Error for RmgError {}

#[cfg(test)]
mod tests {
    use super::{RmgError, RmgErrorCategory};

    #[test]
    fn exit_codes_are_stable() {
        let cases = [
            (RmgErrorCategory::InputValidationError, 2),
            (RmgErrorCategory::IoSystemError, 3),
            (RmgErrorCategory::ComputationError, 4),
            (RmgErrorCategory::InternalError, 5),
            (RmgErrorCategory::LogError, 6),
        ];

        for (category, exit_code) in cases {
            assert_eq!(category.exit_code(), exit_code);
        }
    }

    #[test]
    fn log_error_renders_diagnostic_and_exit_lines() {
        let error = RmgError::log(
            "LOG.REPORTED_FAILURE",
            "Psi4 job 'IO_error.out' errored: PSIO_ERROR",
        );

        assert_eq!(error.exit_code(), 6);
        assert_eq!(
            error.diagnostic_line(),
            "ERROR: [LOG.REPORTED_FAILURE] Psi4 job 'IO_error.out' errored: PSIO_ERROR"
        );
        assert_eq!(error.fatal_exit_line(), "FATAL EXIT CODE: 6");
        assert_eq!(
            error.to_string(),
            "LogError [LOG.REPORTED_FAILURE] Psi4 job 'IO_error.out' errored: PSIO_ERROR"
        );
    }
}
