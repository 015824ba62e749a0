use crate::report::Severity;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Everything that can stop a check before it reaches a verdict.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("IBM Spectrum Scale is not installed: {} not found", .0.display())]
    ToolMissing(PathBuf),

    #[error("{command} failed: {reason}")]
    CommandFailed { command: String, reason: String },

    #[error("external command timed out after {}s: {command}", .timeout.as_secs())]
    CommandTimedOut { command: String, timeout: Duration },

    #[error("field not found in command output: {0}")]
    FieldNotFound(String),

    #[error("row {row} has no column {index}")]
    MissingColumn { row: usize, index: usize },

    #[error("invalid value {value:?} for field {field}")]
    InvalidValue { field: String, value: String },

    #[error("no parameters given: {0}")]
    NoParameters(String),

    #[error("invalid threshold {0}: percentages must be within 0..=100")]
    InvalidThreshold(f64),

    #[error("configuration error: {0:#}")]
    Config(anyhow::Error),
}

impl CheckError {
    /// Status reported to the monitoring host for this failure.
    pub fn severity(&self) -> Severity {
        match self {
            CheckError::ToolMissing(_)
            | CheckError::CommandFailed { .. }
            | CheckError::CommandTimedOut { .. } => Severity::Critical,
            CheckError::FieldNotFound(_)
            | CheckError::MissingColumn { .. }
            | CheckError::InvalidValue { .. }
            | CheckError::NoParameters(_)
            | CheckError::InvalidThreshold(_)
            | CheckError::Config(_) => Severity::Unknown,
        }
    }

    pub fn invalid(field: &str, value: &str) -> Self {
        CheckError::InvalidValue { field: field.to_string(), value: value.to_string() }
    }
}
