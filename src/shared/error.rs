use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application.
///
/// These codes allow CI systems to tell a boundary violation apart from
/// a broken configuration or an infrastructure failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// No findings
    Success = 0,
    /// At least one finding was reported, or the allow-list graph is cyclic
    ViolationsFound = 1,
    /// Invalid command-line arguments (clap parsing errors)
    InvalidArguments = 2,
    /// Application error (configuration error, file I/O error, etc.)
    ApplicationError = 3,
}

impl ExitCode {
    /// Convert to i32 for use with std::process::exit
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Maps an error returned by the check run to its exit code
    pub fn for_error(error: &anyhow::Error) -> Self {
        match error.downcast_ref::<FenceError>() {
            Some(FenceError::PolicyCycle { .. }) | Some(FenceError::BoundaryViolations { .. }) => {
                ExitCode::ViolationsFound
            }
            _ => ExitCode::ApplicationError,
        }
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitCode::Success => write!(f, "Success (0)"),
            ExitCode::ViolationsFound => write!(f, "Violations Found (1)"),
            ExitCode::InvalidArguments => write!(f, "Invalid Arguments (2)"),
            ExitCode::ApplicationError => write!(f, "Application Error (3)"),
        }
    }
}

/// Application-specific errors for boundary checking.
///
/// Configuration errors abort a run immediately. Findings are collected
/// instead and only surface as `BoundaryViolations` once a run is complete.
#[derive(Debug, Error)]
pub enum FenceError {
    #[error("Package '{package}' not found under any source root\nSearched: {searched}\n\n💡 Hint: Check analysis_packages and source_paths in your configuration")]
    PackageNotFound { package: String, searched: String },

    #[error("Invalid source path: {path}\nReason: {reason}\n\n💡 Hint: Every entry in source_paths must be an existing directory")]
    InvalidSourcePath { path: PathBuf, reason: String },

    #[error("Failed to parse package manifest: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the manifest is valid TOML")]
    ManifestParseError { path: PathBuf, details: String },

    #[error("Found cyclic dependency in {policies}\nPackages in cycle: {members}")]
    PolicyCycle { policies: String, members: String },

    #[error("{report}")]
    BoundaryViolations { report: String },

    #[error("Failed to write to file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the directory exists and you have write permissions")]
    FileWriteError { path: PathBuf, details: String },

    #[error("Invalid project path: {path}\nReason: {reason}\n\n💡 Hint: Please specify a valid project directory")]
    InvalidProjectPath { path: PathBuf, reason: String },

    #[error("Failed to read file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the file exists and you have read permissions")]
    FileReadError { path: PathBuf, details: String },

    #[error("Security violation: {path}\nReason: {reason}\n\n💡 Hint: {hint}")]
    SecurityError {
        path: PathBuf,
        reason: String,
        hint: String,
    },
}
