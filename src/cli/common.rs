//! Shared CLI error handling and exit codes.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::error::ConfiguratorError;
use crate::services::catalog::{load_catalog, Catalog, JsonFileCatalog};
use crate::services::persistence::PersistenceClient;

/// Process exit codes for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Command completed
    Success = 0,
    /// Invalid input or rejected operation
    Validation = 1,
    /// File system or serialization failure
    Io = 2,
    /// Product or configuration does not exist
    NotFound = 3,
}

impl ExitCode {
    /// Numeric code passed to `std::process::exit`.
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }
}

/// Error returned by CLI command handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliError {
    /// Exit code to terminate with
    pub exit_code: ExitCode,
    /// Message printed to stderr
    pub message: String,
}

/// Result type for CLI command handlers.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Invalid input or rejected operation.
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            exit_code: ExitCode::Validation,
            message: message.into(),
        }
    }

    /// File system or serialization failure.
    pub fn io(message: impl Into<String>) -> Self {
        Self {
            exit_code: ExitCode::Io,
            message: message.into(),
        }
    }

    /// Missing product or configuration.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            exit_code: ExitCode::NotFound,
            message: message.into(),
        }
    }

    /// Maps a service error, keeping domain rejections distinct from I/O.
    ///
    /// `context` prefixes the message for failures that are not
    /// [`ConfiguratorError`]s.
    pub fn from_service(context: &str, error: &anyhow::Error) -> Self {
        match error.downcast_ref::<ConfiguratorError>() {
            Some(domain) => domain.into(),
            None => Self::io(format!("{context}: {error:#}")),
        }
    }
}

impl From<&ConfiguratorError> for CliError {
    fn from(error: &ConfiguratorError) -> Self {
        match error {
            ConfiguratorError::NotFound { .. } => Self::not_found(error.to_string()),
            _ => Self::validation(error.to_string()),
        }
    }
}

impl From<ConfiguratorError> for CliError {
    fn from(error: ConfiguratorError) -> Self {
        Self::from(&error)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CliError {}

/// Loads persisted settings, falling back to defaults when none exist.
pub fn load_settings() -> CliResult<Settings> {
    Settings::load().map_err(|e| CliError::io(format!("Failed to load settings: {e:#}")))
}

/// Loads the catalog from `path`, or from the configured catalog file.
pub fn open_catalog(path: Option<&Path>, settings: &Settings) -> CliResult<Catalog> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => settings
            .catalog_path()
            .map_err(|e| CliError::io(format!("Failed to resolve catalog path: {e:#}")))?,
    };

    load_catalog(&JsonFileCatalog::new(path))
        .map_err(|e| CliError::io(format!("Failed to load catalog: {e:#}")))
}

/// Opens the saved configuration store in `dir`, or the configured directory.
pub fn open_persistence(dir: Option<&Path>, settings: &Settings) -> CliResult<PersistenceClient> {
    let dir: PathBuf = match dir {
        Some(dir) => dir.to_path_buf(),
        None => settings.configurations_dir().map_err(|e| {
            CliError::io(format!("Failed to resolve configurations directory: {e:#}"))
        })?,
    };
    Ok(PersistenceClient::from_dir(dir))
}

/// Prints `value` as compact JSON on stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> CliResult<()> {
    let json = serde_json::to_string(value)
        .map_err(|e| CliError::io(format!("Failed to serialize JSON: {e}")))?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(ExitCode::Success.code(), 0);
        assert_eq!(CliError::validation("x").exit_code.code(), 1);
        assert_eq!(CliError::io("x").exit_code.code(), 2);
        assert_eq!(CliError::not_found("x").exit_code.code(), 3);
    }

    #[test]
    fn test_from_service_downcasts_domain_errors() {
        let missing: anyhow::Error = ConfiguratorError::product_not_found("X").into();
        assert_eq!(
            CliError::from_service("Failed", &missing).exit_code,
            ExitCode::NotFound
        );

        let limit: anyhow::Error = ConfiguratorError::LimitExceeded { max: 2 }.into();
        assert_eq!(
            CliError::from_service("Failed", &limit).exit_code,
            ExitCode::Validation
        );

        let io = anyhow::anyhow!("disk full");
        let error = CliError::from_service("Failed to save", &io);
        assert_eq!(error.exit_code, ExitCode::Io);
        assert_eq!(error.message, "Failed to save: disk full");
    }
}
