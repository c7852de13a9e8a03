//! CLI-specific error types and exit code mapping

use sbomkit_core::error::{ModuleError, SbomkitError};
use sbomkit_pnpm::PnpmError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to standard Unix exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from sbomkit-core.
    #[error("{0}")]
    Core(#[from] SbomkitError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                                   |
    /// |------|-------------------------------------------|
    /// | 0    | Success                                   |
    /// | 1    | General / command error                   |
    /// | 2    | Configuration error                       |
    /// | 3    | Not a pnpm project / modules not installed |
    /// | 4    | Lockfile or module resolution failure     |
    /// | 10   | IO error                                  |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Core(SbomkitError::Config(_)) => 2,
            Self::Core(SbomkitError::Module(
                ModuleError::InvalidProject(_) | ModuleError::ModulesNotInstalled(_),
            )) => 3,
            Self::Core(SbomkitError::Module(_)) => 4,
            Self::Io(_) | Self::Core(SbomkitError::Io(_)) => 10,
            Self::JsonSerialize(_) | Self::Command(_) => 1,
        }
    }
}

impl From<PnpmError> for CliError {
    fn from(e: PnpmError) -> Self {
        Self::Core(e.into())
    }
}

impl From<tokio::task::JoinError> for CliError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::Command(format!("resolver task failed: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sbomkit_core::error::ConfigError;

    #[test]
    fn test_exit_code_config_error() {
        let err = CliError::Config("test error".to_owned());
        assert_eq!(err.exit_code(), 2, "config error should return exit code 2");
    }

    #[test]
    fn test_exit_code_core_config_error() {
        let err = CliError::Core(SbomkitError::Config(ConfigError::ParseFailed {
            reason: "bad toml".to_owned(),
        }));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_exit_code_invalid_project() {
        let err: CliError = PnpmError::InvalidProject {
            path: "/srv/app".to_owned(),
        }
        .into();
        assert_eq!(err.exit_code(), 3, "invalid project should return exit code 3");
    }

    #[test]
    fn test_exit_code_modules_not_installed() {
        let err: CliError = PnpmError::ModulesNotInstalled {
            path: "/srv/app/node_modules".to_owned(),
        }
        .into();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_exit_code_lockfile_error() {
        let err: CliError = PnpmError::LockfileParse {
            path: "pnpm-lock.yaml".to_owned(),
            reason: "missing lockfileVersion".to_owned(),
        }
        .into();
        assert_eq!(err.exit_code(), 4, "lockfile error should return exit code 4");
    }

    #[test]
    fn test_exit_code_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = CliError::Io(io_err);
        assert_eq!(err.exit_code(), 10, "io error should return exit code 10");
    }

    #[test]
    fn test_exit_code_pnpm_io_error() {
        let err: CliError = PnpmError::Io {
            path: "node_modules".to_owned(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        }
        .into();
        assert_eq!(err.exit_code(), 10);
    }

    #[test]
    fn test_exit_code_command_error() {
        let err = CliError::Command("test error".to_owned());
        assert_eq!(err.exit_code(), 1, "command error should return exit code 1");
    }

    #[test]
    fn test_core_error_message_passthrough() {
        let err: CliError = PnpmError::InvalidProject {
            path: "/srv/app".to_owned(),
        }
        .into();
        let msg = err.to_string();
        assert!(msg.contains("invalid project"), "message: {msg}");
        assert!(msg.contains("/srv/app"), "message: {msg}");
    }
}
