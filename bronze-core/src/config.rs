//! Run configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{BronzeError, Result};

/// Default time budget for a single external command.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);
/// File name of the JSON report written into the workspace root.
pub const REPORT_FILE_NAME: &str = "bronze-report.json";

/// Explicit configuration for a Bronze run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BronzeConfig {
    /// Workspace root that is inspected and used as the working directory.
    pub workspace: PathBuf,
    /// Time budget for each external command.
    pub timeout: Duration,
    /// Where to write the JSON report, if anywhere.
    pub report_path: Option<PathBuf>,
}

impl BronzeConfig {
    /// Create a configuration for `workspace` with default settings.
    pub fn new(workspace: impl Into<PathBuf>) -> Self {
        Self {
            workspace: workspace.into(),
            timeout: DEFAULT_TIMEOUT,
            report_path: None,
        }
    }

    /// Override the per-command timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Write the report to `path`.
    pub fn with_report_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.report_path = Some(path.into());
        self
    }

    /// Write the report to `bronze-report.json` in the workspace root.
    pub fn with_default_report_path(self) -> Self {
        let path = self.default_report_path();
        self.with_report_path(path)
    }

    /// The default report location for this workspace.
    pub fn default_report_path(&self) -> PathBuf {
        self.workspace.join(REPORT_FILE_NAME)
    }

    /// Build a configuration from the process environment.
    ///
    /// The workspace comes from `BRONZE_WORKSPACE`, then `GITHUB_WORKSPACE`,
    /// then the current directory. `BRONZE_TIMEOUT_SECS` and
    /// `BRONZE_REPORT_PATH` are optional.
    pub fn from_env() -> Result<Self> {
        let cwd = std::env::current_dir()?;
        Self::from_lookup(|key| std::env::var(key).ok(), &cwd)
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_lookup<L>(lookup: L, cwd: &Path) -> Result<Self>
    where
        L: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mut config = Self::new(workspace_from_lookup(&lookup, cwd));
        if let Some(raw) = non_empty("BRONZE_TIMEOUT_SECS") {
            config.timeout = parse_timeout(&raw)?;
        }
        if let Some(path) = non_empty("BRONZE_REPORT_PATH") {
            config.report_path = Some(PathBuf::from(path));
        }
        Ok(config)
    }
}

/// Resolve only the workspace root from the process environment.
///
/// Unlike [`BronzeConfig::from_env`], run settings such as the timeout are
/// not read, so a bad value there cannot fail a command that never runs
/// checks.
pub fn workspace_from_env() -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    Ok(workspace_from_lookup(|key| std::env::var(key).ok(), &cwd))
}

/// Resolve the workspace from `BRONZE_WORKSPACE`, then `GITHUB_WORKSPACE`,
/// then `cwd`.
pub fn workspace_from_lookup<L>(lookup: L, cwd: &Path) -> PathBuf
where
    L: Fn(&str) -> Option<String>,
{
    ["BRONZE_WORKSPACE", "GITHUB_WORKSPACE"]
        .into_iter()
        .filter_map(|key| lookup(key).filter(|value| !value.trim().is_empty()))
        .map(PathBuf::from)
        .next()
        .unwrap_or_else(|| cwd.to_path_buf())
}

/// Parse a positive number of seconds.
pub fn parse_timeout(raw: &str) -> Result<Duration> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(BronzeError::Config(
            "timeout must be at least one second".to_string(),
        )),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(err) => Err(BronzeError::Config(format!(
            "timeout {raw:?} is not a number of seconds: {err}"
        ))),
    }
}
