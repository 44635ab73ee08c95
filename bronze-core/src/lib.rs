#![deny(missing_docs)]
//! Bronze core library.
//!
//! Detects the language ecosystems present in a workspace, runs the matching
//! format, lint and smoke-test commands, and aggregates their results into a
//! pass/fail report.

pub mod checks;
pub mod config;
pub mod detector;
pub mod domain;
pub mod error;
pub mod fs;
pub mod health;
pub mod labels;
pub mod orchestrator;
pub mod report;
pub mod runner;

pub use checks::{BUILTIN_CHECKS, CheckSpec, CheckTable};
pub use config::{
    BronzeConfig, DEFAULT_TIMEOUT, REPORT_FILE_NAME, parse_timeout, workspace_from_env,
    workspace_from_lookup,
};
pub use detector::EcosystemDetector;
pub use domain::{Category, CheckResult, Ecosystem, EcosystemSet, Outcome, format_ecosystems};
pub use error::{BronzeError, Result};
pub use fs::{FileSystem, StdFileSystem};
pub use health::{CI_WORKFLOW_PATH, HealthReport, run_health_check};
pub use labels::suggest_pr_labels;
pub use orchestrator::{CategoryRun, Orchestrator, Progress, RunSummary, canonical_order};
pub use report::{
    Report, render_markdown, render_report, render_summary_text, summarize, write_report,
};
pub use runner::{CommandRunner, ProcessRunner, RunRequest};
