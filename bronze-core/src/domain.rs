//! Domain entities for Bronze.

use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A language ecosystem that Bronze knows how to detect.
///
/// Variants are declared in registration order, which is also the order the
/// orchestrator dispatches their checks in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    /// Python projects (`pyproject.toml` or `*.py`).
    Python,
    /// C and C++ projects (`CMakeLists.txt` or C/C++ sources).
    Cpp,
    /// Dart and Flutter projects (`pubspec.yaml`).
    Dart,
    /// JavaScript projects (`package.json`).
    JavaScript,
}

impl Ecosystem {
    /// All ecosystems in registration order.
    pub const ALL: [Ecosystem; 4] = [
        Ecosystem::Python,
        Ecosystem::Cpp,
        Ecosystem::Dart,
        Ecosystem::JavaScript,
    ];

    /// Stable string tag for the ecosystem.
    pub fn tag(&self) -> &'static str {
        match self {
            Ecosystem::Python => "python",
            Ecosystem::Cpp => "cpp",
            Ecosystem::Dart => "dart",
            Ecosystem::JavaScript => "javascript",
        }
    }

    /// Human-readable name used in transcripts.
    pub fn display_name(&self) -> &'static str {
        match self {
            Ecosystem::Python => "Python",
            Ecosystem::Cpp => "C/C++",
            Ecosystem::Dart => "Dart/Flutter",
            Ecosystem::JavaScript => "JavaScript",
        }
    }

    /// Look up an ecosystem by its tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|ecosystem| ecosystem.tag() == tag.trim().to_lowercase())
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// The set of ecosystems detected in a workspace.
pub type EcosystemSet = BTreeSet<Ecosystem>;

/// Render an ecosystem set as a comma-separated list of tags.
pub fn format_ecosystems(ecosystems: &EcosystemSet) -> String {
    if ecosystems.is_empty() {
        return "none".to_string();
    }
    ecosystems
        .iter()
        .map(Ecosystem::tag)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A class of quality check with its own aggregation rule.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Formatting checks.
    Format,
    /// Lint and static analysis checks.
    Lint,
    /// Smoke tests. Always advisory.
    Smoke,
}

impl Category {
    /// All categories in run order.
    pub const ALL: [Category; 3] = [Category::Format, Category::Lint, Category::Smoke];

    /// Stable name of the category.
    pub fn name(&self) -> &'static str {
        match self {
            Category::Format => "format",
            Category::Lint => "lint",
            Category::Smoke => "smoke",
        }
    }

    /// Whether the category never gates the overall run.
    pub fn is_advisory(&self) -> bool {
        matches!(self, Category::Smoke)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a check ended. Kept out of the serialized report.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The command exited with status 0.
    Passed,
    /// The command ran and exited non-zero.
    Failed,
    /// The command exceeded its time budget and was killed.
    TimedOut,
    /// The executable was not found.
    ToolMissing,
    /// The command could not be run for another reason.
    Error,
}

/// Result of a single check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    /// Check name.
    pub name: String,
    /// Whether the check passed.
    pub passed: bool,
    /// Short human-readable summary.
    pub message: String,
    /// Raw output or error text, if any.
    pub details: Option<String>,
    /// How the check ended.
    #[serde(skip)]
    pub outcome: Outcome,
}

impl CheckResult {
    /// A check whose command exited successfully.
    pub fn success(name: &str, stdout: String) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            message: format!("{name} passed"),
            details: Some(stdout),
            outcome: Outcome::Passed,
        }
    }

    /// A check whose command exited with a non-zero status.
    pub fn failure(name: &str, details: String) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            message: format!("{name} failed"),
            details: Some(details),
            outcome: Outcome::Failed,
        }
    }

    /// A check whose command was killed after exceeding `timeout`.
    pub fn timed_out(name: &str, timeout: Duration) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            message: format!("{name} timed out"),
            details: Some(format!(
                "Command exceeded the {} second timeout",
                timeout.as_secs()
            )),
            outcome: Outcome::TimedOut,
        }
    }

    /// A check whose executable could not be found.
    pub fn tool_missing(name: &str, program: &str) -> Self {
        let message = format!("Command not found: {program}");
        Self {
            name: name.to_string(),
            passed: false,
            message: message.clone(),
            details: Some(message),
            outcome: Outcome::ToolMissing,
        }
    }

    /// A check that could not be run.
    pub fn error(name: &str, details: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            message: format!("{name} error"),
            details: Some(details.into()),
            outcome: Outcome::Error,
        }
    }
}
