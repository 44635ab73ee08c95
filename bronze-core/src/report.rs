//! Report aggregation and formatting utilities for Bronze outputs.

use std::fmt::Write;
use std::path::Path;

use serde::Serialize;

use crate::domain::CheckResult;
use crate::error::Result;

/// Maximum number of characters of failure details shown in transcripts.
pub const DETAILS_PREVIEW_CHARS: usize = 200;

const RULE: &str = "============================================================";

/// Aggregated pass/fail report for one run.
///
/// Field order is part of the JSON contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Number of checks that ran.
    pub total_checks: usize,
    /// Number of checks that passed.
    pub passed: usize,
    /// Number of checks that failed.
    pub failed: usize,
    /// Every check result in invocation order.
    pub checks: Vec<CheckResult>,
}

impl Report {
    /// Whether every check passed, advisory ones included.
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// Reduce check results into a report, keeping their order.
pub fn summarize(results: Vec<CheckResult>) -> Report {
    let passed = results.iter().filter(|result| result.passed).count();
    Report {
        total_checks: results.len(),
        passed,
        failed: results.len() - passed,
        checks: results,
    }
}

/// Render a report as pretty-printed JSON.
pub fn render_report(report: &Report) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Render the human-readable summary printed at the end of a run.
pub fn render_summary_text(report: &Report) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "{RULE}");
    let _ = writeln!(output, "📊 Check Summary:");
    let _ = writeln!(output, "{RULE}");
    for check in &report.checks {
        let status = if check.passed { "✅" } else { "❌" };
        let _ = writeln!(output, "{status} {}: {}", check.name, check.message);
        if !check.passed {
            if let Some(details) = check.details.as_deref().map(str::trim) {
                if !details.is_empty() {
                    let _ = writeln!(output, "   Details: {}", preview(details));
                }
            }
        }
    }
    let _ = writeln!(
        output,
        "\n📈 Results: {} passed, {} failed",
        report.passed, report.failed
    );
    output
}

/// Render a report as Markdown, suitable for a PR comment.
pub fn render_markdown(report: &Report) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# Bronze Check Report\n");
    let _ = writeln!(
        output,
        "- Total: {}\n- Passed: {}\n- Failed: {}\n",
        report.total_checks, report.passed, report.failed
    );
    if report.checks.is_empty() {
        let _ = writeln!(output, "No checks were run.");
        return output;
    }
    let _ = writeln!(output, "| Check | Status | Message |");
    let _ = writeln!(output, "| --- | --- | --- |");
    for check in &report.checks {
        let status = if check.passed { "pass" } else { "fail" };
        let _ = writeln!(
            output,
            "| {} | {status} | {} |",
            escape_cell(&check.name),
            escape_cell(&check.message)
        );
    }

    let failures: Vec<&CheckResult> = report.checks.iter().filter(|check| !check.passed).collect();
    for check in failures {
        let Some(details) = check.details.as_deref().map(str::trim) else {
            continue;
        };
        if details.is_empty() {
            continue;
        }
        let _ = writeln!(output, "\n### {}\n", check.name);
        let _ = writeln!(output, "```text\n{details}\n```");
    }
    output
}

/// Write the JSON report to `path`, creating parent directories as needed.
pub fn write_report(report: &Report, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, render_report(report)?)?;
    Ok(())
}

fn preview(details: &str) -> String {
    if details.chars().count() <= DETAILS_PREVIEW_CHARS {
        return details.to_string();
    }
    let truncated: String = details.chars().take(DETAILS_PREVIEW_CHARS).collect();
    format!("{truncated}...")
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn sample_results() -> Vec<CheckResult> {
        vec![
            CheckResult::success("Black format check", "All done!".to_string()),
            CheckResult::failure("Ruff lint", "E501 line too long".to_string()),
            CheckResult::tool_missing("Flutter analyze", "flutter"),
            CheckResult::timed_out("Python smoke tests", Duration::from_secs(300)),
        ]
    }

    #[test]
    fn summarize_counts_and_preserves_order() {
        let report = summarize(sample_results());

        assert_eq!(report.total_checks, 4);
        assert_eq!(report.passed, 1);
        assert_eq!(report.failed, 3);
        assert_eq!(report.total_checks, report.passed + report.failed);
        let names: Vec<&str> = report.checks.iter().map(|check| check.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Black format check",
                "Ruff lint",
                "Flutter analyze",
                "Python smoke tests"
            ]
        );
        assert!(!report.all_passed());
    }

    #[test]
    fn summarize_empty_sequence() {
        let report = summarize(Vec::new());
        assert_eq!((report.total_checks, report.passed, report.failed), (0, 0, 0));
        assert!(report.checks.is_empty());
        assert!(report.all_passed());
    }

    #[test]
    fn json_fields_are_in_stable_order() {
        let json = render_report(&summarize(sample_results())).expect("json");

        let total = json.find("\"total_checks\"").expect("total_checks");
        let passed = json.find("\"passed\"").expect("passed");
        let failed = json.find("\"failed\"").expect("failed");
        let checks = json.find("\"checks\"").expect("checks");
        assert!(total < passed && passed < failed && failed < checks);

        let parsed: serde_json::Value = serde_json::from_str(&json).expect("parse");
        let first = parsed["checks"][0].as_object().expect("object");
        let keys: Vec<&str> = first.keys().map(String::as_str).collect();
        assert_eq!(keys.len(), 4);
        assert_eq!(parsed["checks"][2]["message"], "Command not found: flutter");
    }

    #[test]
    fn summary_text_lists_checks_and_totals() {
        let output = render_summary_text(&summarize(sample_results()));

        assert!(output.contains("✅ Black format check: Black format check passed"));
        assert!(output.contains("❌ Ruff lint: Ruff lint failed"));
        assert!(output.contains("Details: E501 line too long"));
        assert!(output.contains("Results: 1 passed, 3 failed"));
        assert!(!output.contains("All done!"));
    }

    #[test]
    fn summary_text_truncates_long_details() {
        let long = "x".repeat(500);
        let output = render_summary_text(&summarize(vec![CheckResult::failure("Noisy", long)]));

        let expected = format!("Details: {}...", "x".repeat(DETAILS_PREVIEW_CHARS));
        assert!(output.contains(&expected));
        assert!(!output.contains(&"x".repeat(DETAILS_PREVIEW_CHARS + 1)));
    }

    #[test]
    fn renders_markdown_table_and_failures() {
        let output = render_markdown(&summarize(sample_results()));

        assert!(output.contains("# Bronze Check Report"));
        assert!(output.contains("| Ruff lint | fail | Ruff lint failed |"));
        assert!(output.contains("### Ruff lint"));
        assert!(output.contains("E501 line too long"));

        let empty = render_markdown(&summarize(Vec::new()));
        assert!(empty.contains("No checks were run."));
    }

    #[test]
    fn writes_report_file() {
        let root = tempfile::tempdir().expect("temp dir");
        let path = root.path().join("out/bronze-report.json");

        write_report(&summarize(sample_results()), &path).expect("write report");

        let contents = std::fs::read_to_string(&path).expect("read report");
        let parsed: serde_json::Value = serde_json::from_str(&contents).expect("parse");
        assert_eq!(parsed["total_checks"], 4);
        assert_eq!(parsed["checks"][1]["details"], "E501 line too long");
    }
}
