//! Workspace inspection subcommands: detect, status, health and labels.

use crate::CliResult;
use bronze_core::{
    BronzeConfig, EcosystemDetector, EcosystemSet, HealthReport, StdFileSystem,
    run_health_check, suggest_pr_labels,
};
use serde::Serialize;
use std::fmt::Write;
use std::path::Path;

#[derive(Debug, Serialize)]
struct DetectOutput {
    languages: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
struct LabelsOutput {
    labels: Vec<String>,
}

pub(crate) fn run_detect(config: &BronzeConfig) -> CliResult<bool> {
    let ecosystems = detect(&config.workspace);
    println!("{}", render_detect_json(&ecosystems)?);
    Ok(true)
}

pub(crate) fn run_status(config: &BronzeConfig) -> bool {
    let ecosystems = detect(&config.workspace);
    let health = run_health_check(&StdFileSystem::new(), &config.workspace);
    print!(
        "{}",
        render_status_text(&config.workspace, &ecosystems, &health)
    );
    true
}

pub(crate) fn run_health(config: &BronzeConfig) -> CliResult<bool> {
    let health = run_health_check(&StdFileSystem::new(), &config.workspace);
    println!("{}", serde_json::to_string_pretty(&health)?);
    Ok(health.all_passed())
}

pub(crate) fn run_labels(files: &[String]) -> CliResult<bool> {
    println!("{}", render_labels_json(files)?);
    Ok(true)
}

fn detect(workspace: &Path) -> EcosystemSet {
    EcosystemDetector::new(StdFileSystem::new()).detect(workspace)
}

fn render_detect_json(ecosystems: &EcosystemSet) -> CliResult<String> {
    let output = DetectOutput {
        languages: ecosystems.iter().map(|ecosystem| ecosystem.tag()).collect(),
    };
    Ok(serde_json::to_string(&output)?)
}

fn render_labels_json(files: &[String]) -> CliResult<String> {
    let output = LabelsOutput {
        labels: suggest_pr_labels(files).into_iter().collect(),
    };
    Ok(serde_json::to_string(&output)?)
}

fn render_status_text(workspace: &Path, ecosystems: &EcosystemSet, health: &HealthReport) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "=== Bronze Bot Status ===");
    let _ = writeln!(output, "Workspace: {}", workspace.display());
    if ecosystems.is_empty() {
        let _ = writeln!(output, "Languages detected: none");
    } else {
        let names: Vec<&str> = ecosystems
            .iter()
            .map(|ecosystem| ecosystem.display_name())
            .collect();
        let _ = writeln!(output, "Languages detected: {}", names.join(", "));
    }

    let _ = writeln!(output, "\n=== Repository Health ===");
    for (check, ok) in health.entries() {
        let icon = if ok { "✓" } else { "✗" };
        let _ = writeln!(output, "{icon} {check}: {ok}");
    }
    output
}

#[cfg(test)]
mod tests {
    use super::{render_detect_json, render_labels_json, render_status_text, run_health};
    use bronze_core::{BronzeConfig, Ecosystem, EcosystemSet, HealthReport};
    use std::path::Path;

    #[test]
    fn detect_json_lists_tags_in_registration_order() {
        let ecosystems: EcosystemSet = [Ecosystem::Dart, Ecosystem::Python].into_iter().collect();
        let json = render_detect_json(&ecosystems).expect("json");
        assert_eq!(json, r#"{"languages":["python","dart"]}"#);

        let json = render_detect_json(&EcosystemSet::new()).expect("json");
        assert_eq!(json, r#"{"languages":[]}"#);
    }

    #[test]
    fn labels_json_is_sorted() {
        let files = vec![
            "docs/README.md".to_string(),
            "lib/main.dart".to_string(),
        ];
        let json = render_labels_json(&files).expect("json");
        assert_eq!(json, r#"{"labels":["dart","documentation"]}"#);
    }

    #[test]
    fn status_text_covers_languages_and_health() {
        let ecosystems: EcosystemSet = [Ecosystem::Cpp].into_iter().collect();
        let health = HealthReport {
            has_ci: true,
            has_precommit: false,
            has_gitignore: true,
            has_readme: true,
        };

        let output = render_status_text(Path::new("/repo"), &ecosystems, &health);

        assert!(output.contains("=== Bronze Bot Status ==="));
        assert!(output.contains("Workspace: /repo"));
        assert!(output.contains("Languages detected: C/C++"));
        assert!(output.contains("✓ has_ci: true"));
        assert!(output.contains("✗ has_precommit: false"));

        let output = render_status_text(Path::new("/repo"), &EcosystemSet::new(), &health);
        assert!(output.contains("Languages detected: none"));
    }

    #[test]
    fn health_fails_for_bare_workspace() {
        let root = tempfile::tempdir().expect("temp dir");
        let healthy = run_health(&BronzeConfig::new(root.path())).expect("health");
        assert!(!healthy);
    }
}
