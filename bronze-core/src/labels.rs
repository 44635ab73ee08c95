//! PR label suggestions derived from changed file paths.

use std::collections::BTreeSet;
use std::path::Path;

/// Suggest labels for a pull request touching `changed_files`.
pub fn suggest_pr_labels<S: AsRef<str>>(changed_files: &[S]) -> BTreeSet<String> {
    let mut labels = BTreeSet::new();
    for file in changed_files {
        let file = file.as_ref();
        let extension = Path::new(file)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();

        if let Some(label) = language_label(extension) {
            labels.insert(label.to_string());
        }
        if let Some(label) = component_label(file, extension) {
            labels.insert(label.to_string());
        }
    }
    labels
}

fn language_label(extension: &str) -> Option<&'static str> {
    match extension {
        "dart" => Some("dart"),
        "py" => Some("python"),
        "js" | "ts" | "jsx" | "tsx" => Some("javascript"),
        "cpp" | "c" | "h" | "hpp" => Some("c/c++"),
        _ => None,
    }
}

fn component_label(file: &str, extension: &str) -> Option<&'static str> {
    let lower = file.to_lowercase();
    if file.contains(".github/workflows") {
        Some("ci/cd")
    } else if lower.contains("test") {
        Some("testing")
    } else if lower.contains("doc") || extension == "md" {
        Some("documentation")
    } else {
        None
    }
}
