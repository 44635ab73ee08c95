//! Repository health checks.

use std::path::Path;

use serde::Serialize;

use crate::fs::FileSystem;

/// Workflow file expected to run Bronze in CI.
pub const CI_WORKFLOW_PATH: &str = ".github/workflows/bronze-ci.yml";

/// Presence of the files a Bronze-ready repository is expected to have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    /// The Bronze CI workflow exists.
    pub has_ci: bool,
    /// A pre-commit configuration exists.
    pub has_precommit: bool,
    /// A `.gitignore` exists.
    pub has_gitignore: bool,
    /// A `README.md` exists.
    pub has_readme: bool,
}

impl HealthReport {
    /// Whether every health check passed.
    pub fn all_passed(&self) -> bool {
        self.has_ci && self.has_precommit && self.has_gitignore && self.has_readme
    }

    /// Named checks in display order.
    pub fn entries(&self) -> [(&'static str, bool); 4] {
        [
            ("has_ci", self.has_ci),
            ("has_precommit", self.has_precommit),
            ("has_gitignore", self.has_gitignore),
            ("has_readme", self.has_readme),
        ]
    }
}

/// Inspect `root` for the expected repository files.
pub fn run_health_check<F: FileSystem>(fs: &F, root: &Path) -> HealthReport {
    HealthReport {
        has_ci: fs.exists(&root.join(CI_WORKFLOW_PATH)),
        has_precommit: fs.exists(&root.join(".pre-commit-config.yaml")),
        has_gitignore: fs.exists(&root.join(".gitignore")),
        has_readme: fs.exists(&root.join("README.md")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{MockFileSystem, StdFileSystem};

    #[test]
    fn reports_each_missing_file() {
        let mut fs = MockFileSystem::new();
        fs.expect_exists()
            .returning(|path| path.ends_with("README.md") || path.ends_with(".gitignore"));

        let report = run_health_check(&fs, Path::new("/repo"));

        assert_eq!(
            report,
            HealthReport {
                has_ci: false,
                has_precommit: false,
                has_gitignore: true,
                has_readme: true,
            }
        );
        assert!(!report.all_passed());
    }

    #[test]
    fn healthy_repository_passes() {
        let root = tempfile::tempdir().expect("temp dir");
        std::fs::create_dir_all(root.path().join(".github/workflows")).expect("workflows");
        for file in [
            CI_WORKFLOW_PATH,
            ".pre-commit-config.yaml",
            ".gitignore",
            "README.md",
        ] {
            std::fs::write(root.path().join(file), "").expect("write file");
        }

        let report = run_health_check(&StdFileSystem::new(), root.path());

        assert!(report.all_passed());
        assert!(report.entries().iter().all(|(_, ok)| *ok));
    }

    #[test]
    fn serializes_flags_by_name() {
        let report = HealthReport {
            has_ci: true,
            has_precommit: false,
            has_gitignore: true,
            has_readme: false,
        };
        let value = serde_json::to_value(report).expect("json");
        assert_eq!(value["has_ci"], true);
        assert_eq!(value["has_precommit"], false);
    }
}
