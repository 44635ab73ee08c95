//! Static check table mapping ecosystems and categories to commands.

use crate::domain::{Category, Ecosystem, EcosystemSet};

/// A single external check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckSpec {
    /// Ecosystem that must be detected for the check to run.
    pub ecosystem: Ecosystem,
    /// Category the check belongs to.
    pub category: Category,
    /// Check name reported in results.
    pub name: &'static str,
    /// Program followed by its arguments.
    pub argv: &'static [&'static str],
    /// Whether a failure is advisory within its category.
    pub allow_failure: bool,
    /// Path relative to the workspace that must exist for the check to run.
    pub requires: Option<&'static str>,
}

/// The built-in checks, grouped per ecosystem in registration order.
pub const BUILTIN_CHECKS: &[CheckSpec] = &[
    CheckSpec {
        ecosystem: Ecosystem::Python,
        category: Category::Format,
        name: "Black format check",
        argv: &["black", "--check", "."],
        allow_failure: false,
        requires: None,
    },
    CheckSpec {
        ecosystem: Ecosystem::Python,
        category: Category::Lint,
        name: "Ruff lint",
        argv: &["ruff", "check", "."],
        allow_failure: false,
        requires: None,
    },
    CheckSpec {
        ecosystem: Ecosystem::Python,
        category: Category::Smoke,
        name: "Python smoke tests",
        argv: &["pytest", "-q", "-m", "smoke"],
        allow_failure: true,
        requires: Some("tests"),
    },
    CheckSpec {
        ecosystem: Ecosystem::Cpp,
        category: Category::Format,
        name: "clang-format version",
        argv: &["clang-format", "--version"],
        allow_failure: true,
        requires: None,
    },
    CheckSpec {
        ecosystem: Ecosystem::Dart,
        category: Category::Format,
        name: "Dart format check",
        argv: &["dart", "format", "--set-exit-if-changed", "."],
        allow_failure: true,
        requires: None,
    },
    CheckSpec {
        ecosystem: Ecosystem::Dart,
        category: Category::Lint,
        name: "Flutter analyze",
        argv: &["flutter", "analyze"],
        allow_failure: true,
        requires: None,
    },
    CheckSpec {
        ecosystem: Ecosystem::Dart,
        category: Category::Smoke,
        name: "Flutter tests",
        argv: &["flutter", "test"],
        allow_failure: true,
        requires: None,
    },
];

/// An ordered table of checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckTable {
    specs: &'static [CheckSpec],
}

impl Default for CheckTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CheckTable {
    /// The built-in check table.
    pub fn builtin() -> Self {
        Self {
            specs: BUILTIN_CHECKS,
        }
    }

    /// A table backed by custom specs.
    pub fn new(specs: &'static [CheckSpec]) -> Self {
        Self { specs }
    }

    /// Every check in the table, in declaration order.
    pub fn specs(&self) -> &'static [CheckSpec] {
        self.specs
    }

    /// Checks to run for `category`, given the detected ecosystems.
    ///
    /// Ordered by ecosystem registration order, then by declaration order
    /// within each ecosystem.
    pub fn select(&self, category: Category, ecosystems: &EcosystemSet) -> Vec<&'static CheckSpec> {
        let specs = self.specs;
        Ecosystem::ALL
            .into_iter()
            .filter(|ecosystem| ecosystems.contains(ecosystem))
            .flat_map(|ecosystem| {
                specs
                    .iter()
                    .filter(move |spec| spec.ecosystem == ecosystem && spec.category == category)
            })
            .collect()
    }
}
