//! Check orchestration across categories.

use std::path::PathBuf;
use std::time::Duration;

use log::{debug, info};

use crate::checks::{CheckSpec, CheckTable};
use crate::config::BronzeConfig;
use crate::domain::{Category, CheckResult, EcosystemSet};
use crate::fs::{FileSystem, StdFileSystem};
use crate::report::{Report, summarize};
use crate::runner::{CommandRunner, ProcessRunner, RunRequest};

/// Results of running one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRun {
    /// The category that ran.
    pub category: Category,
    /// Results in invocation order.
    pub results: Vec<CheckResult>,
    /// Whether the category as a whole succeeded.
    pub success: bool,
}

/// Results of running several categories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Category runs in execution order.
    pub categories: Vec<CategoryRun>,
}

impl RunSummary {
    /// True when no gating category failed.
    pub fn overall_success(&self) -> bool {
        self.categories.iter().all(|run| run.success)
    }

    /// All results across categories, in invocation order.
    pub fn results(&self) -> Vec<CheckResult> {
        self.categories
            .iter()
            .flat_map(|run| run.results.iter().cloned())
            .collect()
    }

    /// Aggregate every result into a report.
    pub fn report(&self) -> Report {
        summarize(self.results())
    }

    /// Categories that failed.
    pub fn failed_categories(&self) -> Vec<Category> {
        self.categories
            .iter()
            .filter(|run| !run.success)
            .map(|run| run.category)
            .collect()
    }
}

/// Progress notifications emitted while categories run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress<'a> {
    /// A category is about to run.
    Started(Category),
    /// A category has finished.
    Finished(&'a CategoryRun),
}

/// Deduplicate `categories` and put them in run order.
pub fn canonical_order(categories: &[Category]) -> Vec<Category> {
    Category::ALL
        .into_iter()
        .filter(|category| categories.contains(category))
        .collect()
}

/// Selects and runs the checks for detected ecosystems.
pub struct Orchestrator<R: CommandRunner, F: FileSystem> {
    runner: R,
    fs: F,
    workspace: PathBuf,
    timeout: Duration,
    table: CheckTable,
}

impl Orchestrator<ProcessRunner, StdFileSystem> {
    /// Orchestrator that spawns real processes in the configured workspace.
    pub fn from_config(config: &BronzeConfig) -> Self {
        Self::new(
            config,
            ProcessRunner::new(&config.workspace),
            StdFileSystem::new(),
        )
    }
}

impl<R: CommandRunner, F: FileSystem> Orchestrator<R, F> {
    /// Create an orchestrator using the built-in check table.
    pub fn new(config: &BronzeConfig, runner: R, fs: F) -> Self {
        Self {
            runner,
            fs,
            workspace: config.workspace.clone(),
            timeout: config.timeout,
            table: CheckTable::builtin(),
        }
    }

    /// Replace the check table.
    pub fn with_table(mut self, table: CheckTable) -> Self {
        self.table = table;
        self
    }

    /// The command runner in use.
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Checks that would run for `category`, after applying preconditions.
    pub fn planned(&self, category: Category, ecosystems: &EcosystemSet) -> Vec<&'static CheckSpec> {
        self.table
            .select(category, ecosystems)
            .into_iter()
            .filter(|spec| self.precondition_met(spec))
            .collect()
    }

    /// Run every applicable check in `category`.
    ///
    /// Failures never stop the remaining checks. Format and lint fail when
    /// any non-advisory check failed; smoke always succeeds.
    pub async fn run_category(&self, category: Category, ecosystems: &EcosystemSet) -> CategoryRun {
        let specs = self.planned(category, ecosystems);
        info!("{category}: {} check(s) to run", specs.len());

        let mut results = Vec::with_capacity(specs.len());
        let mut success = true;
        for spec in specs {
            let request = RunRequest {
                argv: spec.argv,
                name: spec.name,
                timeout: self.timeout,
                allow_failure: spec.allow_failure,
            };
            let result = self.runner.run(&request).await;
            if !result.passed && !spec.allow_failure {
                success = false;
            }
            results.push(result);
        }

        CategoryRun {
            category,
            results,
            success: category.is_advisory() || success,
        }
    }

    /// Run `categories` in canonical order.
    pub async fn run_categories(
        &self,
        categories: &[Category],
        ecosystems: &EcosystemSet,
    ) -> RunSummary {
        self.run_categories_with(categories, ecosystems, |_| {}).await
    }

    /// Run `categories` in canonical order, reporting progress to `observe`.
    pub async fn run_categories_with<O>(
        &self,
        categories: &[Category],
        ecosystems: &EcosystemSet,
        mut observe: O,
    ) -> RunSummary
    where
        O: FnMut(Progress<'_>),
    {
        let mut summary = RunSummary::default();
        for category in canonical_order(categories) {
            observe(Progress::Started(category));
            let run = self.run_category(category, ecosystems).await;
            observe(Progress::Finished(&run));
            summary.categories.push(run);
        }
        summary
    }

    /// Run format, lint and smoke checks in that order.
    pub async fn run_all(&self, ecosystems: &EcosystemSet) -> RunSummary {
        self.run_categories(&Category::ALL, ecosystems).await
    }

    fn precondition_met(&self, spec: &CheckSpec) -> bool {
        let Some(required) = spec.requires else {
            return true;
        };
        let met = self.fs.exists(&self.workspace.join(required));
        if !met {
            debug!("skipping {}: {required} not found", spec.name);
        }
        met
    }
}
