#![deny(missing_docs)]
//! Bronze command-line interface.
//!
//! Detects the ecosystems in a workspace, runs the Bronze-level format, lint
//! and smoke-test checks, and exits non-zero when a gating category fails.

mod status;

use bronze_core::{
    BronzeConfig, Category, EcosystemDetector, Orchestrator, Progress, Report, StdFileSystem,
    canonical_order, format_ecosystems, render_markdown, render_report, render_summary_text,
    workspace_from_env, write_report,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::debug;
use std::path::PathBuf;
#[cfg(not(test))]
use std::process::ExitCode;
use std::time::Duration;

pub(crate) type CliResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Parser)]
#[command(name = "bronze", version, about = "Bronze-level CI bot")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct WorkspaceArgs {
    /// Workspace root (defaults to GITHUB_WORKSPACE or the current directory).
    #[arg(short, long, env = "BRONZE_WORKSPACE")]
    workspace: Option<PathBuf>,
}

#[derive(Args, Clone)]
struct OutputArgs {
    /// Output format for the final report.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Write the JSON report to bronze-report.json in the workspace.
    #[arg(long)]
    write_report: bool,
    /// Write the JSON report to this path instead.
    #[arg(long = "report-output", env = "BRONZE_REPORT_PATH")]
    report_output: Option<PathBuf>,
}

#[derive(ValueEnum, Copy, Clone, Debug, Eq, PartialEq)]
enum OutputFormat {
    Text,
    Json,
    Markdown,
}

#[derive(ValueEnum, Copy, Clone, Debug, Eq, PartialEq)]
enum CategoryArg {
    Format,
    Lint,
    Smoke,
    All,
}

#[derive(Subcommand)]
enum Commands {
    /// Run format, lint and smoke-test checks for the detected ecosystems.
    Check {
        #[command(flatten)]
        workspace: WorkspaceArgs,
        /// Categories to run (repeatable or comma-separated).
        #[arg(short, long, value_enum, value_delimiter = ',', default_value = "all")]
        category: Vec<CategoryArg>,
        /// Time budget for each command, in seconds.
        #[arg(
            long,
            env = "BRONZE_TIMEOUT_SECS",
            value_parser = clap::value_parser!(u64).range(1..)
        )]
        timeout_secs: Option<u64>,
        #[command(flatten)]
        report: OutputArgs,
    },
    /// Print the detected ecosystems as JSON.
    Detect {
        #[command(flatten)]
        workspace: WorkspaceArgs,
    },
    /// Print the workspace, detected ecosystems and repository health.
    Status {
        #[command(flatten)]
        workspace: WorkspaceArgs,
    },
    /// Print repository health as JSON; fails if any check is missing.
    Health {
        #[command(flatten)]
        workspace: WorkspaceArgs,
    },
    /// Suggest PR labels for a list of changed files.
    Labels {
        /// Changed file paths.
        #[arg(required = true)]
        files: Vec<String>,
    },
}

#[cfg(not(test))]
#[tokio::main(flavor = "current_thread")]
async fn main() -> CliResult<ExitCode> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let success = match cli.command {
        Commands::Check {
            workspace,
            category,
            timeout_secs,
            report,
        } => {
            let config = resolve_config(&workspace, timeout_secs, &report)?;
            run_check(&config, &resolve_categories(&category), report.format).await?
        }
        Commands::Detect { workspace } => status::run_detect(&resolve_workspace(&workspace)?)?,
        Commands::Status { workspace } => status::run_status(&resolve_workspace(&workspace)?),
        Commands::Health { workspace } => status::run_health(&resolve_workspace(&workspace)?)?,
        Commands::Labels { files } => status::run_labels(&files)?,
    };

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(test)]
fn main() {}

fn resolve_config(
    workspace: &WorkspaceArgs,
    timeout_secs: Option<u64>,
    report: &OutputArgs,
) -> CliResult<BronzeConfig> {
    let mut config = BronzeConfig::from_env()?;
    if let Some(path) = &workspace.workspace {
        config.workspace = path.clone();
    }
    if let Some(secs) = timeout_secs {
        config.timeout = Duration::from_secs(secs);
    }
    config.report_path = match (&report.report_output, report.write_report) {
        (Some(path), _) => Some(path.clone()),
        (None, true) => Some(config.default_report_path()),
        (None, false) => None,
    };
    debug!("resolved configuration: {config:?}");
    Ok(config)
}

/// Configuration for the inspection subcommands, which never run checks and
/// so only need the workspace.
fn resolve_workspace(workspace: &WorkspaceArgs) -> CliResult<BronzeConfig> {
    let root = match &workspace.workspace {
        Some(path) => path.clone(),
        None => workspace_from_env()?,
    };
    Ok(BronzeConfig::new(root))
}

fn resolve_categories(args: &[CategoryArg]) -> Vec<Category> {
    if args.is_empty() || args.contains(&CategoryArg::All) {
        return Category::ALL.to_vec();
    }
    let selected: Vec<Category> = args
        .iter()
        .filter_map(|arg| match arg {
            CategoryArg::Format => Some(Category::Format),
            CategoryArg::Lint => Some(Category::Lint),
            CategoryArg::Smoke => Some(Category::Smoke),
            CategoryArg::All => None,
        })
        .collect();
    canonical_order(&selected)
}

async fn run_check(
    config: &BronzeConfig,
    categories: &[Category],
    format: OutputFormat,
) -> CliResult<bool> {
    let transcript = format == OutputFormat::Text;
    if transcript {
        println!("🤖 Bronze bot starting...");
        println!("Workspace: {}", config.workspace.display());
    }

    let ecosystems = EcosystemDetector::new(StdFileSystem::new()).detect(&config.workspace);
    if transcript {
        println!("Detected ecosystems: {}", format_ecosystems(&ecosystems));
    }

    let orchestrator = Orchestrator::from_config(config);
    let summary = orchestrator
        .run_categories_with(categories, &ecosystems, |progress| {
            if transcript {
                print!("{}", render_progress(progress));
            }
        })
        .await;
    let report = summary.report();

    print!("{}", render_output(&report, format)?);

    if let Some(path) = &config.report_path {
        write_report(&report, path)?;
        if transcript {
            println!("\n📄 Report written to: {}", path.display());
        }
    }

    let success = summary.overall_success();
    if transcript && !success {
        let failed: Vec<&str> = summary
            .failed_categories()
            .iter()
            .map(|category| category.name())
            .collect();
        println!("Failed categories: {}", failed.join(", "));
    }
    Ok(success)
}

fn render_progress(progress: Progress<'_>) -> String {
    match progress {
        Progress::Started(category) => format!("\n{}\n", category_banner(category)),
        Progress::Finished(run) => {
            if run.results.is_empty() {
                return format!("No {} checks apply.\n", run.category);
            }
            run.results
                .iter()
                .map(|result| {
                    let status = if result.passed { "✅" } else { "❌" };
                    format!("{status} {}\n", result.message)
                })
                .collect()
        }
    }
}

fn category_banner(category: Category) -> String {
    match category {
        Category::Format => "🎨 Running format checks...".to_string(),
        Category::Lint => "🔍 Running lint checks...".to_string(),
        Category::Smoke => "🧪 Running smoke tests (advisory)...".to_string(),
    }
}

fn render_output(report: &Report, format: OutputFormat) -> CliResult<String> {
    let contents = match format {
        OutputFormat::Text => format!("\n{}", render_summary_text(report)),
        OutputFormat::Json => format!("{}\n", render_report(report)?),
        OutputFormat::Markdown => render_markdown(report),
    };
    Ok(contents)
}
