use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use colored::*;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use verdict_harness::{FixtureSet, Harness, RunReport, Tool, Verdict};

mod config;
mod reporter;

use reporter::Reporter;

/// Preprocessor-conformance fixture harness.
///
/// Discovers C-like fixture files under a directory, runs each one through
/// an external preprocessor/compiler, and compares the captured stdout
/// byte-for-byte against a sibling golden file named by appending
/// `.expected` to the fixture file name. A fixture without a golden file
/// passes when the tool exits 0.
///
/// EXAMPLES:
///     verdict tests/                        Run fixtures with the default tool (cc)
///     verdict tests/ --tool ./mycpp         Use a tool by path
///     verdict tests/ -j 8 --timeout 10      Bound workers and per-fixture time
///     verdict tests/ --filter include       Only fixtures whose path matches
///     verdict tests/ --bless                Regenerate golden files
///     verdict tests/ --json                 Machine-readable report
///
/// ENVIRONMENT VARIABLES:
///     VERDICT_TOOL      Default tool binary (same as --tool)
///     VERDICT_JSON      Set to '1' for JSON output by default
///     VERDICT_NO_COLOR  Same as --no-color
///     NO_COLOR          Set to disable colored output
#[derive(Parser)]
#[command(name = "verdict")]
#[command(version)]
#[command(after_help = "For more information, see: https://github.com/verdict-harness/verdict")]
struct Cli {
    /// Directory scanned recursively for fixture files
    #[arg(value_name = "FIXTURE_ROOT", required_unless_present = "completions")]
    root: Option<PathBuf>,

    /// Preprocessor or compiler under test, invoked as `tool <fixture>`
    #[arg(long, env = "VERDICT_TOOL", default_value = "cc", value_name = "PATH")]
    tool: String,

    /// Extra argument passed to the tool before the fixture path (repeatable)
    #[arg(long, value_name = "ARG", allow_hyphen_values = true)]
    tool_arg: Vec<String>,

    /// Number of parallel workers (defaults to one per CPU)
    #[arg(long, short = 'j', value_name = "N")]
    jobs: Option<usize>,

    /// Per-fixture timeout in seconds
    #[arg(long, default_value_t = 30, value_name = "SECONDS")]
    timeout: u64,

    /// Run only fixtures whose path contains this pattern
    #[arg(long, value_name = "PATTERN")]
    filter: Option<String>,

    /// Fixture file extension (repeatable)
    #[arg(long, default_value = "c", value_name = "EXT")]
    ext: Vec<String>,

    /// Rewrite golden files from observed output instead of comparing
    #[arg(long)]
    bless: bool,

    /// List discovered fixtures without running them
    #[arg(long)]
    list: bool,

    /// Report results as JSON
    #[arg(long)]
    json: bool,

    /// One line per fixture instead of progress dots
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Generate shell completions
    #[arg(long, value_name = "SHELL", value_enum)]
    completions: Option<Shell>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

/// Run the harness with the parsed configuration
fn run(cli: Cli) -> Result<ExitCode> {
    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(shell, &mut cmd, name, &mut io::stdout());
        return Ok(ExitCode::SUCCESS);
    }

    let env_config = config::Config::from_env();

    // Command-line flags override environment variables
    let use_json = cli.json || env_config.default_json;
    let no_color = cli.no_color || env_config.no_color;
    if no_color {
        colored::control::set_override(false);
    }

    let root = cli.root.context("fixture root is required")?;

    if !use_json && !cli.list {
        println!("{}", "Discovering fixtures...".bold());
    }

    let mut set = FixtureSet::discover(&root, &cli.ext)
        .with_context(|| format!("Failed to scan {}", root.display()))?;

    // Apply filter if provided
    if let Some(pattern) = &cli.filter {
        set = set.filter(pattern);
    }

    if cli.list {
        for fixture in &set.fixtures {
            println!("{}", fixture.path.display());
        }
        for scan in &set.scan_errors {
            eprintln!(
                "{} {}: {}",
                "warning:".yellow().bold(),
                scan.path.display(),
                scan.message
            );
        }
        println!(
            "{} fixture{}",
            set.len(),
            if set.len() == 1 { "" } else { "s" }
        );
        return Ok(ExitCode::SUCCESS);
    }

    // A missing tool is fatal even when nothing would run
    let tool = Tool::locate(&cli.tool)?.with_args(cli.tool_arg);

    if set.is_empty() {
        if use_json {
            println!(
                "{}",
                serde_json::json!({
                    "fixtures": 0,
                    "passed": 0,
                    "failed": 0,
                    "message": "No fixtures found"
                })
            );
        } else {
            println!("{}", "No fixtures found.".yellow());
        }
        return Ok(ExitCode::SUCCESS);
    }

    if !use_json {
        println!(
            "Found {} fixture{}",
            set.len().to_string().bold(),
            if set.len() == 1 { "" } else { "s" }
        );
        println!("Tool: {}", tool.program().display());
        println!();
    }

    let harness = Harness::new(tool)
        .with_timeout(Duration::from_secs(cli.timeout))
        .with_jobs(cli.jobs)
        .with_bless(cli.bless);

    let report = harness.run(&set)?;

    if use_json {
        print_json_report(&report);
    } else {
        let reporter = Reporter::new(cli.verbose).with_no_color(no_color);
        reporter.report(&report);
    }

    Ok(if report.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Print the report as a single JSON object
fn print_json_report(report: &RunReport) {
    let results: Vec<_> = report
        .runs
        .iter()
        .map(|r| match &r.verdict {
            Verdict::Pass { duration } => serde_json::json!({
                "file": r.path.display().to_string(),
                "verdict": "pass",
                "duration_ms": duration.as_millis(),
            }),
            Verdict::Fail { reason, duration } => serde_json::json!({
                "file": r.path.display().to_string(),
                "verdict": "fail",
                "reason": reason.to_string(),
                "duration_ms": duration.as_millis(),
            }),
        })
        .collect();

    println!(
        "{}",
        serde_json::json!({
            "fixtures": report.total(),
            "passed": report.passed(),
            "failed": report.failed(),
            "results": results,
        })
    );
}
