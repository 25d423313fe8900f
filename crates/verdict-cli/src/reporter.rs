//! Report rendering - display fixture verdicts

use colored::*;
use std::io::{self, Write};
use verdict_harness::{FailReason, FixtureRun, RunReport, Verdict};

/// Reporter with output configuration
pub struct Reporter {
    /// Show one line per fixture instead of progress dots
    verbose: bool,
    /// Disable colored output
    no_color: bool,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Reporter {
    /// Create a new reporter
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            no_color: false,
        }
    }

    /// Disable colored output
    pub fn with_no_color(mut self, no_color: bool) -> Self {
        self.no_color = no_color;
        self
    }

    /// Report fixture results
    pub fn report(&self, report: &RunReport) {
        if self.no_color {
            colored::control::set_override(false);
        }

        // Print individual fixture results
        for run in &report.runs {
            self.print_fixture_result(run);
        }

        // Newline before summary if not verbose (dots need newline)
        if !self.verbose && !report.runs.is_empty() {
            println!();
        }

        // Print summary
        println!();
        self.print_summary(report);

        // Print failed fixture details
        self.print_failures(report);

        // Reset color override
        if self.no_color {
            colored::control::unset_override();
        }
    }

    /// Print a single fixture result
    fn print_fixture_result(&self, run: &FixtureRun) {
        match &run.verdict {
            Verdict::Pass { duration } => {
                if self.verbose {
                    println!(
                        "{} {} ({:.2?})",
                        "PASS".green().bold(),
                        run.path.display(),
                        duration
                    );
                } else {
                    print!("{}", ".".green());
                    let _ = io::stdout().flush();
                }
            }
            Verdict::Fail { reason, duration } => {
                if self.verbose {
                    println!(
                        "{} {} ({}, {:.2?})",
                        "FAIL".red().bold(),
                        run.path.display(),
                        reason,
                        duration
                    );
                } else {
                    print!("{}", "F".red().bold());
                    let _ = io::stdout().flush();
                }
            }
        }
    }

    /// Print summary statistics
    fn print_summary(&self, report: &RunReport) {
        println!("{}", "─".repeat(50));

        let status = if report.all_passed() {
            "PASSED".green().bold()
        } else {
            "FAILED".red().bold()
        };

        let failed = report.failed();
        println!(
            "Fixture result: {} | {} total, {} passed, {} failed",
            status,
            report.total().to_string().bold(),
            report.passed().to_string().green().bold(),
            if failed > 0 {
                failed.to_string().red().bold()
            } else {
                failed.to_string().normal()
            }
        );
        println!("Time: {:.2?}", report.total_duration());
    }

    /// Print details of failed fixtures
    fn print_failures(&self, report: &RunReport) {
        let failures: Vec<&FixtureRun> = report
            .runs
            .iter()
            .filter(|r| r.verdict.is_fail())
            .collect();

        if failures.is_empty() {
            return;
        }

        println!();
        println!("{}", "Failures:".red().bold());
        println!();

        for run in failures {
            println!("  {} {}", "●".red(), run.path.display());

            if let Verdict::Fail { reason, .. } = &run.verdict {
                println!("    {}", reason);
                self.print_reason_detail(reason);
            }
            println!();
        }
    }

    /// Extra lines under a failure, depending on the reason
    fn print_reason_detail(&self, reason: &FailReason) {
        match reason {
            FailReason::Mismatch { diff } => {
                if let Some(line) = diff.first_diff_line {
                    println!("      {} {}", "first difference at line".dimmed(), line);
                }
                if let Some(expected) = &diff.expected_excerpt {
                    println!("      {} {}", "expected:".dimmed(), expected);
                }
                if let Some(actual) = &diff.actual_excerpt {
                    println!("      {} {}", "actual:  ".dimmed(), actual);
                }
            }
            FailReason::ToolFailure { stderr_tail, .. } => {
                for line in stderr_tail.lines() {
                    println!("      {}", line.dimmed());
                }
            }
            FailReason::Timeout | FailReason::Io { .. } => {}
        }
    }
}
