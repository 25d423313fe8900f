//! Fixture execution - drive fixtures through the tool and judge the output

use crate::diff::OutputDiff;
use crate::error::HarnessResult;
use crate::fixture::{Fixture, FixtureSet};
use crate::tool::{Invocation, RunResult, Tool};
use rayon::prelude::*;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Default per-fixture deadline
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// How many trailing stderr lines a tool-failure verdict keeps
const STDERR_TAIL_LINES: usize = 5;

/// Why a fixture failed
#[derive(Debug, Clone)]
pub enum FailReason {
    /// The tool exited non-zero or died on a signal
    ToolFailure {
        exit_code: Option<i32>,
        stderr_tail: String,
    },
    /// Captured stdout differs from the golden file
    Mismatch { diff: OutputDiff },
    /// The tool outlived its deadline and was killed
    Timeout,
    /// The fixture could not be driven at all
    Io { message: String },
}

impl fmt::Display for FailReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailReason::ToolFailure {
                exit_code: Some(code),
                ..
            } => write!(f, "tool exited with code {}", code),
            FailReason::ToolFailure {
                exit_code: None, ..
            } => write!(f, "tool killed by signal"),
            FailReason::Mismatch { diff } => write!(
                f,
                "output mismatch (expected {} bytes, got {})",
                diff.expected_len, diff.actual_len
            ),
            FailReason::Timeout => write!(f, "timeout"),
            FailReason::Io { message } => write!(f, "{}", message),
        }
    }
}

/// Verdict for a single fixture
#[derive(Debug, Clone)]
pub enum Verdict {
    /// The tool succeeded and the output matched
    Pass { duration: Duration },
    /// Something did not hold; the reason says what
    Fail {
        reason: FailReason,
        duration: Duration,
    },
}

impl Verdict {
    /// Check if this verdict is a pass
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass { .. })
    }

    /// Check if this verdict is a failure
    pub fn is_fail(&self) -> bool {
        matches!(self, Verdict::Fail { .. })
    }

    /// Get the wall-clock time behind this verdict
    pub fn duration(&self) -> Duration {
        match self {
            Verdict::Pass { duration } => *duration,
            Verdict::Fail { duration, .. } => *duration,
        }
    }
}

/// A fixture paired with its verdict
#[derive(Debug, Clone)]
pub struct FixtureRun {
    /// The fixture that was run
    pub path: PathBuf,
    /// How it went
    pub verdict: Verdict,
}

/// Aggregated outcome of one harness execution
#[derive(Debug, Default)]
pub struct RunReport {
    /// One entry per fixture, in path order
    pub runs: Vec<FixtureRun>,
}

impl RunReport {
    /// Total number of fixtures run
    pub fn total(&self) -> usize {
        self.runs.len()
    }

    /// Number of passing fixtures
    pub fn passed(&self) -> usize {
        self.runs.iter().filter(|r| r.verdict.is_pass()).count()
    }

    /// Number of failing fixtures
    pub fn failed(&self) -> usize {
        self.runs.iter().filter(|r| r.verdict.is_fail()).count()
    }

    /// Check if every fixture passed
    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }

    /// Summed wall-clock time across fixtures
    pub fn total_duration(&self) -> Duration {
        self.runs.iter().map(|r| r.verdict.duration()).sum()
    }
}

/// Harness with configuration
pub struct Harness {
    tool: Tool,
    timeout: Duration,
    jobs: Option<usize>,
    bless: bool,
}

impl Harness {
    /// Create a harness with default settings
    pub fn new(tool: Tool) -> Self {
        Self {
            tool,
            timeout: DEFAULT_TIMEOUT,
            jobs: None,
            bless: false,
        }
    }

    /// Set the per-fixture deadline
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Bound the worker pool; None means one worker per CPU
    pub fn with_jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    /// Rewrite golden files from observed output instead of comparing
    pub fn with_bless(mut self, bless: bool) -> Self {
        self.bless = bless;
        self
    }

    /// Run every fixture in the set and collect verdicts in path order
    ///
    /// Per-fixture failures never abort the batch; only a vanished tool or
    /// a pool that cannot start does.
    pub fn run(&self, set: &FixtureSet) -> HarnessResult<RunReport> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs.unwrap_or(0))
            .build()?;

        let mut runs = pool.install(|| {
            set.fixtures
                .par_iter()
                .map(|fixture| self.run_fixture(fixture))
                .collect::<HarnessResult<Vec<_>>>()
        })?;

        // Fixtures whose golden companion never loaded still get a verdict
        for scan in &set.scan_errors {
            runs.push(FixtureRun {
                path: scan.path.clone(),
                verdict: Verdict::Fail {
                    reason: FailReason::Io {
                        message: scan.message.clone(),
                    },
                    duration: Duration::ZERO,
                },
            });
        }
        runs.sort_by(|a, b| a.path.cmp(&b.path));

        Ok(RunReport { runs })
    }

    /// Drive one fixture through the tool and judge the outcome
    fn run_fixture(&self, fixture: &Fixture) -> HarnessResult<FixtureRun> {
        let verdict = match self.tool.invoke(&fixture.path, self.timeout)? {
            Invocation::Completed(result) if self.bless => bless_fixture(fixture, &result),
            Invocation::Completed(result) => judge(fixture, &result),
            Invocation::TimedOut { waited } => Verdict::Fail {
                reason: FailReason::Timeout,
                duration: waited,
            },
            Invocation::Failed { message } => Verdict::Fail {
                reason: FailReason::Io { message },
                duration: Duration::ZERO,
            },
        };

        Ok(FixtureRun {
            path: fixture.path.clone(),
            verdict,
        })
    }
}

/// Judge a completed invocation against the fixture's golden output
fn judge(fixture: &Fixture, result: &RunResult) -> Verdict {
    if !result.success() {
        return tool_failure(result);
    }

    if let Some(expected) = &fixture.expected_stdout {
        if let Some(diff) = OutputDiff::new(expected, &result.stdout) {
            return Verdict::Fail {
                reason: FailReason::Mismatch { diff },
                duration: result.duration,
            };
        }
    }

    Verdict::Pass {
        duration: result.duration,
    }
}

/// Write the observed stdout out as the new golden file
fn bless_fixture(fixture: &Fixture, result: &RunResult) -> Verdict {
    if !result.success() {
        return tool_failure(result);
    }

    let golden = fixture.golden_path();
    match fs::write(&golden, &result.stdout) {
        Ok(()) => Verdict::Pass {
            duration: result.duration,
        },
        Err(e) => Verdict::Fail {
            reason: FailReason::Io {
                message: format!("Failed to write {}: {}", golden.display(), e),
            },
            duration: result.duration,
        },
    }
}

fn tool_failure(result: &RunResult) -> Verdict {
    Verdict::Fail {
        reason: FailReason::ToolFailure {
            exit_code: result.exit_code,
            stderr_tail: stderr_tail(&result.stderr),
        },
        duration: result.duration,
    }
}

/// Trailing stderr lines, enough to surface the tool's own diagnostic
fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}
