//! Tool invocation - run the preprocessor under test and capture its output

use crate::error::{HarnessError, HarnessResult};
use std::env;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Interval between liveness checks while waiting for exit or deadline
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Captured output of one completed invocation
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Raw bytes the tool wrote to stdout
    pub stdout: Vec<u8>,
    /// Raw bytes the tool wrote to stderr
    pub stderr: Vec<u8>,
    /// Exit code, None when the tool was killed by a signal
    pub exit_code: Option<i32>,
    /// Wall-clock time the invocation took
    pub duration: Duration,
}

impl RunResult {
    /// Check if the tool reported success
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Outcome of driving one subprocess to exit or deadline
#[derive(Debug)]
pub enum Invocation {
    /// The tool exited on its own
    Completed(RunResult),
    /// The deadline passed and the tool was killed
    TimedOut { waited: Duration },
    /// The subprocess could not be driven
    Failed { message: String },
}

/// The preprocessor/compiler under test
#[derive(Debug, Clone)]
pub struct Tool {
    program: PathBuf,
    args: Vec<String>,
}

impl Tool {
    /// Resolve a tool by name or path
    ///
    /// Resolution happens eagerly so a missing tool aborts the run before
    /// any fixture is spawned.
    pub fn locate(program: &str) -> HarnessResult<Self> {
        resolve_program(program)
            .map(|program| Tool {
                program,
                args: Vec::new(),
            })
            .ok_or_else(|| HarnessError::tool_missing(program))
    }

    /// Set extra arguments inserted before the fixture path
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Resolved path of the tool binary
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run the tool on one fixture, enforcing the deadline
    pub fn invoke(&self, fixture: &Path, timeout: Duration) -> HarnessResult<Invocation> {
        let start = Instant::now();

        let mut child = match Command::new(&self.program)
            .args(&self.args)
            .arg(fixture)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(HarnessError::tool_missing(
                    self.program.display().to_string(),
                ));
            }
            Err(e) => {
                return Ok(Invocation::Failed {
                    message: format!("Failed to spawn {}: {}", self.program.display(), e),
                });
            }
        };

        // Drain both pipes off-thread; a full pipe buffer would wedge the
        // child while we poll for exit
        let stdout_reader = drain(child.stdout.take());
        let stderr_reader = drain(child.stderr.take());

        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if start.elapsed() >= timeout {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Ok(Invocation::TimedOut {
                            waited: start.elapsed(),
                        });
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Ok(Invocation::Failed {
                        message: format!("Failed to wait for {}: {}", self.program.display(), e),
                    });
                }
            }
        };

        let duration = start.elapsed();
        let stdout = stdout_reader.join().unwrap_or_default();
        let stderr = stderr_reader.join().unwrap_or_default();

        Ok(Invocation::Completed(RunResult {
            stdout,
            stderr,
            exit_code: status.code(),
            duration,
        }))
    }
}

/// Read a child pipe to EOF on its own thread
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}

/// Find the tool binary: bare names are searched through PATH, anything
/// with a path separator is checked as given
fn resolve_program(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }

    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|p| p.is_file())
}
