//! Preprocessor-conformance fixture harness
//!
//! Runs directories of C-like fixture files through an external
//! preprocessor/compiler and judges each invocation:
//! - Recursive fixture discovery with golden `.expected` companions
//! - Subprocess capture of stdout, stderr, and exit status
//! - Byte-for-byte comparison against golden output
//! - Parallel execution with a bounded worker pool
//! - Per-fixture deadlines with forcible kill
//! - Golden-file regeneration (bless mode)
//!
//! Fixtures are opaque inputs; all language correctness is delegated to
//! the tool under test.

pub mod diff;
pub mod error;
pub mod fixture;
pub mod runner;
pub mod tool;

// Re-export main types
pub use diff::OutputDiff;
pub use error::{HarnessError, HarnessResult};
pub use fixture::{Fixture, FixtureSet, ScanError};
pub use runner::{FailReason, FixtureRun, Harness, RunReport, Verdict, DEFAULT_TIMEOUT};
pub use tool::{Invocation, RunResult, Tool};
