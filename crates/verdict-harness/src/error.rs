/// Harness error types
use std::path::PathBuf;
use thiserror::Error;

pub type HarnessResult<T> = Result<T, HarnessError>;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("Fixture root is not a directory: {path}")]
    InvalidRoot { path: PathBuf },

    #[error("Tool not found: {tool}")]
    ToolMissing { tool: String },

    #[error("Failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

impl HarnessError {
    /// Create an invalid fixture root error
    pub fn invalid_root(path: impl Into<PathBuf>) -> Self {
        Self::InvalidRoot { path: path.into() }
    }

    /// Create a missing tool error
    pub fn tool_missing(tool: impl Into<String>) -> Self {
        Self::ToolMissing { tool: tool.into() }
    }
}
