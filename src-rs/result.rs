use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("{0}")]
    Config(String),
    #[error("{0}")]
    Submission(String),
    #[error("{0}")]
    Execution(String),
    #[error("analysis timed out after {seconds} seconds")]
    Timeout { seconds: u64 },
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
    #[error("task {id} cannot move from {from} to {to}")]
    InvalidTransition { id: String, from: String, to: String },
    #[error("task not found: {0}")]
    TaskNotFound(String),
    #[error("delivery failed: {0}")]
    Delivery(String),
}

impl AnalyzerError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// What an execution strategy hands to the finalizer on success.
#[derive(Clone, Debug)]
pub struct ExecutionOutput {
    pub output_path: PathBuf,
    /// Present when the strategy already holds the full text; otherwise the
    /// finalizer reads it back from `output_path`.
    pub content: Option<String>,
    /// Duration reported by the remote service, in seconds.
    pub reported_duration: Option<f64>,
}

#[derive(Debug)]
pub enum AnalysisOutcome {
    Completed(ExecutionOutput),
    Failed(AnalyzerError),
}
