use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::ExecutionMode;
use crate::result::{AnalyzerError, ExecutionOutput};

/// One way of turning log text into an analysis artifact.
///
/// Implementations do not enforce the per-task deadline themselves: the
/// caller wraps `execute` in a timeout and drops the future when it fires,
/// so anything held by the future (child process, poll loop) must be
/// released on drop.
#[async_trait]
pub trait AnalysisExecutor: Send + Sync {
    async fn execute(&self, task_id: &str, log_content: &str) -> Result<ExecutionOutput, AnalyzerError>;

    fn mode(&self) -> ExecutionMode;
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProxyAnalyzeRequest {
    pub request_id: String,
    pub log_content: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteStatus {
    Pending,
    Running,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProxyStatusResponse {
    #[serde(default)]
    pub request_id: String,
    pub status: RemoteStatus,
    #[serde(default)]
    pub output_file: Option<String>,
    #[serde(default, rename = "duration_seconds")]
    pub duration: Option<f64>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub content_size: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_response_tolerates_missing_fields() {
        let raw = r#"{"request_id":"AB12","status":"running"}"#;
        let parsed: ProxyStatusResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.status, RemoteStatus::Running);
        assert!(parsed.content.is_none());
        assert!(parsed.duration.is_none());
    }

    #[test]
    fn unknown_remote_status_maps_to_unknown() {
        let raw = r#"{"request_id":"AB12","status":"queued"}"#;
        let parsed: ProxyStatusResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.status, RemoteStatus::Unknown);
    }

    #[test]
    fn completed_response_carries_duration() {
        let raw = r#"{"request_id":"AB12","status":"completed","content":"ok","duration_seconds":12.5}"#;
        let parsed: ProxyStatusResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.duration, Some(12.5));
        assert_eq!(parsed.content.as_deref(), Some("ok"));
    }
}
