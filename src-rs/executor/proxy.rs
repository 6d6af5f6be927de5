use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};

use super::types::{AnalysisExecutor, ProxyAnalyzeRequest, ProxyStatusResponse, RemoteStatus};
use crate::config::{artifact_name, ExecutionMode};
use crate::result::{AnalyzerError, ExecutionOutput};

#[derive(Clone, Debug)]
pub struct ProxyConfig {
    pub base_url: String,
    pub shared_data_path: PathBuf,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
}

pub struct ProxyExecutor {
    cfg: ProxyConfig,
    client: Client,
}

impl ProxyExecutor {
    pub fn new(cfg: ProxyConfig) -> Result<Self, AnalyzerError> {
        let client = Client::builder()
            .timeout(cfg.request_timeout)
            .build()
            .map_err(|err| AnalyzerError::Config(format!("failed to build proxy client: {}", err)))?;
        Ok(Self { cfg, client })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.cfg.base_url.trim_end_matches('/'), path)
    }

    async fn submit(&self, task_id: &str, log_content: &str) -> Result<(), AnalyzerError> {
        let url = self.endpoint("analyze");
        info!(task_id, %url, "sending analyze request to proxy");
        let body = ProxyAnalyzeRequest {
            request_id: task_id.to_string(),
            log_content: log_content.to_string(),
        };
        let resp = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|err| AnalyzerError::Submission(format!("failed to connect to proxy: {}", err)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AnalyzerError::Submission(format!(
                "proxy rejected request: http {}: {}",
                status.as_u16(),
                body
            )));
        }
        Ok(())
    }

    async fn poll_status(&self, task_id: &str) -> Result<ProxyStatusResponse, String> {
        let url = self.endpoint(&format!("status/{}", task_id));
        let resp = self.client.get(url).send().await.map_err(|err| err.to_string())?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(format!("http {}: {}", status.as_u16(), body));
        }
        let body = resp.text().await.map_err(|err| err.to_string())?;
        serde_json::from_str::<ProxyStatusResponse>(&body).map_err(|err| format!("failed to decode status: {}", err))
    }

    async fn persist(&self, task_id: &str, content: &str) -> PathBuf {
        let output_path = self.cfg.shared_data_path.join(artifact_name(task_id));
        if let Err(err) = tokio::fs::write(&output_path, content).await {
            warn!(task_id, "failed to save output: {}", err);
        }
        output_path
    }
}

#[async_trait]
impl AnalysisExecutor for ProxyExecutor {
    async fn execute(&self, task_id: &str, log_content: &str) -> Result<ExecutionOutput, AnalyzerError> {
        self.submit(task_id, log_content).await?;

        loop {
            tokio::time::sleep(self.cfg.poll_interval).await;

            let status = match self.poll_status(task_id).await {
                Ok(status) => status,
                Err(err) => {
                    warn!(task_id, "failed to get status: {}", err);
                    continue;
                }
            };
            debug!(task_id, status = ?status.status, "proxy status");

            match status.status {
                RemoteStatus::Completed => {
                    let content = status.content.unwrap_or_default();
                    let output_path = self.persist(task_id, &content).await;
                    return Ok(ExecutionOutput {
                        output_path,
                        content: Some(content),
                        reported_duration: status.duration.filter(|secs| *secs > 0.0),
                    });
                }
                RemoteStatus::Failed => {
                    return Err(AnalyzerError::Execution(format!(
                        "proxy error: {}",
                        status.error.unwrap_or_default()
                    )));
                }
                RemoteStatus::Pending | RemoteStatus::Running | RemoteStatus::Unknown => {}
            }
        }
    }

    fn mode(&self) -> ExecutionMode {
        ExecutionMode::Proxy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_trims_trailing_slash() {
        let executor = ProxyExecutor::new(ProxyConfig {
            base_url: "http://proxy:9999/".to_string(),
            shared_data_path: PathBuf::from("/tmp"),
            poll_interval: Duration::from_millis(10),
            request_timeout: Duration::from_secs(5),
        })
        .unwrap();
        assert_eq!(executor.endpoint("analyze"), "http://proxy:9999/analyze");
        assert_eq!(executor.endpoint("status/AB12"), "http://proxy:9999/status/AB12");
    }
}
