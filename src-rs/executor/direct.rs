use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::types::AnalysisExecutor;
use crate::config::{artifact_name, ExecutionMode};
use crate::result::{AnalyzerError, ExecutionOutput};

#[derive(Clone, Debug)]
pub struct DirectConfig {
    pub cli_path: String,
    pub workspace_path: Option<String>,
    pub system_prompt_path: Option<String>,
    pub shared_data_path: PathBuf,
}

pub struct DirectExecutor {
    cfg: DirectConfig,
}

impl DirectExecutor {
    pub fn new(cfg: DirectConfig) -> Self {
        Self { cfg }
    }

    pub fn build_args(&self, log_content: &str) -> Vec<String> {
        let mut args = vec!["chat".to_string()];
        if let Some(workspace) = self.cfg.workspace_path.as_deref().filter(|p| !p.is_empty()) {
            args.push("-w".to_string());
            args.push(workspace.to_string());
        }
        if let Some(prompt) = self.cfg.system_prompt_path.as_deref().filter(|p| !p.is_empty()) {
            args.push("--system-prompt".to_string());
            args.push(prompt.to_string());
        }
        args.push("-p".to_string());
        args.push(log_content.to_string());
        args.push("--codebase".to_string());
        args
    }
}

#[async_trait]
impl AnalysisExecutor for DirectExecutor {
    async fn execute(&self, task_id: &str, log_content: &str) -> Result<ExecutionOutput, AnalyzerError> {
        let output_path = self.cfg.shared_data_path.join(artifact_name(task_id));
        let mut artifact = File::create(&output_path)
            .await
            .map_err(|err| AnalyzerError::Execution(format!("failed to create output file: {}", err)))?;

        let mut child = Command::new(&self.cfg.cli_path)
            .args(self.build_args(log_content))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| AnalyzerError::Execution(format!("failed to start knot-cli: {}", err)))?;
        info!(task_id, pid = ?child.id(), "knot-cli started");

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| AnalyzerError::Execution("failed to create stdout pipe".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| AnalyzerError::Execution("failed to create stderr pipe".to_string()))?;

        let mut out_lines = BufReader::new(stdout).split(b'\n');
        let mut err_lines = BufReader::new(stderr).split(b'\n');
        let mut out_done = false;
        let mut err_done = false;
        let mut collected = String::new();

        while !(out_done && err_done) {
            let line = tokio::select! {
                next = out_lines.next_segment(), if !out_done => match next {
                    Ok(Some(raw)) => Some(decode_line(&raw)),
                    Ok(None) => {
                        out_done = true;
                        None
                    }
                    Err(err) => {
                        warn!(task_id, "stdout read failed: {}", err);
                        out_done = true;
                        None
                    }
                },
                next = err_lines.next_segment(), if !err_done => match next {
                    Ok(Some(raw)) => {
                        let line = decode_line(&raw);
                        if keep_stderr_line(&line) {
                            Some(line)
                        } else {
                            debug!(task_id, "knot-cli progress: {}", line);
                            None
                        }
                    }
                    Ok(None) => {
                        err_done = true;
                        None
                    }
                    Err(err) => {
                        warn!(task_id, "stderr read failed: {}", err);
                        err_done = true;
                        None
                    }
                },
            };

            if let Some(line) = line {
                collected.push_str(&line);
                collected.push('\n');
                artifact
                    .write_all(format!("{}\n", line).as_bytes())
                    .await
                    .map_err(|err| AnalyzerError::io("failed to write output file", err))?;
            }
        }

        artifact
            .flush()
            .await
            .map_err(|err| AnalyzerError::io("failed to flush output file", err))?;
        drop(artifact);

        let status = child
            .wait()
            .await
            .map_err(|err| AnalyzerError::Execution(format!("knot-cli error: {}", err)))?;
        if !status.success() {
            return Err(AnalyzerError::Execution(format!("knot-cli error: {}", status)));
        }

        info!(task_id, bytes = collected.len(), "knot-cli finished");
        Ok(ExecutionOutput {
            output_path,
            content: None,
            reported_duration: None,
        })
    }

    fn mode(&self) -> ExecutionMode {
        ExecutionMode::Direct
    }
}

/// Bracketed stderr lines are progress chatter unless they carry an error.
pub fn keep_stderr_line(line: &str) -> bool {
    !line.starts_with('[') || line.contains("错误") || line.contains("Error")
}

fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}
