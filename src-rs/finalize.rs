use std::path::Path;

use tracing::{error, info, warn};

use crate::bot::{BotClient, Message};
use crate::config::artifact_name;
use crate::helpers::{extract_request_id, format_duration, truncate_for_display};
use crate::result::{AnalysisOutcome, AnalyzerError, ExecutionOutput};
use crate::task::{Task, TaskStore};

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━";

/// Turns a strategy outcome into the terminal task record and exactly one
/// reply to the requester.
pub struct Finalizer<'a> {
    tasks: &'a TaskStore,
    bot: &'a dyn BotClient,
}

impl<'a> Finalizer<'a> {
    pub fn new(tasks: &'a TaskStore, bot: &'a dyn BotClient) -> Self {
        Self { tasks, bot }
    }

    pub async fn finish(&self, mut task: Task, outcome: AnalysisOutcome, msg: &Message) -> Task {
        match outcome {
            AnalysisOutcome::Failed(err) => {
                if let Err(transition_err) = task.mark_failed(&err.to_string()) {
                    error!(task_id = %task.id, "cannot fail task: {}", transition_err);
                    return task;
                }
                self.store(&task);
                warn!(task_id = %task.id, "analysis failed: {}", err);
                self.deliver(msg, &format_failure(&task)).await;
                task
            }
            AnalysisOutcome::Completed(output) => {
                if let Err(transition_err) = task.mark_completed(output.reported_duration) {
                    error!(task_id = %task.id, "cannot complete task: {}", transition_err);
                    return task;
                }
                self.store(&task);
                info!(task_id = %task.id, "analysis completed");
                self.send_result(&task, output, msg).await;
                task
            }
        }
    }

    async fn send_result(&self, task: &Task, output: ExecutionOutput, msg: &Message) {
        let content = match output.content {
            Some(content) => content,
            None => match read_artifact(&output.output_path).await {
                Ok(content) => content,
                Err(err) => {
                    warn!(task_id = %task.id, "failed to read result: {}", err);
                    self.deliver(msg, &format_read_failure(task, &output.output_path, &err))
                        .await;
                    return;
                }
            },
        };

        let request_id = extract_request_id(&content);
        let (display, truncated) = truncate_for_display(&content);
        self.deliver(
            msg,
            &format_success(task, &request_id, &output.output_path, &display),
        )
        .await;

        if truncated {
            self.upload(task, &output.output_path, msg).await;
        }
    }

    async fn upload(&self, task: &Task, path: &Path, msg: &Message) {
        let name = artifact_name(&task.id);
        let result = match msg.target_group() {
            Some(group_id) => self.bot.upload_group_file(group_id, path, &name, "/").await,
            None => self.bot.upload_private_file(msg.user_id, path, &name).await,
        };
        if let Err(err) = result {
            warn!(task_id = %task.id, "failed to upload result file: {}", err);
        }
    }

    fn store(&self, task: &Task) {
        if let Err(err) = self.tasks.update(task) {
            error!(task_id = %task.id, "failed to record task: {}", err);
        }
    }

    async fn deliver(&self, msg: &Message, text: &str) {
        if let Err(err) = self.bot.reply(msg, text).await {
            warn!(user_id = msg.user_id, "failed to deliver reply: {}", err);
        }
    }
}

async fn read_artifact(path: &Path) -> Result<String, AnalyzerError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|err| AnalyzerError::io(format!("failed to read {}", path.display()), err))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn duration_of(task: &Task) -> String {
    format_duration(task.duration_secs.unwrap_or_default())
}

pub fn format_failure(task: &Task) -> String {
    format!(
        "❌ Analysis Failed\n{}\n📋 Task ID: {}\n⏱️  Duration: {}\n❌ Error: {}",
        RULE,
        task.id,
        duration_of(task),
        task.error.as_deref().unwrap_or_default()
    )
}

pub fn format_read_failure(task: &Task, path: &Path, err: &AnalyzerError) -> String {
    format!(
        "⚠️ Analysis completed but failed to read result\n📋 Task ID: {}\n📁 Output File: {}\n❌ Read Error: {}",
        task.id,
        path.display(),
        err
    )
}

pub fn format_success(task: &Task, request_id: &str, path: &Path, display: &str) -> String {
    let mut out = format!(
        "✅ Analysis Completed\n{}\n📋 Task ID: {}\n⏱️  Duration: {}\n",
        RULE,
        task.id,
        duration_of(task)
    );
    if !request_id.is_empty() {
        out.push_str(&format!("🔑 Request ID: {}\n", request_id));
    }
    out.push_str(&format!("📁 Output File: {}\n{}\n\n{}", path.display(), RULE, display));
    out
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn finished(error: Option<&str>) -> Task {
        let mut task = Task::new("AB12CD34", 1, None);
        task.mark_running().unwrap();
        match error {
            Some(err) => task.mark_failed(err).unwrap(),
            None => task.mark_completed(Some(3.0)).unwrap(),
        }
        task
    }

    #[test]
    fn failure_report_names_task_and_error() {
        let text = format_failure(&finished(Some("knot-cli error: exit status: 2")));
        assert!(text.contains("Analysis Failed"));
        assert!(text.contains("AB12CD34"));
        assert!(text.contains("Error: knot-cli error: exit status: 2"));
    }

    #[test]
    fn success_report_includes_request_id_only_when_found() {
        let task = finished(None);
        let path = PathBuf::from("/shared/analysis_AB12CD34.txt");
        let with_id = format_success(&task, "abc-123", &path, "body");
        assert!(with_id.contains("Request ID: abc-123"));
        assert!(with_id.contains("Duration: 3.00s"));
        assert!(with_id.ends_with("body"));

        let without = format_success(&task, "", &path, "body");
        assert!(!without.contains("Request ID"));
        assert!(without.contains("/shared/analysis_AB12CD34.txt"));
    }
}
