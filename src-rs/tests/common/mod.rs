#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use log_analyzer_rs::bot::{BotClient, Message};
use log_analyzer_rs::config::ExecutionMode;
use log_analyzer_rs::executor::AnalysisExecutor;
use log_analyzer_rs::task::{TaskStatus, TaskStore};
use log_analyzer_rs::{AnalyzerError, ExecutionOutput};
use tokio::sync::Semaphore;

#[derive(Clone, Debug, PartialEq)]
pub enum Upload {
    Group { group_id: i64, path: PathBuf, name: String, folder: String },
    Private { user_id: i64, path: PathBuf, name: String },
}

#[derive(Default)]
pub struct RecordingBot {
    replies: Mutex<Vec<(Message, String)>>,
    uploads: Mutex<Vec<Upload>>,
}

impl RecordingBot {
    pub fn replies(&self) -> Vec<String> {
        self.replies.lock().unwrap().iter().map(|(_, text)| text.clone()).collect()
    }

    pub fn last_reply(&self) -> String {
        self.replies().last().cloned().unwrap_or_default()
    }

    pub fn uploads(&self) -> Vec<Upload> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl BotClient for RecordingBot {
    async fn reply(&self, msg: &Message, text: &str) -> Result<(), AnalyzerError> {
        self.replies.lock().unwrap().push((msg.clone(), text.to_string()));
        Ok(())
    }

    async fn upload_group_file(
        &self,
        group_id: i64,
        path: &Path,
        name: &str,
        folder: &str,
    ) -> Result<(), AnalyzerError> {
        self.uploads.lock().unwrap().push(Upload::Group {
            group_id,
            path: path.to_path_buf(),
            name: name.to_string(),
            folder: folder.to_string(),
        });
        Ok(())
    }

    async fn upload_private_file(&self, user_id: i64, path: &Path, name: &str) -> Result<(), AnalyzerError> {
        self.uploads.lock().unwrap().push(Upload::Private {
            user_id,
            path: path.to_path_buf(),
            name: name.to_string(),
        });
        Ok(())
    }
}

/// Sleeps, then reports fixed content. Tracks how many runs overlap.
pub struct SlowExecutor {
    delay: Duration,
    content: String,
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl SlowExecutor {
    pub fn new(delay: Duration, content: &str) -> Self {
        Self {
            delay,
            content: content.to_string(),
            current: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnalysisExecutor for SlowExecutor {
    async fn execute(&self, task_id: &str, _log_content: &str) -> Result<ExecutionOutput, AnalyzerError> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.current.fetch_sub(1, Ordering::SeqCst);
        Ok(ExecutionOutput {
            output_path: PathBuf::from(format!("/virtual/analysis_{}.txt", task_id)),
            content: Some(self.content.clone()),
            reported_duration: None,
        })
    }

    fn mode(&self) -> ExecutionMode {
        ExecutionMode::Proxy
    }
}

/// Blocks each run until the test opens the gate once for it.
pub struct GatedExecutor {
    gate: Arc<Semaphore>,
}

impl GatedExecutor {
    pub fn new() -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        (Self { gate: gate.clone() }, gate)
    }
}

#[async_trait]
impl AnalysisExecutor for GatedExecutor {
    async fn execute(&self, task_id: &str, _log_content: &str) -> Result<ExecutionOutput, AnalyzerError> {
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|err| AnalyzerError::Execution(err.to_string()))?;
        permit.forget();
        Ok(ExecutionOutput {
            output_path: PathBuf::from(format!("/virtual/analysis_{}.txt", task_id)),
            content: Some(format!("done {}", task_id)),
            reported_duration: None,
        })
    }

    fn mode(&self) -> ExecutionMode {
        ExecutionMode::Proxy
    }
}

/// Returns a canned outcome immediately.
pub struct FixedExecutor {
    pub output: Result<ExecutionOutput, String>,
}

#[async_trait]
impl AnalysisExecutor for FixedExecutor {
    async fn execute(&self, _task_id: &str, _log_content: &str) -> Result<ExecutionOutput, AnalyzerError> {
        self.output.clone().map_err(AnalyzerError::Execution)
    }

    fn mode(&self) -> ExecutionMode {
        ExecutionMode::Direct
    }
}

pub async fn wait_for_status(store: &TaskStore, id: &str, status: TaskStatus) {
    let waited = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if store.get(id).map(|task| task.status) == Some(status) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(waited.is_ok(), "task {} never reached {}", id, status);
}

pub fn args(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}
