use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::bot::{BotClient, Message};
use crate::config::{AnalyzerConfig, ExecutionMode};
use crate::executor::AnalysisExecutor;
use crate::finalize::Finalizer;
use crate::helpers::{build_executor, format_duration, generate_short_id};
use crate::result::{AnalysisOutcome, AnalyzerError};
use crate::task::{ConcurrencyLimiter, Task, TaskStatus, TaskStore};

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━";

#[derive(Clone, Debug, Serialize)]
pub struct PluginInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub commands: Vec<String>,
}

#[derive(Clone)]
pub struct LogAnalyzerPlugin {
    config: Arc<AnalyzerConfig>,
    bot: Arc<dyn BotClient>,
    executor: Arc<dyn AnalysisExecutor>,
    tasks: Arc<TaskStore>,
    limiter: ConcurrencyLimiter,
}

impl LogAnalyzerPlugin {
    pub fn new(config: AnalyzerConfig, bot: Arc<dyn BotClient>) -> Result<Self, AnalyzerError> {
        let config = config.normalized();
        let executor = build_executor(&config)?;
        Ok(Self::with_executor(config, bot, executor))
    }

    pub fn with_executor(config: AnalyzerConfig, bot: Arc<dyn BotClient>, executor: Arc<dyn AnalysisExecutor>) -> Self {
        let config = config.normalized();
        let limiter = ConcurrencyLimiter::new(config.max_concurrent);
        Self {
            config: Arc::new(config),
            bot,
            executor,
            tasks: Arc::new(TaskStore::new()),
            limiter,
        }
    }

    pub fn info(&self) -> PluginInfo {
        PluginInfo {
            name: "loganalyzer".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: "AI-powered log analysis using knot-cli (direct or proxy mode)".to_string(),
            commands: vec![
                "analyze".to_string(),
                "analyzestatus".to_string(),
                "analyzehelp".to_string(),
            ],
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn tasks(&self) -> &TaskStore {
        &self.tasks
    }

    pub async fn on_start(&self) {
        if let Err(err) = tokio::fs::create_dir_all(&self.config.shared_data_path).await {
            warn!("failed to create shared data directory: {}", err);
        }
        info!(mode = %self.config.mode, "log analyzer plugin started");
        match self.config.mode {
            ExecutionMode::Proxy => info!(proxy_url = %self.config.proxy_url, "proxy settings"),
            ExecutionMode::Direct => info!(workspace = ?self.config.workspace_path, "direct settings"),
        }
        info!(shared_data = %self.config.shared_data_path.display(), "artifact directory");
    }

    /// Stops admitting work. Queued tasks fail and their requesters are told;
    /// running tasks finish normally.
    pub fn on_stop(&self) {
        self.limiter.close();
        info!(
            queued = self.tasks.count_with_status(TaskStatus::Pending),
            running = self.tasks.count_with_status(TaskStatus::Running),
            "log analyzer plugin stopping"
        );
    }

    /// Returns `false` when the command belongs to somebody else.
    pub async fn on_command(&self, cmd: &str, args: &[String], msg: &Message) -> bool {
        match cmd {
            "analyzehelp" | "help" => self.handle_help(msg).await,
            "analyze" => self.handle_analyze(args, msg).await,
            "analyzestatus" | "status" => self.handle_status(args, msg).await,
            _ => return false,
        }
        true
    }

    async fn handle_help(&self, msg: &Message) {
        self.reply(msg, &self.help_text()).await;
    }

    async fn handle_analyze(&self, args: &[String], msg: &Message) {
        let log_content = args.join(" ");
        if log_content.trim().is_empty() {
            self.reply(
                msg,
                "❌ Please provide log content to analyze\n\nUsage: /analyze <log_content>\nExample: /analyze [component] sendRequest request: ...",
            )
            .await;
            return;
        }

        match self.submit_analysis(&log_content, msg) {
            Ok((task, _handle)) => {
                let ack = format!(
                    "🔍 Analysis Task Created\n{}\n📋 Task ID: {}\n📝 Log Length: {} chars\n🔧 Mode: {}\n⏳ Status: Queued for analysis...\n\nUse /analyzestatus {} to check progress",
                    RULE,
                    task.id,
                    log_content.chars().count(),
                    self.config.mode,
                    task.id
                );
                self.reply(msg, &ack).await;
            }
            Err(err) => {
                self.reply(msg, &format!("❌ Plugin not properly configured: {}", err))
                    .await;
            }
        }
    }

    async fn handle_status(&self, args: &[String], msg: &Message) {
        let text = match args.first().map(|id| id.trim()).filter(|id| !id.is_empty()) {
            Some(id) => match self.tasks.get(id) {
                Some(task) => format_task_status(&task),
                None => format!("❌ Task not found: {}", id),
            },
            None => format_task_list(&self.tasks.list_by_requester(msg.user_id)),
        };
        self.reply(msg, &text).await;
    }

    /// Registers a task and starts it in the background. Configuration
    /// problems are the only errors; everything after registration is
    /// reported through the bot.
    pub fn submit_analysis(&self, log_content: &str, msg: &Message) -> Result<(Task, JoinHandle<()>), AnalyzerError> {
        self.config.validate()?;

        let task = self.tasks.create(&generate_short_id(), msg.user_id, msg.group_id);
        info!(task_id = %task.id, user_id = msg.user_id, chars = log_content.len(), "analysis task created");

        let plugin = self.clone();
        let log_content = log_content.to_string();
        let msg = msg.clone();
        let pending = task.clone();
        let handle = tokio::spawn(async move {
            plugin.run_analysis(pending, log_content, msg).await;
        });
        Ok((task, handle))
    }

    async fn run_analysis(&self, mut task: Task, log_content: String, msg: Message) {
        let _permit = match self.limiter.acquire().await {
            Ok(permit) => permit,
            Err(err) => {
                warn!(task_id = %task.id, "no analysis slot: {}", err);
                Finalizer::new(&self.tasks, self.bot.as_ref())
                    .finish(task, AnalysisOutcome::Failed(err), &msg)
                    .await;
                return;
            }
        };

        if let Err(err) = task.mark_running() {
            error!(task_id = %task.id, "cannot start task: {}", err);
            return;
        }
        if let Err(err) = self.tasks.update(&task) {
            error!(task_id = %task.id, "failed to record running task: {}", err);
        }
        info!(task_id = %task.id, mode = %self.executor.mode(), "analysis running");

        // The deadline starts once the slot is held, so queueing time is free.
        let deadline = self.config.timeout();
        let outcome = match tokio::time::timeout(deadline, self.executor.execute(&task.id, &log_content)).await {
            Ok(Ok(output)) => AnalysisOutcome::Completed(output),
            Ok(Err(err)) => AnalysisOutcome::Failed(err),
            Err(_) => AnalysisOutcome::Failed(AnalyzerError::Timeout {
                seconds: self.config.timeout_secs,
            }),
        };

        Finalizer::new(&self.tasks, self.bot.as_ref())
            .finish(task, outcome, &msg)
            .await;
    }

    fn help_text(&self) -> String {
        let mut mode_info = format!("Mode: {}", self.config.mode);
        if self.config.mode == ExecutionMode::Proxy {
            mode_info.push_str(&format!(" ({})", self.config.proxy_url));
        }
        format!(
            "🔍 Log Analyzer Plugin\n{}\nAI-powered log analysis using knot-cli\n{}\n\n\
             Available Commands:\n\n\
             📊 /analyze <log_content>\n   Analyze the given log content using AI\n   The log content should be the error log\n   you want to analyze\n\n\
             📋 /analyzestatus [task_id]\n   Check the status of an analysis task\n   Without task_id, shows all your tasks\n\n\
             ❓ /analyzehelp\n   Show this help message\n\n\
             Example:\n  /analyze [component] sendRequest request: ...",
            RULE, mode_info
        )
    }

    async fn reply(&self, msg: &Message, text: &str) {
        if let Err(err) = self.bot.reply(msg, text).await {
            warn!(user_id = msg.user_id, "failed to deliver reply: {}", err);
        }
    }
}

pub fn format_task_status(task: &Task) -> String {
    let timing = if task.status.is_terminal() {
        format!("⏱️  Duration: {}", format_duration(task.duration_secs.unwrap_or_default()))
    } else {
        format!("⏱️  Running: {}s", task.elapsed_secs().round())
    };
    let mut text = format!(
        "📊 Task Status\n{}\n📋 Task ID: {}\n{} Status: {}\n{}",
        RULE,
        task.id,
        task.status.icon(),
        task.status,
        timing
    );
    if let Some(err) = &task.error {
        text.push_str(&format!("\n❌ Error: {}", err));
    }
    text
}

pub fn format_task_list(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return "📊 You have no analysis tasks".to_string();
    }
    let mut sorted: Vec<&Task> = tasks.iter().collect();
    sorted.sort_by(|a, b| a.started_at.cmp(&b.started_at));
    let mut text = format!("📊 Your Analysis Tasks\n{}\n", RULE);
    for task in sorted {
        text.push_str(&format!("{} {}: {}\n", task.status.icon(), task.id, task.status));
    }
    text
}
