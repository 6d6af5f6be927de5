pub use crate::bot::{BotClient, Message};
pub use crate::config::{AnalyzerConfig, ExecutionMode};
pub use crate::plugin::{LogAnalyzerPlugin, PluginInfo};
pub use crate::task::{Task, TaskStatus, TaskStore};

pub mod handlers;
pub mod server;
