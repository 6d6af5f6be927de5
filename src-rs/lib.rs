pub mod config;
pub mod finalize;
pub mod helpers;
pub mod plugin;
pub mod result;

#[path = "bot/lib.rs"]
pub mod bot;
#[path = "executor/lib.rs"]
pub mod executor;
#[path = "task/lib.rs"]
pub mod task;
#[path = "api/lib.rs"]
pub mod api;

pub use config::{AnalyzerConfig, ExecutionMode};
pub use plugin::LogAnalyzerPlugin;
pub use result::{AnalyzerError, ExecutionOutput};
