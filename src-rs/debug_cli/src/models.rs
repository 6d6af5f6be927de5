use serde::{Deserialize, Serialize};

#[derive(Clone, Debug)]
pub struct CLIConfig {
    pub base_url: String,
    pub user_id: i64,
    pub group_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CommandRequest {
    pub command: String,
    pub args: Vec<String>,
    pub user_id: i64,
    pub group_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CommandResponse {
    pub handled: bool,
}

#[derive(Debug, Deserialize)]
pub struct TaskInfo {
    pub id: String,
    pub status: String,
    pub started_at: String,
    pub duration_secs: Option<f64>,
    pub error: Option<String>,
}
