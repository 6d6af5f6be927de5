use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::bot::Message;
use crate::plugin::LogAnalyzerPlugin;

#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    pub user_id: i64,
    #[serde(default)]
    pub group_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub handled: bool,
}

#[derive(Debug, Deserialize)]
pub struct TasksQuery {
    pub user_id: i64,
}

pub async fn handle_health(State(plugin): State<LogAnalyzerPlugin>) -> Json<Value> {
    let info = plugin.info();
    Json(json!({"status": "ok", "name": info.name, "version": info.version}))
}

pub async fn handle_command(
    State(plugin): State<LogAnalyzerPlugin>,
    Json(req): Json<CommandRequest>,
) -> Json<CommandResponse> {
    let msg = Message {
        user_id: req.user_id,
        group_id: req.group_id,
    };
    let command = req.command.trim().trim_start_matches('/');
    let handled = plugin.on_command(command, &req.args, &msg).await;
    Json(CommandResponse { handled })
}

pub async fn handle_tasks(
    State(plugin): State<LogAnalyzerPlugin>,
    Query(query): Query<TasksQuery>,
) -> Json<Value> {
    let mut tasks = plugin.tasks().list_by_requester(query.user_id);
    tasks.sort_by(|a, b| b.started_at.cmp(&a.started_at));
    Json(json!({"tasks": tasks}))
}

pub async fn handle_task(
    State(plugin): State<LogAnalyzerPlugin>,
    Path(id): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match plugin.tasks().get(&id) {
        Some(task) => Ok(Json(json!(task))),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(json!({"error": format!("task not found: {}", id)})),
        )),
    }
}
