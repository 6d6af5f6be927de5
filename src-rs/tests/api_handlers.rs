mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use common::{RecordingBot, SlowExecutor};
use log_analyzer_rs::api::handlers::{
    handle_command, handle_health, handle_task, handle_tasks, CommandRequest, TasksQuery,
};
use log_analyzer_rs::{AnalyzerConfig, LogAnalyzerPlugin};

fn plugin(bot: Arc<RecordingBot>) -> LogAnalyzerPlugin {
    let executor = Arc::new(SlowExecutor::new(Duration::from_millis(1), "report"));
    LogAnalyzerPlugin::with_executor(AnalyzerConfig::default(), bot, executor)
}

#[tokio::test]
async fn health_reports_plugin_identity() {
    let plugin = plugin(Arc::new(RecordingBot::default()));
    let Json(body) = handle_health(State(plugin)).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["name"], "loganalyzer");
}

#[tokio::test]
async fn command_endpoint_dispatches_and_lists_tasks() {
    let bot = Arc::new(RecordingBot::default());
    let plugin = plugin(bot.clone());

    let Json(resp) = handle_command(
        State(plugin.clone()),
        Json(CommandRequest {
            command: "/analyze".to_string(),
            args: vec!["disk".to_string(), "full".to_string()],
            user_id: 12,
            group_id: None,
        }),
    )
    .await;
    assert!(resp.handled);
    assert!(bot.replies()[0].contains("Log Length: 9 chars"));

    let Json(listing) = handle_tasks(State(plugin.clone()), Query(TasksQuery { user_id: 12 })).await;
    let tasks = listing["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    let id = tasks[0]["id"].as_str().unwrap().to_string();

    let Json(task) = handle_task(State(plugin.clone()), Path(id.clone())).await.unwrap();
    assert_eq!(task["id"], id.as_str());
    assert_eq!(task["user_id"], 12);

    let Json(other) = handle_tasks(State(plugin), Query(TasksQuery { user_id: 13 })).await;
    assert!(other["tasks"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_command_is_not_handled() {
    let plugin = plugin(Arc::new(RecordingBot::default()));
    let Json(resp) = handle_command(
        State(plugin),
        Json(CommandRequest {
            command: "ping".to_string(),
            args: vec![],
            user_id: 1,
            group_id: Some(3),
        }),
    )
    .await;
    assert!(!resp.handled);
}

#[tokio::test]
async fn missing_task_is_404() {
    let plugin = plugin(Arc::new(RecordingBot::default()));
    let err = handle_task(State(plugin), Path("ZZZZZZZZ".to_string())).await.unwrap_err();
    assert_eq!(err.0, StatusCode::NOT_FOUND);
    assert_eq!(err.1 .0["error"], "task not found: ZZZZZZZZ");
}
