use std::io::{self, Write};

use crate::models::{CLIConfig, TaskInfo};

pub fn banner(cfg: &CLIConfig) {
    println!("Log Analyzer Debug CLI");
    println!("API: {}", cfg.base_url);
    println!("User: {}  Group: {}", cfg.user_id, group_label(cfg.group_id));
    println!("Replies are delivered by the bot; type /help for commands.");
}

pub fn prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}

pub fn help() {
    println!("Commands:");
    println!("  /help                 Show commands");
    println!("  /exit | /quit         Exit");
    println!("  /analyze <log>        Submit log text for analysis");
    println!("  /status [task_id]     Ask the plugin for task status");
    println!("  /tasks                List your tasks over HTTP");
    println!("  /task <task_id>       Show one task over HTTP");
    println!("  /user <id>            Act as another user");
    println!("  /group <id|none>      Send from a group or privately");
    println!("  /config               Show current config");
    println!("  /base <url>           Update base URL");
}

pub fn handled(command: &str, handled: bool) {
    if handled {
        println!("{} dispatched", command);
    } else {
        println!("{} was not handled by the plugin", command);
    }
}

pub fn task(task: &TaskInfo) {
    let timing = match task.duration_secs {
        Some(secs) => format!("{:.2}s", secs),
        None => format!("since {}", task.started_at),
    };
    println!("[{}] {} ({})", task.status, task.id, timing);
    if let Some(err) = &task.error {
        println!("    error: {}", err);
    }
}

pub fn tasks(tasks: &[TaskInfo]) {
    if tasks.is_empty() {
        println!("no tasks");
        return;
    }
    for item in tasks {
        task(item);
    }
}

pub fn config(cfg: &CLIConfig) {
    println!("config:");
    println!("  base: {}", cfg.base_url);
    println!("  user: {}", cfg.user_id);
    println!("  group: {}", group_label(cfg.group_id));
}

pub fn info(msg: &str) {
    println!("{}", msg);
}

pub fn error(msg: &str) {
    eprintln!("error: {}", msg);
}

fn group_label(group_id: Option<i64>) -> String {
    group_id.map(|id| id.to_string()).unwrap_or_else(|| "none".to_string())
}
