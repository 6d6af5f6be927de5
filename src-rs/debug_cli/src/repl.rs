use std::io;

use crate::cli::parse_group;
use crate::client::HTTPClient;
use crate::models::{CLIConfig, CommandRequest};
use crate::render;

pub struct REPL {
    pub config: CLIConfig,
    pub client: HTTPClient,
}

impl REPL {
    pub fn new(config: CLIConfig, client: HTTPClient) -> Self {
        Self { config, client }
    }

    pub fn run(&mut self) {
        render::banner(&self.config);
        loop {
            render::prompt();
            let mut line = String::new();
            match io::stdin().read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }
            let line = if line.starts_with('/') {
                line
            } else {
                format!("/analyze {}", line)
            };
            if self.handle_command(&line) {
                break;
            }
        }
    }

    fn handle_command(&mut self, line: &str) -> bool {
        let mut parts = line.splitn(2, ' ');
        let cmd = parts.next().unwrap_or("").trim_start_matches('/');
        let rest = parts.next().unwrap_or("").trim();
        match cmd {
            "exit" | "quit" => return true,
            "help" => render::help(),
            "analyze" => self.dispatch("analyze", rest),
            "status" => self.dispatch("analyzestatus", rest),
            "tasks" => match self.client.list_tasks(self.config.user_id) {
                Ok(tasks) => render::tasks(&tasks),
                Err(err) => render::error(&err),
            },
            "task" => {
                if rest.is_empty() {
                    render::error("task id required");
                } else {
                    match self.client.get_task(rest) {
                        Ok(task) => render::task(&task),
                        Err(err) => render::error(&err),
                    }
                }
            }
            "user" => match rest.parse::<i64>() {
                Ok(id) => {
                    self.config.user_id = id;
                    render::info(&format!("user: {}", id));
                }
                Err(_) => render::error("invalid user id"),
            },
            "group" => {
                self.config.group_id = parse_group(rest);
                render::config(&self.config);
            }
            "config" => render::config(&self.config),
            "base" => {
                if rest.is_empty() {
                    render::info(&format!("base: {}", self.config.base_url));
                } else {
                    match HTTPClient::new(rest) {
                        Ok(client) => {
                            self.config.base_url = rest.to_string();
                            self.client = client;
                            render::info("base url updated");
                        }
                        Err(err) => render::error(&err),
                    }
                }
            }
            _ => render::info("unknown command, type /help"),
        }
        false
    }

    fn dispatch(&self, command: &str, rest: &str) {
        let req = CommandRequest {
            command: command.to_string(),
            args: rest.split_whitespace().map(str::to_string).collect(),
            user_id: self.config.user_id,
            group_id: self.config.group_id,
        };
        match self.client.command(req) {
            Ok(resp) => render::handled(command, resp.handled),
            Err(err) => render::error(&err),
        }
    }
}
