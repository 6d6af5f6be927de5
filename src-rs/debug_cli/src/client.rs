use reqwest::blocking::Client;

use crate::models::{CommandRequest, CommandResponse, TaskInfo};

pub struct HTTPClient {
    pub base_url: String,
    client: Client,
}

impl HTTPClient {
    pub fn new(base_url: &str) -> Result<Self, String> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|err| err.to_string())?;
        Ok(Self {
            base_url: base_url.to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    pub fn command(&self, req: CommandRequest) -> Result<CommandResponse, String> {
        let resp = self
            .client
            .post(self.url("command"))
            .json(&req)
            .send()
            .map_err(|err| err.to_string())?;

        if resp.status().is_success() {
            resp.json::<CommandResponse>().map_err(|err| err.to_string())
        } else {
            let status = resp.status();
            let body = resp.text().unwrap_or_default();
            Err(format!("http {}: {}", status.as_u16(), body))
        }
    }

    pub fn list_tasks(&self, user_id: i64) -> Result<Vec<TaskInfo>, String> {
        let resp = self
            .client
            .get(self.url(&format!("tasks?user_id={}", user_id)))
            .send()
            .map_err(|err| err.to_string())?;
        if resp.status().is_success() {
            let value = resp
                .json::<serde_json::Value>()
                .map_err(|err| err.to_string())?;
            let tasks = value
                .get("tasks")
                .and_then(|v| v.as_array())
                .cloned()
                .unwrap_or_default();
            let mut out = Vec::new();
            for item in tasks {
                if let Ok(task) = serde_json::from_value::<TaskInfo>(item) {
                    out.push(task);
                }
            }
            Ok(out)
        } else {
            let status = resp.status();
            let body = resp.text().unwrap_or_default();
            Err(format!("http {}: {}", status.as_u16(), body))
        }
    }

    pub fn get_task(&self, id: &str) -> Result<TaskInfo, String> {
        let resp = self
            .client
            .get(self.url(&format!("tasks/{}", id)))
            .send()
            .map_err(|err| err.to_string())?;
        if resp.status().is_success() {
            resp.json::<TaskInfo>().map_err(|err| err.to_string())
        } else {
            let status = resp.status();
            let body = resp.text().unwrap_or_default();
            Err(format!("http {}: {}", status.as_u16(), body))
        }
    }
}
