use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use super::types::{BotClient, Message};
use crate::result::AnalyzerError;

/// Client for a OneBot v11 style HTTP API.
pub struct OneBotClient {
    base_url: String,
    token: Option<String>,
    client: Client,
}

impl OneBotClient {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, AnalyzerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|err| AnalyzerError::Config(format!("failed to build bot client: {}", err)))?;
        Ok(Self {
            base_url: base_url.to_string(),
            token,
            client,
        })
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = &self.token {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token)) {
                headers.insert(AUTHORIZATION, value);
            }
        }
        headers
    }

    async fn call(&self, action: &str, payload: Value) -> Result<(), AnalyzerError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), action);
        debug!(%url, "bot api call");
        let resp = self
            .client
            .post(url)
            .headers(self.headers())
            .json(&payload)
            .send()
            .await
            .map_err(|err| AnalyzerError::Delivery(format!("{}: {}", action, err)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AnalyzerError::Delivery(format!(
                "{}: http {}: {}",
                action,
                status.as_u16(),
                body
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl BotClient for OneBotClient {
    async fn reply(&self, msg: &Message, text: &str) -> Result<(), AnalyzerError> {
        match msg.target_group() {
            Some(group_id) => {
                self.call("send_group_msg", json!({"group_id": group_id, "message": text}))
                    .await
            }
            None => {
                self.call("send_private_msg", json!({"user_id": msg.user_id, "message": text}))
                    .await
            }
        }
    }

    async fn upload_group_file(
        &self,
        group_id: i64,
        path: &Path,
        name: &str,
        folder: &str,
    ) -> Result<(), AnalyzerError> {
        self.call(
            "upload_group_file",
            json!({
                "group_id": group_id,
                "file": path.display().to_string(),
                "name": name,
                "folder": folder,
            }),
        )
        .await
    }

    async fn upload_private_file(&self, user_id: i64, path: &Path, name: &str) -> Result<(), AnalyzerError> {
        self.call(
            "upload_private_file",
            json!({
                "user_id": user_id,
                "file": path.display().to_string(),
                "name": name,
            }),
        )
        .await
    }
}
