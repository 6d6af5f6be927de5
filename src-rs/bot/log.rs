use std::path::Path;

use async_trait::async_trait;
use tracing::info;

use super::types::{BotClient, Message};
use crate::result::AnalyzerError;

/// Sends everything to the log. Used when no bot API is configured.
#[derive(Default)]
pub struct LogBotClient;

#[async_trait]
impl BotClient for LogBotClient {
    async fn reply(&self, msg: &Message, text: &str) -> Result<(), AnalyzerError> {
        info!(user_id = msg.user_id, group_id = ?msg.group_id, "reply:\n{}", text);
        Ok(())
    }

    async fn upload_group_file(
        &self,
        group_id: i64,
        path: &Path,
        name: &str,
        folder: &str,
    ) -> Result<(), AnalyzerError> {
        info!(group_id, path = %path.display(), name, folder, "group upload");
        Ok(())
    }

    async fn upload_private_file(&self, user_id: i64, path: &Path, name: &str) -> Result<(), AnalyzerError> {
        info!(user_id, path = %path.display(), name, "private upload");
        Ok(())
    }
}
