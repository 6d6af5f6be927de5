use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AnalyzerError;

/// The inbound message a command arrived on. Replies go back to the same
/// place: the group when `group_id` is positive, otherwise the sender.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Message {
    pub user_id: i64,
    #[serde(default)]
    pub group_id: Option<i64>,
}

impl Message {
    pub fn private(user_id: i64) -> Self {
        Self { user_id, group_id: None }
    }

    pub fn group(user_id: i64, group_id: i64) -> Self {
        Self {
            user_id,
            group_id: Some(group_id),
        }
    }

    pub fn target_group(&self) -> Option<i64> {
        self.group_id.filter(|id| *id > 0)
    }
}

#[async_trait]
pub trait BotClient: Send + Sync {
    async fn reply(&self, msg: &Message, text: &str) -> Result<(), AnalyzerError>;

    async fn upload_group_file(&self, group_id: i64, path: &Path, name: &str, folder: &str)
        -> Result<(), AnalyzerError>;

    async fn upload_private_file(&self, user_id: i64, path: &Path, name: &str) -> Result<(), AnalyzerError>;
}
