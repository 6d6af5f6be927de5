pub mod log;
pub mod onebot;
pub mod types;

pub use log::LogBotClient;
pub use onebot::OneBotClient;
pub use types::{BotClient, Message};
