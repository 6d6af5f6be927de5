use std::env;
use std::sync::Arc;

use log_analyzer_rs::api::server::AnalyzerServer;
use log_analyzer_rs::bot::{BotClient, LogBotClient, OneBotClient};
use log_analyzer_rs::{AnalyzerConfig, LogAnalyzerPlugin};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = env::var("PORT")
        .ok()
        .and_then(|raw| raw.parse::<u16>().ok())
        .unwrap_or(8080);

    let bot: Arc<dyn BotClient> = match env::var("BOT_API_URL") {
        Ok(url) if !url.trim().is_empty() => {
            let token = env::var("BOT_API_TOKEN").ok().filter(|t| !t.trim().is_empty());
            match OneBotClient::new(&url, token) {
                Ok(client) => {
                    info!(%url, "delivering replies through bot API");
                    Arc::new(client)
                }
                Err(err) => {
                    error!("bot client error: {}", err);
                    return;
                }
            }
        }
        _ => {
            info!("BOT_API_URL not set, replies go to the log");
            Arc::new(LogBotClient)
        }
    };

    let plugin = match LogAnalyzerPlugin::new(AnalyzerConfig::from_env(), bot) {
        Ok(plugin) => plugin,
        Err(err) => {
            error!("plugin setup failed: {}", err);
            return;
        }
    };
    plugin.on_start().await;

    let server = AnalyzerServer::new(port, plugin.clone());
    tokio::select! {
        result = server.start() => {
            if let Err(err) = result {
                error!("server error: {}", err);
            }
        }
        _ = tokio::signal::ctrl_c() => info!("interrupt received"),
    }
    plugin.on_stop();
}
