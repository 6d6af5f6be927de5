use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::config::{AnalyzerConfig, ExecutionMode};
use crate::executor::{AnalysisExecutor, DirectConfig, DirectExecutor, ProxyConfig, ProxyExecutor};
use crate::result::AnalyzerError;

pub const MAX_DISPLAY_CHARS: usize = 3000;
pub const TRUNCATION_NOTICE: &str = "\n\n... [Result truncated, see full output in file]";

/// Grace on top of the task deadline for a single proxy HTTP request.
const PROXY_REQUEST_GRACE_SECS: u64 = 30;

pub fn generate_short_id() -> String {
    let id = Uuid::new_v4().simple().to_string();
    id[..8].to_uppercase()
}

/// Returns the value after the last `:` on the first line that mentions
/// `requestid` (any case) and has a colon, or an empty string.
pub fn extract_request_id(result: &str) -> String {
    for line in result.lines() {
        if !line.to_lowercase().contains("requestid") {
            continue;
        }
        let mut parts = line.rsplit(':');
        let last = parts.next();
        if parts.next().is_some() {
            return last.unwrap_or_default().trim().to_string();
        }
    }
    String::new()
}

/// Caps chat output at [`MAX_DISPLAY_CHARS`] characters. The flag reports
/// whether anything was cut.
pub fn truncate_for_display(content: &str) -> (String, bool) {
    match content.char_indices().nth(MAX_DISPLAY_CHARS) {
        Some((cut, _)) => (format!("{}{}", &content[..cut], TRUNCATION_NOTICE), true),
        None => (content.to_string(), false),
    }
}

pub fn format_duration(secs: f64) -> String {
    format!("{:.2}s", secs)
}

pub fn build_executor(cfg: &AnalyzerConfig) -> Result<Arc<dyn AnalysisExecutor>, AnalyzerError> {
    match cfg.mode {
        ExecutionMode::Direct => Ok(Arc::new(DirectExecutor::new(DirectConfig {
            cli_path: cfg.knot_cli_path.clone(),
            workspace_path: cfg.workspace_path.clone(),
            system_prompt_path: cfg.system_prompt_path.clone(),
            shared_data_path: cfg.shared_data_path.clone(),
        }))),
        ExecutionMode::Proxy => {
            let executor = ProxyExecutor::new(ProxyConfig {
                base_url: cfg.proxy_url.clone(),
                shared_data_path: cfg.shared_data_path.clone(),
                poll_interval: cfg.poll_interval,
                request_timeout: Duration::from_secs(cfg.timeout_secs + PROXY_REQUEST_GRACE_SECS),
            })?;
            Ok(Arc::new(executor))
        }
    }
}
