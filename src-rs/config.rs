use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::result::AnalyzerError;

const DEFAULT_KNOT_CLI: &str = "knot-cli";
const DEFAULT_PROXY_URL: &str = "http://host.docker.internal:9999";
const DEFAULT_SHARED_DATA: &str = "/shared-data";
const DEFAULT_MAX_CONCURRENT: usize = 3;
const DEFAULT_TIMEOUT_SECS: u64 = 300;
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Run knot-cli on this host.
    Direct,
    /// Hand the work to a knot-proxy service and poll it.
    Proxy,
}

impl ExecutionMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "direct" => Some(Self::Direct),
            "proxy" => Some(Self::Proxy),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Proxy => "proxy",
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug)]
pub struct AnalyzerConfig {
    pub mode: ExecutionMode,
    pub knot_cli_path: String,
    pub workspace_path: Option<String>,
    pub system_prompt_path: Option<String>,
    pub proxy_url: String,
    pub shared_data_path: PathBuf,
    pub max_concurrent: usize,
    pub timeout_secs: u64,
    pub poll_interval: Duration,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::Proxy,
            knot_cli_path: DEFAULT_KNOT_CLI.to_string(),
            workspace_path: None,
            system_prompt_path: None,
            proxy_url: DEFAULT_PROXY_URL.to_string(),
            shared_data_path: PathBuf::from(DEFAULT_SHARED_DATA),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl AnalyzerConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Some(mode) = env_opt("LOGANALYZER_MODE").and_then(|raw| ExecutionMode::parse(&raw)) {
            cfg.mode = mode;
        }
        if let Some(path) = env_opt("KNOT_CLI_PATH") {
            cfg.knot_cli_path = path;
        }
        if let Some(path) = env_opt("WORKSPACE_PATH") {
            cfg.workspace_path = Some(path);
        }
        if let Some(path) = env_opt("SYSTEM_PROMPT_PATH") {
            cfg.system_prompt_path = Some(path);
        }
        if let Some(url) = env_opt("KNOT_PROXY_URL") {
            cfg.proxy_url = url;
        }
        if let Some(path) = env_opt("SHARED_DATA_PATH") {
            cfg.shared_data_path = PathBuf::from(path);
        }
        cfg.max_concurrent = env_parse("LOGANALYZER_MAX_CONCURRENT", DEFAULT_MAX_CONCURRENT);
        cfg.timeout_secs = env_parse("LOGANALYZER_TIMEOUT", DEFAULT_TIMEOUT_SECS);
        cfg.normalized()
    }

    /// Clamps values that would otherwise wedge the limiter or the deadline.
    pub fn normalized(mut self) -> Self {
        if self.max_concurrent == 0 {
            self.max_concurrent = DEFAULT_MAX_CONCURRENT;
        }
        if self.timeout_secs == 0 {
            self.timeout_secs = DEFAULT_TIMEOUT_SECS;
        }
        if self.knot_cli_path.trim().is_empty() {
            self.knot_cli_path = DEFAULT_KNOT_CLI.to_string();
        }
        self
    }

    pub fn validate(&self) -> Result<(), AnalyzerError> {
        match self.mode {
            ExecutionMode::Direct if self.workspace_path.as_deref().map_or(true, str::is_empty) => {
                Err(AnalyzerError::Config(
                    "workspace path not set\nPlease set WORKSPACE_PATH environment variable".to_string(),
                ))
            }
            ExecutionMode::Proxy if self.proxy_url.trim().is_empty() => Err(AnalyzerError::Config(
                "proxy URL not set\nPlease set KNOT_PROXY_URL environment variable".to_string(),
            )),
            _ => Ok(()),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn artifact_path(&self, task_id: &str) -> PathBuf {
        self.shared_data_path.join(artifact_name(task_id))
    }
}

pub fn artifact_name(task_id: &str) -> String {
    format!("analysis_{}.txt", task_id)
}

fn env_opt(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, fallback: T) -> T {
    match env::var(key) {
        Ok(value) => value.trim().parse::<T>().unwrap_or(fallback),
        Err(_) => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_mode_requires_workspace() {
        let cfg = AnalyzerConfig {
            mode: ExecutionMode::Direct,
            ..AnalyzerConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("workspace path not set"));

        let cfg = AnalyzerConfig {
            mode: ExecutionMode::Direct,
            workspace_path: Some("/repo".to_string()),
            ..AnalyzerConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn proxy_mode_requires_url() {
        let cfg = AnalyzerConfig {
            proxy_url: "  ".to_string(),
            ..AnalyzerConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(AnalyzerError::Config(_))));
        assert!(AnalyzerConfig::default().validate().is_ok());
    }

    #[test]
    fn normalized_replaces_zero_limits() {
        let cfg = AnalyzerConfig {
            max_concurrent: 0,
            timeout_secs: 0,
            ..AnalyzerConfig::default()
        }
        .normalized();
        assert_eq!(cfg.max_concurrent, 3);
        assert_eq!(cfg.timeout_secs, 300);
    }

    #[test]
    fn artifact_path_is_keyed_by_task_id() {
        let cfg = AnalyzerConfig {
            shared_data_path: PathBuf::from("/data"),
            ..AnalyzerConfig::default()
        };
        assert_eq!(cfg.artifact_path("AB12CD34"), PathBuf::from("/data/analysis_AB12CD34.txt"));
    }

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!(ExecutionMode::parse("Direct"), Some(ExecutionMode::Direct));
        assert_eq!(ExecutionMode::parse(" proxy "), Some(ExecutionMode::Proxy));
        assert_eq!(ExecutionMode::parse("docker"), None);
    }
}
