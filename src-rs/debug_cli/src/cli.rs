use std::env;

use crate::models::CLIConfig;

const DEFAULT_URL: &str = "http://localhost:8080";
const DEFAULT_USER: i64 = 10000;

pub fn parse_config() -> CLIConfig {
    let mut cfg = CLIConfig {
        base_url: env_or("LOG_ANALYZER_URL", DEFAULT_URL.to_string()),
        user_id: env_i64("LOG_ANALYZER_USER").unwrap_or(DEFAULT_USER),
        group_id: env_i64("LOG_ANALYZER_GROUP"),
    };

    let args: Vec<String> = env::args().collect();
    let mut idx = 1;
    while idx < args.len() {
        match args[idx].as_str() {
            "--base" => {
                if let Some(value) = args.get(idx + 1) {
                    cfg.base_url = value.clone();
                    idx += 1;
                }
            }
            "--user" => {
                if let Some(value) = args.get(idx + 1) {
                    if let Ok(parsed) = value.parse::<i64>() {
                        cfg.user_id = parsed;
                    }
                    idx += 1;
                }
            }
            "--group" => {
                if let Some(value) = args.get(idx + 1) {
                    cfg.group_id = parse_group(value);
                    idx += 1;
                }
            }
            _ => {}
        }
        idx += 1;
    }

    cfg
}

/// `none` or a non-positive id clears the group.
pub fn parse_group(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok().filter(|id| *id > 0)
}

fn env_or(key: &str, fallback: String) -> String {
    env::var(key).unwrap_or(fallback)
}

fn env_i64(key: &str) -> Option<i64> {
    env::var(key).ok().and_then(|value| value.trim().parse::<i64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_parsing() {
        assert_eq!(parse_group("123"), Some(123));
        assert_eq!(parse_group("none"), None);
        assert_eq!(parse_group("0"), None);
    }
}
