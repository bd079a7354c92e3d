use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::view::Tab;

/// Environment variable that overrides `api_base`.
pub const API_BASE_ENV: &str = "ENGAGETUI_API_BASE";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub default_tab: Tab,
    #[serde(default = "default_team_limit")]
    pub team_limit: u32,
    #[serde(default = "default_callback_port")]
    pub callback_port: u16,
    #[serde(default = "default_tick_rate")]
    pub tick_rate_fps: f64,
    #[serde(default = "default_message_ttl")]
    pub message_ttl_secs: u64,
    #[serde(default = "default_share_target")]
    pub share_target_url: String,
}

fn default_api_base() -> String {
    "http://localhost:3003".to_string()
}

fn default_team_limit() -> u32 {
    50
}

fn default_callback_port() -> u16 {
    3004
}

fn default_tick_rate() -> f64 {
    30.0
}

fn default_message_ttl() -> u64 {
    6
}

fn default_share_target() -> String {
    "https://www.linkedin.com".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            default_tab: Tab::default(),
            team_limit: default_team_limit(),
            callback_port: default_callback_port(),
            tick_rate_fps: default_tick_rate(),
            message_ttl_secs: default_message_ttl(),
            share_target_url: default_share_target(),
        }
    }
}

impl AppConfig {
    pub fn message_ttl(&self) -> Duration {
        Duration::from_secs(self.message_ttl_secs)
    }

    /// Apply overrides from the environment.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(base) = lookup(API_BASE_ENV).filter(|v| !v.trim().is_empty()) {
            self.api_base = base.trim().to_string();
        }
    }
}

pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config/engagetui"))
}

fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Candidate .env paths in priority order.
fn env_file_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(dir) = config_dir() {
        paths.push(dir.join(".env"));
    }
    paths.push(PathBuf::from(".env"));
    paths
}

/// Load .env files. Variables already set in the environment win, and so
/// do earlier files.
pub fn load_env_files() {
    for path in env_file_paths() {
        if path.exists() {
            match dotenvy::from_path(&path) {
                Ok(()) => tracing::debug!(path = %path.display(), "loaded env file"),
                Err(e) => tracing::warn!(path = %path.display(), "failed to load env file: {e}"),
            }
        }
    }
}

fn parse_config(contents: &str) -> AppConfig {
    toml::from_str(contents).unwrap_or_else(|e| {
        tracing::warn!("invalid config.toml, using defaults: {e}");
        AppConfig::default()
    })
}

/// Read `config.toml` (defaults when absent) and apply env overrides.
pub fn load_config() -> AppConfig {
    load_env_files();

    let mut config = config_path()
        .and_then(|path| fs::read_to_string(path).ok())
        .map(|contents| parse_config(&contents))
        .unwrap_or_default();

    config.apply_env(|name| std::env::var(name).ok());
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = parse_config("");
        assert_eq!(config.api_base, "http://localhost:3003");
        assert_eq!(config.team_limit, 50);
        assert_eq!(config.callback_port, 3004);
        assert_eq!(config.default_tab, Tab::Leaderboard);
        assert_eq!(config.message_ttl(), Duration::from_secs(6));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = parse_config(
            r#"
            api_base = "https://engage.example.com"
            default_tab = "advocacy"
            team_limit = 10
            "#,
        );
        assert_eq!(config.api_base, "https://engage.example.com");
        assert_eq!(config.default_tab, Tab::Advocacy);
        assert_eq!(config.team_limit, 10);
        assert_eq!(config.share_target_url, "https://www.linkedin.com");
    }

    #[test]
    fn every_tab_name_parses_as_default_tab() {
        for tab in Tab::ALL {
            let name = tab.title().to_lowercase();
            let config = parse_config(&format!("default_tab = \"{name}\""));
            assert_eq!(config.default_tab, tab);
        }
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let config = parse_config("team_limit = \"lots\"");
        assert_eq!(config.team_limit, 50);
    }

    #[test]
    fn env_overrides_api_base() {
        let mut config = AppConfig::default();
        config.apply_env(|name| (name == API_BASE_ENV).then(|| " http://10.0.0.2:3003 ".into()));
        assert_eq!(config.api_base, "http://10.0.0.2:3003");

        let mut config = AppConfig::default();
        config.apply_env(|_| Some(String::new()));
        assert_eq!(config.api_base, "http://localhost:3003");
    }
}
