use anyhow::Result;
use clap::Parser;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::buffer::DEFAULT_SLOT;
use crate::callback::{CallbackMatcher, DEFAULT_CALLBACK_MARKER, DEFAULT_CALLBACK_SCHEME};
use crate::title::TitleRules;

#[derive(Parser, Debug)]
#[command(name = "urlinbox")]
#[command(about = "Collects shared links for the url inbox app", long_about = None)]
pub struct Cli {
    #[arg(short = 'c', long = "config")]
    pub config_path: Option<String>,
}

pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".urlinbox")
}

pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.yaml")
}

#[derive(Debug, Deserialize, Clone)]
pub struct App {
    #[serde(default = "default_database")]
    database: String,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default = "default_slot")]
    slot: String,
}

fn default_database() -> String {
    "urlinbox.db".to_string()
}

fn default_port() -> u16 {
    7420
}

fn default_slot() -> String {
    DEFAULT_SLOT.to_string()
}

impl Default for App {
    fn default() -> Self {
        App {
            database: default_database(),
            port: default_port(),
            slot: default_slot(),
        }
    }
}

impl App {
    pub fn get_db(&self) -> &str {
        &self.database
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub fn get_slot(&self) -> &str {
        &self.slot
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Intake {
    #[serde(default = "default_callback_scheme")]
    pub callback_scheme: String,
    #[serde(default = "default_callback_marker")]
    pub callback_marker: String,
    #[serde(default)]
    pub attachment_timeout_seconds: Option<u64>,
}

fn default_callback_scheme() -> String {
    DEFAULT_CALLBACK_SCHEME.to_string()
}

fn default_callback_marker() -> String {
    DEFAULT_CALLBACK_MARKER.to_string()
}

impl Default for Intake {
    fn default() -> Self {
        Intake {
            callback_scheme: default_callback_scheme(),
            callback_marker: default_callback_marker(),
            attachment_timeout_seconds: None,
        }
    }
}

impl Intake {
    pub fn callbacks(&self) -> CallbackMatcher {
        CallbackMatcher::new(&self.callback_scheme, &self.callback_marker)
    }

    pub fn attachment_timeout(&self) -> Option<Duration> {
        self.attachment_timeout_seconds.map(Duration::from_secs)
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub app: App,
    #[serde(default)]
    pub intake: Intake,
    #[serde(default)]
    pub titles: TitleRules,
}

impl Config {
    pub fn new(path: &str) -> Result<Self> {
        let cfg = Config::load_config(path)?;
        Ok(cfg)
    }

    fn load_config(path: &str) -> Result<Config> {
        let yaml_str = fs::read_to_string(path)?;
        Config::from_yaml(&yaml_str)
    }

    pub fn from_yaml(yaml_str: &str) -> Result<Config> {
        let yaml_with_env = Config::substitute_env_vars(yaml_str)?;
        let config: Config = serde_yaml::from_str(&yaml_with_env)?;
        Ok(config)
    }

    fn substitute_env_vars(yaml_str: &str) -> Result<String> {
        let mut result = yaml_str.to_string();
        let mut offset = 0;

        while let Some(start) = result[offset..].find("${") {
            let actual_start = offset + start;
            if let Some(end) = result[actual_start..].find("}") {
                let var_name = &result[actual_start + 2..actual_start + end];

                // ${VAR:-default}
                let env_value = if let Some(default_start) = var_name.find(":-") {
                    let actual_var = &var_name[..default_start];
                    let default_val = &var_name[default_start + 2..];
                    env::var(actual_var).unwrap_or_else(|_| default_val.to_string())
                } else {
                    env::var(var_name).unwrap_or_else(|_| {
                        tracing::warn!("environment variable '{}' not found", var_name);
                        String::new()
                    })
                };

                result.replace_range(actual_start..actual_start + end + 1, &env_value);
                offset = actual_start + env_value.len();
            } else {
                break;
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let cfg = Config::from_yaml("{}").unwrap();
        assert_eq!(cfg.app.get_db(), "urlinbox.db");
        assert_eq!(cfg.app.get_port(), 7420);
        assert_eq!(cfg.app.get_slot(), "pending_data");
        assert_eq!(cfg.intake.callback_scheme, "urlinbox");
        assert_eq!(cfg.intake.attachment_timeout(), None);
        assert!(cfg.titles.is_generic("KakaoTalk"));
    }

    #[test]
    fn test_sections_and_env_defaults() {
        let yaml = r#"
app:
  port: ${URLINBOX_TEST_UNSET_PORT:-9000}
  slot: inbox
intake:
  callback_scheme: myapp
  attachment_timeout_seconds: 5
titles:
  generic: ["reddit"]
"#;
        let cfg = Config::from_yaml(yaml).unwrap();
        assert_eq!(cfg.app.get_port(), 9000);
        assert_eq!(cfg.app.get_slot(), "inbox");
        assert_eq!(cfg.app.get_db(), "urlinbox.db");
        assert_eq!(cfg.intake.callback_marker, "login-callback");
        assert_eq!(cfg.intake.attachment_timeout(), Some(Duration::from_secs(5)));
        assert!(cfg.titles.is_generic("Reddit"));
        assert!(!cfg.titles.is_generic("Instagram"));
        assert_eq!(cfg.titles.clean("Clip - YouTube"), "Clip");
    }
}
