use std::{fs, path::Path, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::utils;

const ENV_SCRAPER_DIR: &str = "BERLIN_EVENTS_SCRAPER_DIR";
const ENV_SCRIPT: &str = "BERLIN_EVENTS_SCRIPT";
const ENV_DATA_DIR: &str = "BERLIN_EVENTS_DATA_DIR";
const ENV_FETCH_TIMEOUT: &str = "BERLIN_EVENTS_FETCH_TIMEOUT_SECS";
const ENV_BIND: &str = "BERLIN_EVENTS_BIND";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub scraper_dir: PathBuf,
    pub script: String,
    pub data_dir: PathBuf,
    pub fetch_timeout_secs: u64,
    pub bind: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scraper_dir: PathBuf::from("scraper"),
            script: "fetch_berlin_events.sh".to_string(),
            data_dir: utils::data_root().join("data"),
            fetch_timeout_secs: 300,
            bind: "127.0.0.1:3000".to_string(),
        }
    }
}

impl AppConfig {
    /// Reads `config.json` from the data root, then applies environment
    /// overrides. A missing or unreadable file falls back to defaults.
    pub fn load() -> Self {
        let path = utils::config_path();
        let mut config = match read_config(&path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = ?path, error = %err, "ignoring unreadable config");
                AppConfig::default()
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.scraper_dir = utils::absolutize(&config.scraper_dir);
        config.data_dir = utils::absolutize(&config.data_dir);
        config
    }

    pub fn script_path(&self) -> PathBuf {
        self.scraper_dir.join(&self.script)
    }

    fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_SCRAPER_DIR) {
            self.scraper_dir = PathBuf::from(dir);
        }
        if let Some(script) = lookup(ENV_SCRIPT) {
            self.script = script;
        }
        if let Some(dir) = lookup(ENV_DATA_DIR) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup(ENV_FETCH_TIMEOUT) {
            match raw.trim().parse() {
                Ok(secs) => self.fetch_timeout_secs = secs,
                Err(_) => tracing::warn!(value = %raw, "ignoring invalid {ENV_FETCH_TIMEOUT}"),
            }
        }
        if let Some(bind) = lookup(ENV_BIND) {
            self.bind = bind;
        }
    }
}

fn read_config(path: &Path) -> Result<AppConfig, String> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = fs::read_to_string(path).map_err(|err| err.to_string())?;
    serde_json::from_str(&contents).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = read_config(&dir.path().join("config.json")).expect("read config");
        assert_eq!(config, AppConfig::default());
        assert!(config
            .script_path()
            .ends_with("scraper/fetch_berlin_events.sh"));
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "fetch_timeout_secs": 60, "bind": "0.0.0.0:8080" }"#)
            .expect("write config");

        let config = read_config(&path).expect("read config");
        assert_eq!(config.fetch_timeout_secs, 60);
        assert_eq!(config.bind, "0.0.0.0:8080");
        assert_eq!(config.script, "fetch_berlin_events.sh");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").expect("write config");
        assert!(read_config(&path).is_err());
    }

    #[test]
    fn environment_overrides_file_values() {
        let vars: HashMap<&str, &str> = [
            (ENV_SCRAPER_DIR, "/opt/scraper"),
            (ENV_SCRIPT, "run.sh"),
            (ENV_FETCH_TIMEOUT, "45"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_env(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.script_path(), PathBuf::from("/opt/scraper/run.sh"));
        assert_eq!(config.fetch_timeout_secs, 45);

        config.apply_env(|key| (key == ENV_FETCH_TIMEOUT).then(|| "soon".to_string()));
        assert_eq!(config.fetch_timeout_secs, 45);
    }
}
