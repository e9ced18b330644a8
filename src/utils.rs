use dirs::data_dir;
use once_cell::sync::Lazy;
use std::path::{Path, PathBuf};

static DATA_ROOT: Lazy<PathBuf> = Lazy::new(|| {
    let base = data_dir()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    base.join("berlin-events")
});

pub fn data_root() -> PathBuf {
    DATA_ROOT.clone()
}

pub fn config_path() -> PathBuf {
    data_root().join("config.json")
}

pub const DEFAULT_OUTPUT_FILE: &str = "berlin_events.csv";

pub fn default_output_path(data_dir: &Path) -> PathBuf {
    data_dir.join(DEFAULT_OUTPUT_FILE)
}

pub fn dated_output_path(data_dir: &Path, start: &str, end: &str) -> PathBuf {
    data_dir.join(format!("berlin_events_{start}_{end}.csv"))
}

pub fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(err) => {
            tracing::warn!(path = ?path, error = %err, "cannot resolve relative path");
            path.to_path_buf()
        }
    }
}

pub async fn ensure_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => tokio::fs::create_dir_all(parent).await,
        _ => Ok(()),
    }
}
