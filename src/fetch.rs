use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

use crate::config::AppConfig;
use crate::models::DateRange;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("failed to launch {script:?}: {source}")]
    Spawn {
        script: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{script:?} exited with {code:?}: {stderr}")]
    Exit {
        script: PathBuf,
        code: Option<i32>,
        stderr: String,
    },
    #[error("{script:?} did not finish within {timeout:?}")]
    Timeout { script: PathBuf, timeout: Duration },
    #[error("fetch finished but {0:?} was not written")]
    MissingOutput(PathBuf),
}

/// Produces the listing CSV for `range` at `destination`.
#[async_trait]
pub trait FetchService: Send + Sync {
    async fn fetch(&self, range: &DateRange, destination: &Path) -> Result<(), FetchError>;
}

/// Runs the listing script as `<script> <start> <end> <destination>` from
/// inside the scraper directory.
#[derive(Debug, Clone)]
pub struct ScriptFetcher {
    script: PathBuf,
    working_dir: PathBuf,
    timeout: Duration,
}

impl ScriptFetcher {
    pub fn new(script: PathBuf, working_dir: PathBuf, timeout: Duration) -> Self {
        Self {
            script,
            working_dir,
            timeout,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.script_path(),
            config.scraper_dir.clone(),
            Duration::from_secs(config.fetch_timeout_secs),
        )
    }
}

#[async_trait]
impl FetchService for ScriptFetcher {
    async fn fetch(&self, range: &DateRange, destination: &Path) -> Result<(), FetchError> {
        tracing::info!(
            start = %range.start,
            end = %range.end,
            destination = ?destination,
            "fetching events"
        );

        let mut child = Command::new(&self.script)
            .arg(&range.start)
            .arg(&range.end)
            .arg(destination)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| FetchError::Spawn {
                script: self.script.clone(),
                source,
            })?;

        // Dropping the caller's future leaves the script running; only the
        // timeout below stops it.
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let waited = tokio::time::timeout(self.timeout, async {
            tokio::try_join!(child.wait(), drain(stdout), drain(stderr))
        })
        .await;

        let (status, stdout, stderr) = match waited {
            Ok(result) => result.map_err(|source| FetchError::Spawn {
                script: self.script.clone(),
                source,
            })?,
            Err(_) => {
                if let Err(err) = child.kill().await {
                    tracing::warn!(
                        script = ?self.script,
                        error = %err,
                        "failed to kill fetch script"
                    );
                }
                return Err(FetchError::Timeout {
                    script: self.script.clone(),
                    timeout: self.timeout,
                });
            }
        };

        if !status.success() {
            return Err(FetchError::Exit {
                script: self.script.clone(),
                code: status.code(),
                stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
            });
        }
        tracing::debug!(
            stdout = %String::from_utf8_lossy(&stdout).trim(),
            "fetch script finished"
        );

        if !tokio::fs::try_exists(destination).await.unwrap_or(false) {
            return Err(FetchError::MissingOutput(destination.to_path_buf()));
        }
        Ok(())
    }
}

async fn drain<R: AsyncRead + Unpin>(pipe: Option<R>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}
