use std::process::Stdio;
use std::time::Duration;

use anyhow::{anyhow, Context as _};
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::Config;

/// Manages the external game server process: start, graceful stop with a
/// kill fallback, and console command passthrough over stdin.
pub struct ServerManager {
    command_line: String,
    working_dir: Option<String>,
    stop_timeout: Duration,
    child: Mutex<Option<Child>>,
}

impl ServerManager {
    pub fn new(config: &Config) -> Self {
        Self {
            command_line: config.game_server_command.clone(),
            working_dir: config.game_server_dir.clone(),
            stop_timeout: Duration::from_secs(config.game_server_stop_timeout_secs),
            child: Mutex::new(None),
        }
    }

    pub async fn is_running(&self) -> bool {
        let mut guard = self.child.lock().await;
        match guard.as_mut() {
            Some(child) => match child.try_wait() {
                Ok(None) => true,
                // Exited (or unobservable): drop the handle.
                _ => {
                    *guard = None;
                    false
                }
            },
            None => false,
        }
    }

    pub async fn start(&self) -> anyhow::Result<u32> {
        let mut guard = self.child.lock().await;
        if let Some(child) = guard.as_mut() {
            if matches!(child.try_wait(), Ok(None)) {
                return Err(anyhow!("server is already running"));
            }
            *guard = None;
        }

        let mut parts = self.command_line.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| anyhow!("server command is empty"))?;

        let mut command = Command::new(program);
        command
            .args(parts)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        let child = command
            .spawn()
            .with_context(|| format!("failed to spawn '{}'", self.command_line))?;
        let pid = child.id().unwrap_or(0);
        info!(pid, "game server started");

        *guard = Some(child);
        Ok(pid)
    }

    /// Asks the server to stop via its console, waits up to the configured
    /// timeout, then kills it.
    pub async fn stop(&self) -> anyhow::Result<()> {
        let mut guard = self.child.lock().await;
        let mut child = guard.take().ok_or_else(|| anyhow!("server is not running"))?;

        if let Some(stdin) = child.stdin.as_mut() {
            if let Err(error) = stdin.write_all(b"stop\n").await {
                warn!(%error, "failed to send stop command, killing process");
            }
        }

        match tokio::time::timeout(self.stop_timeout, child.wait()).await {
            Ok(status) => {
                let status = status.context("failed to wait for game server")?;
                info!(%status, "game server stopped");
            }
            Err(_) => {
                warn!("game server did not stop in time, killing it");
                child.kill().await.context("failed to kill game server")?;
            }
        }
        Ok(())
    }

    pub async fn restart(&self) -> anyhow::Result<u32> {
        if self.is_running().await {
            self.stop().await?;
        }
        self.start().await
    }

    /// Forwards one console command to the running server.
    pub async fn send_command(&self, command: &str) -> anyhow::Result<()> {
        let mut guard = self.child.lock().await;
        let child = guard.as_mut().ok_or_else(|| anyhow!("server is not running"))?;
        if !matches!(child.try_wait(), Ok(None)) {
            *guard = None;
            return Err(anyhow!("server is not running"));
        }

        let stdin = child
            .stdin
            .as_mut()
            .ok_or_else(|| anyhow!("server stdin is not available"))?;
        stdin.write_all(command.as_bytes()).await?;
        stdin.write_all(b"\n").await?;
        stdin.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::test_config;

    fn manager_with(command: &str) -> ServerManager {
        let mut config = test_config();
        config.game_server_command = command.to_string();
        config.game_server_dir = None;
        config.game_server_stop_timeout_secs = 2;
        ServerManager::new(&config)
    }

    #[tokio::test]
    async fn test_stop_without_start_fails() {
        let manager = manager_with("cat");
        assert!(manager.stop().await.is_err());
        assert!(manager.send_command("help").await.is_err());
        assert!(!manager.is_running().await);
    }

    #[tokio::test]
    async fn test_start_stop_lifecycle() {
        // `cat` reads stdin forever and exits cleanly on EOF or "stop".
        let manager = manager_with("cat");

        manager.start().await.unwrap();
        assert!(manager.is_running().await);
        assert!(manager.start().await.is_err());

        manager.send_command("say hello").await.unwrap();
        manager.stop().await.unwrap();
        assert!(!manager.is_running().await);
    }

    #[tokio::test]
    async fn test_empty_command_rejected() {
        let manager = manager_with("");
        assert!(manager.start().await.is_err());
    }
}
