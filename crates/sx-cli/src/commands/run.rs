//! Run command implementation

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use sx_client::Session;
use sx_core::config::ClientConfig;
use sx_core::traits::SessionObserver;
use sx_core::{ExecuteOutcome, SessionResult};

use crate::output::{print_result, print_status, print_warning};

/// Options for `synapse-exec run`
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Script file, or `-` for stdin
    pub script: String,
    /// Print the result as JSON
    pub json: bool,
    /// Suppress attach status lines
    pub quiet: bool,
}

/// How a run ended, as seen by the shell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Succeeded,
    Failed,
    /// Nothing to run
    Skipped,
    /// Stopped by a signal
    Interrupted,
}

impl RunStatus {
    /// Process exit code
    pub fn exit_code(self) -> i32 {
        match self {
            RunStatus::Succeeded | RunStatus::Skipped => 0,
            RunStatus::Failed => 1,
            RunStatus::Interrupted => 130,
        }
    }
}

/// Prints session progress to the terminal
struct ConsoleObserver {
    json: bool,
    quiet: bool,
}

impl SessionObserver for ConsoleObserver {
    fn on_status_changed(&self, status: &str) {
        if !self.quiet && !self.json {
            print_status(status);
        }
    }

    fn on_result(&self, result: &SessionResult) {
        print_result(result, self.json);
    }
}

/// Read the script text from a file, or from stdin for `-`
pub fn read_script(source: &str) -> Result<String> {
    if source == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read script from stdin")?;
        return Ok(text);
    }

    let path = Path::new(source);
    std::fs::read_to_string(path).with_context(|| format!("Failed to read script: {:?}", path))
}

/// Execute the run command
pub async fn run_command(config: &ClientConfig, options: RunOptions) -> Result<RunStatus> {
    let text = read_script(&options.script)?;

    let observer = Arc::new(ConsoleObserver {
        json: options.json,
        quiet: options.quiet,
    });
    let session = Arc::new(Session::websocket(config, observer));

    let mut running = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.execute(&text).await })
    };

    let outcome = tokio::select! {
        joined = &mut running => joined.context("Script task failed")?,
        _ = shutdown_signal() => {
            session.shutdown().await;
            running.await.context("Script task failed")?
        }
    };
    session.shutdown().await;

    Ok(match outcome {
        ExecuteOutcome::Skipped => {
            print_warning("Script is empty, nothing to run");
            RunStatus::Skipped
        }
        ExecuteOutcome::Cancelled => {
            print_warning("Interrupted");
            RunStatus::Interrupted
        }
        ExecuteOutcome::Finished(result) if result.is_success() => RunStatus::Succeeded,
        ExecuteOutcome::Finished(_) => RunStatus::Failed,
    })
}

/// Resolves on Ctrl-C, or SIGTERM on unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(RunStatus::Succeeded.exit_code(), 0);
        assert_eq!(RunStatus::Skipped.exit_code(), 0);
        assert_eq!(RunStatus::Failed.exit_code(), 1);
        assert_eq!(RunStatus::Interrupted.exit_code(), 130);
    }

    #[test]
    fn test_read_script_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.lua");
        std::fs::write(&path, "print('hi')").unwrap();

        let text = read_script(path.to_str().unwrap()).unwrap();
        assert_eq!(text, "print('hi')");
    }

    #[test]
    fn test_read_missing_script() {
        let err = read_script("/nonexistent/script.lua").unwrap_err();
        assert!(err.to_string().contains("Failed to read script"));
    }

    #[tokio::test]
    async fn test_blank_script_is_skipped_without_connecting() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.lua");
        std::fs::write(&path, "  \n").unwrap();

        // Nothing listens here; a connection attempt would fail the run
        let config = ClientConfig {
            service_url: "ws://127.0.0.1:1/".to_string(),
            ..ClientConfig::default()
        };
        let options = RunOptions {
            script: path.to_string_lossy().into_owned(),
            json: false,
            quiet: true,
        };

        let status = run_command(&config, options).await.unwrap();
        assert_eq!(status, RunStatus::Skipped);
    }
}
