use std::path::PathBuf;
use std::process::{Output, Stdio};
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::{AnalysisBackend, AnalysisError};
use crate::utils::PipeMap;

/// Runs the `claude` CLI in non-interactive mode, one process per prompt.
#[derive(Debug, Clone)]
pub(crate) struct ClaudeCli {
    program: PathBuf,
    model: Option<String>,
}

impl ClaudeCli {
    pub(crate) fn new(program: PathBuf, model: Option<String>) -> Self {
        Self { program, model }
    }

    /// Spawn `cmd`, feed it `prompt` on stdin and collect its output.
    async fn run(&self, mut cmd: Command, prompt: &str) -> anyhow::Result<Output> {
        let mut child = cmd
            .spawn()
            .with_context(|| format!("failed to spawn {}", self.program.display()))?;
        let mut stdin = child.stdin.take().context("stdin of the child is not piped")?;
        let write = async move {
            let written = stdin.write_all(prompt.as_bytes()).await;
            drop(stdin);
            written
        };
        let (written, output) = tokio::join!(write, child.wait_with_output());
        if let Err(e) = written {
            // a process that exits without reading its input breaks the pipe
            tracing::debug!("Could not write the whole prompt: {e}");
        }
        output.with_context(|| format!("failed to wait for {}", self.program.display()))
    }
}

#[async_trait]
impl AnalysisBackend for ClaudeCli {
    async fn analyze(&self, prompt: &str, timeout: Duration) -> Result<String, AnalysisError> {
        let mut cmd = Command::new(&self.program);
        cmd.arg("--print")
            .pipe_map(self.model.as_deref(), |cmd, model| {
                cmd.arg("--model").arg(model)
            })
            // the prompt goes through stdin, argv entries are capped at 128 KiB
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // dropping the future on timeout kills the process
            .kill_on_drop(true);

        tracing::info!("Running {} ({} byte prompt)", self.program.display(), prompt.len());
        let output = tokio::time::timeout(timeout, self.run(cmd, prompt))
            .await
            .map_err(|_| AnalysisError::Timeout(timeout))??;

        if !output.status.success() {
            return Err(AnalysisError::Backend(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_owned())
    }
}
