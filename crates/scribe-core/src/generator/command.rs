//! Subprocess generator adapter.
//!
//! Pipes the prompt to a configurable external command (default
//! `claude -p`) on stdin and returns its stdout as the completion.

use std::process::Stdio;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::trait_def::Generator;

/// Errors from building a [`CommandGenerator`] out of configuration.
#[derive(Debug, Error)]
pub enum GeneratorConfigError {
    #[error("generator command line is empty")]
    EmptyCommand,
}

/// Generator adapter that shells out to an external model CLI.
///
/// The prompt is written to the child's stdin; the child's entire stdout
/// is the completion. A non-zero exit status is an error (the pipeline
/// maps it to the fallback response).
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    program: String,
    args: Vec<String>,
}

impl CommandGenerator {
    /// Create an adapter for an explicit program and argument list.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Parse a whitespace-separated command line (e.g. `"claude -p"`) from
    /// configuration.
    pub fn from_command_line(line: &str) -> Result<Self, GeneratorConfigError> {
        let mut parts = line.split_whitespace();
        let program = parts.next().ok_or(GeneratorConfigError::EmptyCommand)?;
        Ok(Self {
            program: program.to_string(),
            args: parts.map(str::to_string).collect(),
        })
    }
}

impl Default for CommandGenerator {
    /// Defaults to `claude -p` found via `$PATH`.
    fn default() -> Self {
        Self::new("claude", vec!["-p".to_string()])
    }
}

#[async_trait]
impl Generator for CommandGenerator {
    fn name(&self) -> &str {
        &self.program
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to spawn generator command {:?}", self.program))?;

        let mut stdin = child
            .stdin
            .take()
            .context("generator child has no stdin handle")?;
        stdin
            .write_all(prompt.as_bytes())
            .await
            .context("failed to write prompt to generator stdin")?;
        // Close stdin so the child sees EOF and starts generating.
        drop(stdin);

        let output = child
            .wait_with_output()
            .await
            .context("failed to wait for generator command")?;

        if !output.status.success() {
            bail!(
                "generator command {:?} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
