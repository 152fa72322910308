use std::process::Stdio;

use anyhow::{bail, Context, Result};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Hands generated source to an external Go formatter.
///
/// Generated source is valid without formatting, so any formatter failure
/// degrades to returning the input unchanged.
pub struct GoFormatter {
    program: String,
}

impl GoFormatter {
    /// Create a formatter running `program` over stdin.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Format `source`, falling back to the raw text on failure.
    pub async fn format(&self, source: &str) -> String {
        match self.run(source).await {
            Ok(formatted) => formatted,
            Err(e) => {
                tracing::warn!(program = %self.program, error = %e, "Formatter failed, writing raw output");
                source.to_string()
            }
        }
    }

    async fn run(&self, source: &str) -> Result<String> {
        let mut child = Command::new(&self.program)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to start {}", self.program))?;

        let mut stdin = child.stdin.take().context("Formatter stdin unavailable")?;
        let input = source.as_bytes().to_vec();
        let feed = tokio::spawn(async move {
            stdin.write_all(&input).await?;
            stdin.shutdown().await
        });

        let output = child.wait_with_output().await?;
        feed.await??;

        if !output.status.success() {
            bail!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(String::from_utf8(output.stdout)?)
    }
}
