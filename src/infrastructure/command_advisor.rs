use crate::domain::ports::Advisor;
use crate::error::{PlanError, Result};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Advisor backed by a shell command.
///
/// The prompt is written to the command's stdin and its stdout is taken as
/// the answer, which suits local model runners such as `ollama run <model>`.
#[derive(Debug, Clone)]
pub struct CommandAdvisor {
    command: String,
}

impl CommandAdvisor {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

#[async_trait]
impl Advisor for CommandAdvisor {
    async fn complete(&self, prompt: &str) -> Result<String> {
        debug!(command = %self.command, "invoking advisor command");
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| PlanError::Advisor(format!("failed to start '{}': {e}", self.command)))?;

        if let Some(mut stdin) = child.stdin.take() {
            // A command that ignores its input may close stdin early.
            if let Err(e) = stdin.write_all(prompt.as_bytes()).await {
                debug!(error = %e, "advisor command closed stdin");
            }
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PlanError::Advisor(format!(
                "'{}' exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if text.is_empty() {
            return Err(PlanError::Advisor(format!(
                "'{}' produced no output",
                self.command
            )));
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_command_receives_prompt() {
        let advisor = CommandAdvisor::new("cat");
        let answer = advisor.complete("pay the card first").await.unwrap();
        assert_eq!(answer, "pay the card first");
    }

    #[tokio::test]
    async fn test_command_failure() {
        let advisor = CommandAdvisor::new("echo boom >&2; exit 3");
        let err = advisor.complete("hello").await.unwrap_err();
        match err {
            PlanError::Advisor(message) => assert!(message.contains("boom")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_output_is_an_error() {
        let advisor = CommandAdvisor::new("cat > /dev/null");
        assert!(matches!(
            advisor.complete("hello").await,
            Err(PlanError::Advisor(_))
        ));
    }
}
