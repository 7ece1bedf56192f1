use std::process::Stdio;

use async_trait::async_trait;
use tokio::{io::AsyncWriteExt, process::Command};

use super::{ProviderError, Summarizer, SummaryRequest};

/// Placeholder in the command template replaced by the configured model.
pub const MODEL_PLACEHOLDER: &str = "{model}";

/// Runs an arbitrary shell command with `prompt + "\n\n" + text` on stdin and uses its stdout.
#[derive(Debug, Clone, Default)]
pub struct CliCommand;

impl CliCommand {
    fn shell(command: &str) -> Command {
        if cfg!(windows) {
            let mut shell = Command::new("cmd");
            shell.arg("/C").arg(command);
            shell
        } else {
            let mut shell = Command::new("sh");
            shell.arg("-c").arg(command);
            shell
        }
    }
}

pub(crate) fn render_command(template: &str, model: &str) -> String {
    template.replace(MODEL_PLACEHOLDER, model)
}

#[async_trait]
impl Summarizer for CliCommand {
    async fn summarize(&self, request: &SummaryRequest) -> Result<String, ProviderError> {
        let template = request
            .cli_command
            .as_deref()
            .filter(|command| !command.trim().is_empty())
            .ok_or(ProviderError::MissingCommand)?;
        let command = render_command(template, request.model.trim());

        let mut child = Self::shell(&command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        // stdin is written while stdout is drained
        let input = format!("{}\n\n{}", request.prompt, request.text);
        let writer = child.stdin.take().map(|mut stdin| {
            tokio::spawn(async move {
                // a child may exit without reading stdin
                let _ = stdin.write_all(input.as_bytes()).await;
            })
        });

        let output = child.wait_with_output().await?;
        if let Some(writer) = writer {
            let _ = writer.await;
        }

        if !output.status.success() {
            return Err(ProviderError::CommandFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
