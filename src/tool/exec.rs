use super::base::{Tool, ToolContext, ToolError, ToolResult};
use regex::RegexSet;
use serde::Deserialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncReadExt;

const MAX_OUTPUT_CHARS: usize = 10_000;

/// (pattern, reason) pairs checked before any command is run
const DENY_PATTERNS: &[(&str, &str)] = &[
    (r"\brm\s+-[a-zA-Z]*[rf][a-zA-Z]*\s+/(\s|$|\*)", "recursive delete of the filesystem root"),
    (r"\bmkfs(\.\w+)?\b", "formatting a filesystem"),
    (r"\bdd\s+if=", "raw disk write"),
    (r">\s*/dev/sd[a-z]", "writing to a block device"),
    (r"\b(shutdown|reboot|poweroff|halt)\b", "powering off the host"),
    (r":\(\)\s*\{\s*:\|:&\s*\};\s*:", "fork bomb"),
];

/// exec - runs a shell command with a timeout and a deny list
pub struct ExecTool {
    timeout: Duration,
    deny: RegexSet,
}

#[derive(Debug, Deserialize)]
struct ExecParams {
    command: String,
    #[serde(default)]
    working_dir: Option<PathBuf>,
}

impl ExecTool {
    pub fn new(timeout_secs: u64) -> Self {
        let deny = RegexSet::new(DENY_PATTERNS.iter().map(|(p, _)| *p))
            .unwrap_or_else(|_| RegexSet::empty());
        Self {
            timeout: Duration::from_secs(timeout_secs),
            deny,
        }
    }

    /// Reason the command is refused, if it is.
    fn guard(&self, command: &str, cwd: &Path, ctx: &ToolContext) -> Option<String> {
        if let Some(idx) = self.deny.matches(command).into_iter().next() {
            return Some(DENY_PATTERNS[idx].1.to_string());
        }

        let root = ctx.allowed_dir.as_ref()?;
        if command.contains("../") || command.contains("..\\") {
            return Some("path traversal outside the workspace".into());
        }
        if !cwd.starts_with(root) {
            return Some(format!("working directory {} is outside the workspace", cwd.display()));
        }
        None
    }
}

#[async_trait::async_trait]
impl Tool for ExecTool {
    fn id(&self) -> &str {
        "exec"
    }

    fn description(&self) -> &str {
        "Execute a shell command and return its output. Use with caution."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "The shell command to execute"
                },
                "working_dir": {
                    "type": "string",
                    "description": "Optional working directory for the command"
                }
            },
            "required": ["command"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: &ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let params: ExecParams = serde_json::from_value(params)
            .map_err(|e| ToolError::InvalidParams(e.to_string()))?;

        let cwd = match &params.working_dir {
            Some(dir) => ctx.resolve_path(dir)?,
            None => ctx.working_dir.clone(),
        };

        if let Some(reason) = self.guard(&params.command, &cwd, ctx) {
            tracing::warn!(command = %params.command, %reason, "exec blocked");
            return Err(ToolError::Blocked(reason));
        }

        let mut child = tokio::process::Command::new("sh")
            .arg("-c")
            .arg(&params.command)
            .current_dir(&cwd)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ToolError::Other(e.into()))?;

        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| ToolError::Other(anyhow::anyhow!("failed to capture stdout")))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ToolError::Other(anyhow::anyhow!("failed to capture stderr")))?;

        let result = tokio::time::timeout(self.timeout, async {
            let (out, err) = tokio::join!(read_to_string(&mut stdout), read_to_string(&mut stderr));
            let status = child.wait().await?;
            Ok::<_, anyhow::Error>((out?, err?, status.code()))
        })
        .await;

        let (out, err, exit_code) = match result {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return Err(ToolError::Other(e)),
            Err(_) => {
                let _ = child.kill().await;
                return Err(ToolError::Timeout(self.timeout.as_secs()));
            }
        };

        let mut output = out;
        if !err.trim().is_empty() {
            if !output.is_empty() {
                output.push('\n');
            }
            output.push_str("STDERR:\n");
            output.push_str(&err);
        }
        if exit_code != Some(0) {
            let code = exit_code.map_or_else(|| "signal".to_string(), |c| c.to_string());
            output.push_str(&format!("\nExit code: {code}"));
        }
        if output.is_empty() {
            output.push_str("(no output)");
        }

        let total = output.chars().count();
        if total > MAX_OUTPUT_CHARS {
            output = output.chars().take(MAX_OUTPUT_CHARS).collect();
            output.push_str(&format!("\n... (truncated, {} more chars)", total - MAX_OUTPUT_CHARS));
        }

        tracing::debug!(command = %params.command, ?exit_code, "tool exec done");

        Ok(ToolResult::new(format!("$ {}", params.command), output)
            .with_metadata("exit_code", json!(exit_code))
            .with_metadata("success", json!(exit_code == Some(0))))
    }
}

async fn read_to_string<R: AsyncReadExt + Unpin>(reader: &mut R) -> anyhow::Result<String> {
    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer).await?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
