use super::base::{Tool, ToolContext, ToolError, ToolResult};
use serde::Deserialize;
use serde_json::json;
use similar::{ChangeTag, TextDiff};
use std::path::{Path, PathBuf};

/// write_file - creates or overwrites a file, reporting a diff for overwrites
pub struct WriteFileTool;

#[derive(Debug, Deserialize)]
struct WriteFileParams {
    path: PathBuf,
    content: String,
}

/// Unified-style line diff between two versions of a file
pub(crate) fn line_diff(filepath: &Path, old: &str, new: &str) -> String {
    let mut output = format!("--- {0}\n+++ {0}\n", filepath.display());
    for change in TextDiff::from_lines(old, new).iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => "-",
            ChangeTag::Insert => "+",
            ChangeTag::Equal => " ",
        };
        output.push_str(sign);
        output.push_str(change.as_str().unwrap_or_default());
    }
    output
}

#[async_trait::async_trait]
impl Tool for WriteFileTool {
    fn id(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Write content to a file at the given path. Creates parent directories if needed \
         and overwrites existing files."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "The file path to write to"
                },
                "content": {
                    "type": "string",
                    "description": "The content to write"
                }
            },
            "required": ["path", "content"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: &ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let params: WriteFileParams = serde_json::from_value(params)
            .map_err(|e| ToolError::InvalidParams(e.to_string()))?;

        let filepath = ctx.resolve_path(&params.path)?;

        let old_content = if filepath.is_file() {
            tokio::fs::read_to_string(&filepath).await.ok()
        } else {
            None
        };

        if let Some(parent) = filepath.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ToolError::Other(e.into()))?;
        }
        tokio::fs::write(&filepath, &params.content)
            .await
            .map_err(|e| ToolError::Other(e.into()))?;

        let mut output = format!(
            "Successfully wrote {} bytes to {}\n\n",
            params.content.len(),
            filepath.display()
        );
        match &old_content {
            Some(old) => output.push_str(&line_diff(&filepath, old, &params.content)),
            None => output.push_str(&format!("Created new file: {}\n", filepath.display())),
        }

        tracing::debug!(
            path = %filepath.display(),
            existed = old_content.is_some(),
            bytes_written = params.content.len(),
            "tool write_file done"
        );

        Ok(ToolResult::new(filepath.to_string_lossy(), output)
            .with_metadata("existed", json!(old_content.is_some()))
            .with_metadata("bytes_written", json!(params.content.len())))
    }
}
