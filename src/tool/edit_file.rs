use super::base::{Tool, ToolContext, ToolError, ToolResult};
use super::write_file::line_diff;
use serde::Deserialize;
use serde_json::json;
use std::path::PathBuf;

/// edit_file - exact string replacement with a uniqueness check
pub struct EditFileTool;

#[derive(Debug, Deserialize)]
struct EditFileParams {
    path: PathBuf,
    old_string: String,
    new_string: String,
    #[serde(default)]
    replace_all: bool,
}

#[async_trait::async_trait]
impl Tool for EditFileTool {
    fn id(&self) -> &str {
        "edit_file"
    }

    fn description(&self) -> &str {
        "Edit a file by replacing old_string with new_string. old_string must match exactly \
         and, unless replace_all is true, occur exactly once."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "The file path to edit"
                },
                "old_string": {
                    "type": "string",
                    "description": "The exact text to find and replace"
                },
                "new_string": {
                    "type": "string",
                    "description": "The text to replace with"
                },
                "replace_all": {
                    "type": "boolean",
                    "description": "Replace every occurrence instead of requiring a unique match"
                }
            },
            "required": ["path", "old_string", "new_string"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: &ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let params: EditFileParams = serde_json::from_value(params)
            .map_err(|e| ToolError::InvalidParams(e.to_string()))?;

        if params.old_string == params.new_string {
            return Err(ToolError::OldNewIdentical);
        }
        if params.old_string.is_empty() {
            return Err(ToolError::InvalidParams("old_string cannot be empty".into()));
        }

        let filepath = ctx.resolve_path(&params.path)?;
        if !filepath.is_file() {
            return Err(ToolError::FileNotFound(filepath));
        }

        let content = match tokio::fs::read_to_string(&filepath).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                return Err(ToolError::BinaryFile(filepath))
            }
            Err(e) => return Err(ToolError::Other(e.into())),
        };

        let positions: Vec<usize> = content
            .match_indices(&params.old_string)
            .map(|(pos, _)| pos)
            .collect();

        if positions.is_empty() {
            return Err(ToolError::OldStringNotFound(params.old_string));
        }
        if !params.replace_all && positions.len() > 1 {
            return Err(ToolError::MultipleMatches {
                count: positions.len(),
                positions,
            });
        }

        let (new_content, replacements) = if params.replace_all {
            (content.replace(&params.old_string, &params.new_string), positions.len())
        } else {
            (content.replacen(&params.old_string, &params.new_string, 1), 1)
        };

        tokio::fs::write(&filepath, &new_content)
            .await
            .map_err(|e| ToolError::Other(e.into()))?;

        tracing::debug!(
            path = %filepath.display(),
            replacements,
            "tool edit_file done"
        );

        let output = format!(
            "Successfully edited {}\nReplacements made: {replacements}\n\n{}",
            filepath.display(),
            line_diff(&filepath, &content, &new_content)
        );

        Ok(ToolResult::new(filepath.to_string_lossy(), output)
            .with_metadata("replacements", json!(replacements)))
    }
}
