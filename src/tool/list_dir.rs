use super::base::{Tool, ToolContext, ToolError, ToolResult};
use serde::Deserialize;
use serde_json::json;
use std::path::PathBuf;

/// list_dir - one level of a directory, directories first
pub struct ListDirTool;

#[derive(Debug, Deserialize)]
struct ListDirParams {
    path: PathBuf,
}

#[async_trait::async_trait]
impl Tool for ListDirTool {
    fn id(&self) -> &str {
        "list_dir"
    }

    fn description(&self) -> &str {
        "List the contents of a directory."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "The directory path to list"
                }
            },
            "required": ["path"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: &ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let params: ListDirParams = serde_json::from_value(params)
            .map_err(|e| ToolError::InvalidParams(e.to_string()))?;

        let dirpath = ctx.resolve_path(&params.path)?;
        if !dirpath.exists() {
            return Err(ToolError::FileNotFound(dirpath));
        }
        if !dirpath.is_dir() {
            return Err(ToolError::NotADirectory(dirpath));
        }

        let mut reader = tokio::fs::read_dir(&dirpath)
            .await
            .map_err(|e| ToolError::Other(e.into()))?;

        let mut dirs = Vec::new();
        let mut files = Vec::new();
        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|e| ToolError::Other(e.into()))?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
            if is_dir {
                dirs.push(name);
            } else {
                files.push(name);
            }
        }
        dirs.sort();
        files.sort();

        let total = dirs.len() + files.len();
        let output = if total == 0 {
            format!("Directory {} is empty", dirpath.display())
        } else {
            dirs.iter()
                .map(|d| format!("[dir]  {d}/"))
                .chain(files.iter().map(|f| format!("[file] {f}")))
                .collect::<Vec<_>>()
                .join("\n")
        };

        Ok(ToolResult::new(dirpath.to_string_lossy(), output)
            .with_metadata("entries", json!(total)))
    }
}
