use super::base::{Tool, ToolContext, ToolError, ToolResult};
use serde::Deserialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

const BINARY_EXTS: &[&str] = &[
    "zip", "tar", "gz", "exe", "dll", "so", "jar", "wasm", "pyc", "bin", "dat", "db", "sqlite",
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "mp3", "mp4", "avi", "mov", "pdf",
];

/// read_file - file contents with line numbers and size limits
pub struct ReadFileTool {
    max_line_length: usize,
    max_bytes: usize,
}

impl ReadFileTool {
    pub fn new() -> Self {
        Self {
            max_line_length: 2000,
            max_bytes: 50 * 1024,
        }
    }

    /// Extension check first, then a sniff of the first 4KB.
    async fn is_binary_file(path: &Path) -> bool {
        let by_ext = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| BINARY_EXTS.contains(&ext.to_ascii_lowercase().as_str()));
        if by_ext {
            return true;
        }

        let Ok(mut file) = tokio::fs::File::open(path).await else {
            return false;
        };
        let mut buffer = [0u8; 4096];
        let n = match file.read(&mut buffer).await {
            Ok(n) if n > 0 => n,
            _ => return false,
        };

        if buffer[..n].contains(&0) {
            return true;
        }
        let non_printable = buffer[..n]
            .iter()
            .filter(|&&b| b < 9 || (b > 13 && b < 32))
            .count();
        non_printable * 10 > n * 3
    }
}

impl Default for ReadFileTool {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct ReadFileParams {
    path: PathBuf,
    #[serde(default)]
    offset: usize,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    2000
}

#[async_trait::async_trait]
impl Tool for ReadFileTool {
    fn id(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read the contents of a file at the given path. Output is line-numbered; \
         use offset/limit to page through large files."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "The file path to read"
                },
                "offset": {
                    "type": "integer",
                    "description": "Line number to start reading from (0-based, default: 0)"
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of lines to read (default: 2000)"
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
        let params: ReadFileParams = serde_json::from_value(params)
            .map_err(|e| ToolError::InvalidParams(e.to_string()))?;

        let filepath = ctx.resolve_path(&params.path)?;
        if !filepath.is_file() {
            return Err(ToolError::FileNotFound(filepath));
        }
        if Self::is_binary_file(&filepath).await {
            return Err(ToolError::BinaryFile(filepath));
        }

        let content = tokio::fs::read_to_string(&filepath)
            .await
            .map_err(|e| ToolError::Other(e.into()))?;

        let lines: Vec<&str> = content.lines().collect();
        let total_lines = lines.len();
        let start = params.offset.min(total_lines);
        let end = start.saturating_add(params.limit).min(total_lines);

        let mut output_lines = Vec::new();
        let mut bytes_count = 0;
        let mut truncated_by_bytes = false;

        for (idx, line) in lines[start..end].iter().enumerate() {
            let shown = if line.chars().count() > self.max_line_length {
                let cut: String = line.chars().take(self.max_line_length).collect();
                format!("{cut}... (line truncated)")
            } else {
                line.to_string()
            };

            let formatted = format!("{:>5}\u{2192}{}", start + idx + 1, shown);
            let line_bytes = formatted.len() + 1;
            if bytes_count + line_bytes > self.max_bytes {
                truncated_by_bytes = true;
                break;
            }
            output_lines.push(formatted);
            bytes_count += line_bytes;
        }

        let last_line = start + output_lines.len();
        let footer = if truncated_by_bytes {
            format!(
                "(Output truncated at {} bytes. Use offset={last_line} to read beyond line {last_line})",
                self.max_bytes
            )
        } else if last_line < total_lines {
            format!("(File has more lines. Use offset={last_line} to read beyond line {last_line})")
        } else {
            format!("(End of file - {total_lines} lines total)")
        };

        tracing::debug!(
            path = %filepath.display(),
            lines_read = output_lines.len(),
            total_lines,
            "tool read_file done"
        );

        Ok(ToolResult::new(
            filepath.to_string_lossy(),
            format!("{}\n\n{footer}", output_lines.join("\n")),
        )
        .with_metadata("total_lines", json!(total_lines))
        .with_metadata("lines_read", json!(output_lines.len()))
        .with_metadata("truncated", json!(truncated_by_bytes || last_line < total_lines)))
    }
}
