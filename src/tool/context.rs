use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use super::base::{ToolContext, ToolError};

impl ToolContext {
    /// Create a new tool context
    pub fn new(
        session_id: impl Into<String>,
        message_id: impl Into<String>,
        agent: impl Into<String>,
        working_dir: PathBuf,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            message_id: message_id.into(),
            agent: agent.into(),
            working_dir,
            allowed_dir: None,
        }
    }

    /// Confine path-taking tools to `dir`
    pub fn with_allowed_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.allowed_dir = dir;
        self
    }

    /// Resolve a tool-supplied path against the working directory and enforce
    /// the workspace restriction, if any.
    pub fn resolve_path(&self, raw: &Path) -> Result<PathBuf, ToolError> {
        let joined = if raw.is_absolute() {
            raw.to_path_buf()
        } else {
            self.working_dir.join(raw)
        };
        let resolved = normalize(&joined);

        if let Some(root) = &self.allowed_dir {
            let root = canonicalize_lenient(&normalize(root));
            if !canonicalize_lenient(&resolved).starts_with(&root) {
                return Err(ToolError::OutsideWorkspace(resolved));
            }
        }

        Ok(resolved)
    }
}

/// Lexically remove `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Canonicalize the longest existing prefix of `path` and re-append the rest,
/// so symlinks are resolved even for files that do not exist yet.
fn canonicalize_lenient(path: &Path) -> PathBuf {
    let mut existing = path;
    let mut missing: Vec<OsString> = Vec::new();

    loop {
        if let Ok(mut canonical) = std::fs::canonicalize(existing) {
            canonical.extend(missing.iter().rev());
            return canonical;
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => return path.to_path_buf(),
        }
    }
}
