//! Human-readable progress strings for tool calls.
//!
//! The same rendering rule feeds the live terminal indicator and the
//! "currently doing X" lines of the subagent status tool.

pub mod indicator;

pub use indicator::{ActivityEvent, ActivityIndicator};

use serde_json::Value;

/// Maximum display width for argument values (paths, commands, ...)
pub const MAX_ARG_DISPLAY: usize = 60;

const ELLIPSIS: &str = "...";

/// Tool name -> (verb, key argument shown after the verb)
const TOOL_DISPLAY: &[(&str, &str, Option<&str>)] = &[
    ("read_file", "Reading", Some("path")),
    ("write_file", "Writing", Some("path")),
    ("edit_file", "Editing", Some("path")),
    ("list_dir", "Listing", Some("path")),
    ("exec", "Running", Some("command")),
    ("web_search", "Searching", Some("query")),
    ("web_fetch", "Fetching", Some("url")),
    ("message", "Sending message", None),
    ("spawn", "Spawning subagent", Some("label")),
    ("subagent_status", "Checking subagents", Some("action")),
    ("cron", "Scheduling", Some("action")),
];

/// Truncate `value` to at most `max_len` characters.
///
/// Values that look like paths keep their tail (the most specific segment),
/// everything else keeps its head.
pub fn truncate(value: &str, max_len: usize) -> String {
    let len = value.chars().count();
    if len <= max_len {
        return value.to_string();
    }

    let keep = max_len.saturating_sub(ELLIPSIS.len());
    if value.contains('/') || value.contains('\\') {
        let tail: String = value.chars().skip(len - keep).collect();
        format!("{ELLIPSIS}{tail}")
    } else {
        let head: String = value.chars().take(keep).collect();
        format!("{head}{ELLIPSIS}")
    }
}

/// Verb and key argument for a known tool.
pub fn tool_display(tool_name: &str) -> Option<(&'static str, Option<&'static str>)> {
    TOOL_DISPLAY
        .iter()
        .find(|(name, _, _)| *name == tool_name)
        .map(|(_, verb, key)| (*verb, *key))
}

/// Format a status line for a tool call.
///
/// ```
/// use fleet::activity::format_tool_status;
/// use serde_json::json;
///
/// assert_eq!(format_tool_status("read_file", &json!({"path": "/foo/bar.py"})), "Reading /foo/bar.py");
/// assert_eq!(format_tool_status("exec", &json!({"command": "git status"})), "Running `git status`");
/// ```
pub fn format_tool_status(tool_name: &str, arguments: &Value) -> String {
    let Some((verb, key_arg)) = tool_display(tool_name) else {
        return tool_name.to_string();
    };

    let Some((key, value)) = key_arg.and_then(|k| arguments.get(k).map(|v| (k, v))) else {
        return verb.to_string();
    };

    let raw = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let shown = truncate(&raw, MAX_ARG_DISPLAY);

    if key == "command" {
        format!("{verb} `{shown}`")
    } else {
        format!("{verb} {shown}")
    }
}
