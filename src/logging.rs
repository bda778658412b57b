use crate::config::station::DebugLogRotation;
use crate::config::Config;
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::EnvFilter;

const LOG_FILE_NAME: &str = "fleet-debug.log";

/// Keeps the non-blocking writer alive; drop it last.
pub struct LogGuard(#[allow(dead_code)] WorkerGuard);

/// Initialize logging.
///
/// Without `debug`, events go to stderr filtered by `RUST_LOG` (default
/// `fleet=info,warn`). With `debug`, everything from this crate is written to
/// `~/.config/fleet/fleet-debug.log` (or `debug_log_path`) using the configured
/// rotation.
pub fn init(config: &Config) -> Result<Option<LogGuard>> {
    if !config.debug {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("fleet=info,warn"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init()
            .ok();
        return Ok(None);
    }

    let rotation = config.debug_log_rotation.unwrap_or(DebugLogRotation::Session);
    let base = resolve_base_log_path(config.debug_log_path.as_deref())?;
    let (writer, log_path, guard) = open_writer(&base, rotation, config.debug_log_keep)?;

    let filter = EnvFilter::try_new("fleet=debug,warn").unwrap_or_else(|_| EnvFilter::new("debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(true)
        .with_writer(writer)
        .try_init()
        .ok(); // Already initialized (tests) is fine.

    tracing::info!(log_file = %log_path.display(), rotation = ?rotation, "debug logging enabled");

    Ok(Some(LogGuard(guard)))
}

fn open_writer(
    base: &Path,
    rotation: DebugLogRotation,
    keep: Option<usize>,
) -> Result<(NonBlocking, PathBuf, WorkerGuard)> {
    let (dir, base_name) = split_dir_and_name(base)?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;

    match rotation {
        DebugLogRotation::None => {
            let file = open_append(base)?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            Ok((writer, base.to_path_buf(), guard))
        }
        DebugLogRotation::Daily => {
            // rolling::daily names files `{base_name}.{YYYY-MM-DD}`
            prune_old_logs(&dir, &format!("{base_name}."), keep.unwrap_or(7))?;
            let appender = tracing_appender::rolling::daily(&dir, &base_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            Ok((writer, base.to_path_buf(), guard))
        }
        DebugLogRotation::Session => {
            let prefix = format!("{base_name}.session-");
            prune_old_logs(&dir, &prefix, keep.unwrap_or(20))?;
            let ts = chrono::Local::now().format("%Y%m%d-%H%M%S");
            let session_path = dir.join(format!("{prefix}{ts}"));
            let file = open_append(&session_path)?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            Ok((writer, session_path, guard))
        }
    }
}

fn open_append(path: &Path) -> Result<std::fs::File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))
}

fn resolve_base_log_path(raw: Option<&str>) -> Result<PathBuf> {
    let Some(raw) = raw else {
        return Ok(crate::config::config_path()?.with_file_name(LOG_FILE_NAME));
    };

    let path = PathBuf::from(expand_tilde(raw));
    if raw.ends_with(std::path::MAIN_SEPARATOR) || path.is_dir() {
        return Ok(path.join(LOG_FILE_NAME));
    }
    Ok(path)
}

fn expand_tilde(raw: &str) -> String {
    if raw == "~" || raw.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            return format!("{}{}", home.display(), &raw[1..]);
        }
    }
    raw.to_string()
}

fn split_dir_and_name(path: &Path) -> Result<(PathBuf, String)> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .context("Invalid debug_log_path: not valid UTF-8")?
        .to_string();
    Ok((dir, name))
}

/// Remove all but the `keep - 1` newest files starting with `prefix`, leaving
/// room for the file about to be opened. `keep == 0` disables cleanup.
fn prune_old_logs(dir: &Path, prefix: &str, keep: usize) -> Result<usize> {
    if keep == 0 {
        return Ok(0);
    }

    let mut candidates: Vec<String> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read log directory: {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| name.starts_with(prefix))
        .collect();

    // Timestamp suffixes sort lexicographically.
    candidates.sort_unstable_by(|a, b| b.cmp(a));

    let mut removed = 0;
    for name in candidates.iter().skip(keep.saturating_sub(1)) {
        let path = dir.join(name);
        match std::fs::remove_file(&path) {
            Ok(()) => removed += 1,
            Err(e) => tracing::debug!(error = %e, file = %path.display(), "failed to remove old log file"),
        }
    }
    Ok(removed)
}

/// Best-effort redaction for common API key patterns (e.g. `sk-...`).
pub fn redact_secrets(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find("sk-") {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + 3..];
        let key_len = tail
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
            .unwrap_or(tail.len());

        // Short runs are probably prose, not keys.
        if key_len >= 8 {
            out.push_str("sk-***REDACTED***");
        } else {
            out.push_str(&rest[pos..pos + 3 + key_len]);
        }
        rest = &tail[key_len..];
    }

    out.push_str(rest);
    out
}
