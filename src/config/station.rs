use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Default station to use
    #[serde(default = "default_station_id")]
    pub default_station: String,

    /// Write debug logs to a file instead of stderr
    #[serde(default)]
    pub debug: bool,

    /// Debug log file or directory (defaults next to config.toml)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_log_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_log_rotation: Option<DebugLogRotation>,

    /// How many rotated log files to keep
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_log_keep: Option<usize>,

    /// Available LLM stations
    #[serde(default)]
    pub stations: Vec<Station>,

    /// Background subagent settings
    #[serde(default)]
    pub subagents: SubagentSettings,

    /// Settings for the tools handed to subagents
    #[serde(default)]
    pub tools: ToolSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_station: "claude".to_string(),
            stations: vec![
                Station {
                    id: "claude".to_string(),
                    name: "Claude 3.5 Sonnet".to_string(),
                    provider: Provider::Anthropic,
                    api_key: "YOUR_API_KEY_HERE".to_string(),
                    api_base: Some("https://api.anthropic.com".to_string()),
                    model: "claude-3-5-sonnet-20241022".to_string(),
                    max_tokens: Some(8192),
                    temperature: Some(1.0),
                },
            ],
            debug: false,
            debug_log_path: None,
            debug_log_rotation: None,
            debug_log_keep: None,
            subagents: SubagentSettings::default(),
            tools: ToolSettings::default(),
        }
    }
}

impl Config {
    /// Look up the station named by `default_station`
    pub fn active_station(&self) -> Option<&Station> {
        self.stations
            .iter()
            .find(|s| s.id == self.default_station)
            .or_else(|| self.stations.first())
    }
}

/// A "station" represents one LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    /// Unique identifier for this station
    pub id: String,

    /// Human-readable name
    pub name: String,

    /// Provider type
    pub provider: Provider,

    /// API key
    pub api_key: String,

    /// Optional custom API base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,

    /// Model identifier
    pub model: String,

    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Temperature (0.0 - 1.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Supported LLM providers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Anthropic,
}

impl Provider {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::Anthropic => "https://api.anthropic.com",
        }
    }
}

/// Rotation policy for the debug log file
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DebugLogRotation {
    /// Single file, appended forever
    None,
    /// One file per day (`fleet-debug.log.YYYY-MM-DD`)
    Daily,
    /// One file per process start
    Session,
}

/// `[subagents]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SubagentSettings {
    /// Request/act cycles per runner
    pub max_iterations: u32,

    /// Finished records retained by the tracker
    pub max_completed: usize,

    /// Upper bound on simultaneously running subagents (unbounded when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_concurrent: Option<usize>,

    /// Model override (falls back to the station model)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    pub temperature: f32,

    pub max_tokens: u32,

    /// Workspace directory (defaults to the current directory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace: Option<PathBuf>,

    /// Confine file tools and exec to the workspace
    pub restrict_to_workspace: bool,
}

impl Default for SubagentSettings {
    fn default() -> Self {
        Self {
            max_iterations: 15,
            max_completed: 20,
            max_concurrent: None,
            model: None,
            temperature: 0.7,
            max_tokens: 4096,
            workspace: None,
            restrict_to_workspace: false,
        }
    }
}

/// `[tools]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    /// Timeout applied to every `exec` call
    pub exec_timeout_secs: u64,

    /// Brave Search API key (falls back to BRAVE_API_KEY)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brave_api_key: Option<String>,

    /// Characters of page text returned by `web_fetch`
    pub web_fetch_max_chars: usize,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            exec_timeout_secs: 60,
            brave_api_key: None,
            web_fetch_max_chars: 50_000,
        }
    }
}

fn default_station_id() -> String {
    "claude".to_string()
}
