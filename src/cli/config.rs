use std::collections::BTreeMap;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "form-autofill",
    version,
    about = "AI-assisted form filling from a text context"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Model endpoint (chat-completions style)
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Model name
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Path to config file (default: form-autofill.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect a page's fillable fields and print their descriptors
    Scan {
        /// URL to open in the live page bridge
        #[arg(long)]
        url: Option<String>,

        /// Pre-extracted node snapshot (JSON file) instead of a live page
        #[arg(long)]
        snapshot: Option<String>,

        /// Emit the descriptor table as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Infer values for a page's fields from a context file and fill them
    Fill {
        /// URL to open in the live page bridge
        #[arg(long)]
        url: Option<String>,

        /// Pre-extracted node snapshot (JSON file) instead of a live page
        #[arg(long)]
        snapshot: Option<String>,

        /// Path to the context text (e.g. a resume)
        #[arg(long)]
        context: String,

        /// Suggestion backend: http or heuristic
        #[arg(long)]
        backend: Option<String>,

        /// Fields per model round-trip
        #[arg(long)]
        batch_size: Option<usize>,

        /// Resolve suggestions but write nothing to the page
        #[arg(long, default_value_t = false)]
        dry_run: bool,

        /// JSONL trace output path
        #[arg(long)]
        trace: Option<String>,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `form-autofill.yaml`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub fill: FillConfig,
    /// Role → candidate values, layered over the built-in default policy.
    #[serde(default)]
    pub defaults: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Name of the environment variable holding the bearer token. The key
    /// itself never lives in config or code.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    #[serde(default = "default_context_limit")]
    pub context_limit: usize,

    #[serde(default = "default_backend")]
    pub backend: String,
}

impl Default for FillConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            context_limit: default_context_limit(),
            backend: default_backend(),
        }
    }
}

// Serde default helpers
fn default_endpoint() -> String {
    "http://localhost:11434/v1/chat/completions".to_string()
}
fn default_model() -> String {
    "qwen2.5:1.5b".to_string()
}
fn default_api_key_env() -> String {
    "FORM_AUTOFILL_API_KEY".to_string()
}
fn default_max_tokens() -> u32 {
    1024
}
fn default_temperature() -> f32 {
    0.2
}
fn default_batch_size() -> usize {
    crate::fill::runner::DEFAULT_BATCH_SIZE
}
fn default_context_limit() -> usize {
    crate::fill::runner::DEFAULT_CONTEXT_LIMIT
}
fn default_backend() -> String {
    "http".to_string()
}

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or("form-autofill.yaml");
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_default(),
        Err(_) => AppConfig::default(),
    }
}
