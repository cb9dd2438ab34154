use std::fmt;
use std::process::ExitStatus;

use crate::gateway::error::GatewayError;

#[derive(Debug)]
pub enum FillError {
    /// Node.js bridge failed to spawn (page_bridge.js).
    SubprocessSpawn { script: String, source: std::io::Error },

    /// Node.js bridge exited with non-zero status.
    SubprocessFailed { script: String, status: ExitStatus, stderr: String },

    /// Stdin/stdout plumbing to the bridge broke.
    SessionIO(String),

    /// Bridge replied, but with a failure or an unexpected shape.
    SessionProtocol { command: String, error: String },

    /// JSON parsing failed (bridge output or snapshot file).
    JsonParse { context: String, source: serde_json::Error },

    /// JSON serialization failed (command to the bridge).
    JsonSerialize { context: String, source: serde_json::Error },

    /// Snapshot file could not be read.
    Snapshot { path: String, source: std::io::Error },

    /// A gateway failure that ends the whole run (session creation).
    Gateway(GatewayError),

    /// A fill run was requested while one is already active.
    RunInProgress,

    /// No suggestion was accepted across all batches.
    NoUsableOutput { auth_failed: bool },
}

impl fmt::Display for FillError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillError::SubprocessSpawn { script, source } => {
                write!(f, "Failed to spawn {} (is Node.js installed?): {}", script, source)
            }
            FillError::SubprocessFailed { script, status, stderr } => {
                write!(f, "{} exited with {}: {}", script, status, stderr)
            }
            FillError::SessionIO(msg) => {
                write!(f, "Bridge session I/O error: {}", msg)
            }
            FillError::SessionProtocol { command, error } => {
                write!(f, "Bridge command '{}' failed: {}", command, error)
            }
            FillError::JsonParse { context, source } => {
                write!(f, "JSON parse error ({}): {}", context, source)
            }
            FillError::JsonSerialize { context, source } => {
                write!(f, "JSON serialize error ({}): {}", context, source)
            }
            FillError::Snapshot { path, source } => {
                write!(f, "Failed to read snapshot '{}': {}", path, source)
            }
            FillError::Gateway(source) => {
                write!(f, "Model gateway failure: {}", source)
            }
            FillError::RunInProgress => {
                write!(f, "A fill run is already in progress")
            }
            FillError::NoUsableOutput { auth_failed: true } => {
                write!(f, "No usable model output (authentication failed — check the API key)")
            }
            FillError::NoUsableOutput { auth_failed: false } => {
                write!(f, "No usable model output: nothing was filled")
            }
        }
    }
}

impl std::error::Error for FillError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FillError::SubprocessSpawn { source, .. } => Some(source),
            FillError::JsonParse { source, .. } => Some(source),
            FillError::JsonSerialize { source, .. } => Some(source),
            FillError::Snapshot { source, .. } => Some(source),
            FillError::Gateway(source) => Some(source),
            _ => None,
        }
    }
}

impl From<GatewayError> for FillError {
    fn from(source: GatewayError) -> Self {
        FillError::Gateway(source)
    }
}
