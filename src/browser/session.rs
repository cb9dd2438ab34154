use std::io::{BufRead, BufReader, Write};
use std::process::{Child, Command, Stdio};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::fill::error::FillError;
use crate::page::adapter::PageAdapter;
use crate::page::field_model::FieldTarget;
use crate::page::page_model::DomNode;

const BRIDGE_SCRIPT: &str = "node/page_bridge.js";

/// Request sent to page_bridge.js over stdin (one JSON line).
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PageRequest {
    Navigate {
        cmd: &'static str,
        url: String,
    },
    Extract {
        cmd: &'static str,
    },
    Fill {
        cmd: &'static str,
        target: FieldTarget,
        value: String,
    },
    Clear {
        cmd: &'static str,
        target: FieldTarget,
    },
    Quit {
        cmd: &'static str,
    },
}

impl PageRequest {
    pub fn navigate(url: &str) -> Self {
        PageRequest::Navigate {
            cmd: "navigate",
            url: url.to_string(),
        }
    }

    pub fn extract() -> Self {
        PageRequest::Extract { cmd: "extract" }
    }

    pub fn fill(target: &FieldTarget, value: &str) -> Self {
        PageRequest::Fill {
            cmd: "fill",
            target: target.clone(),
            value: value.to_string(),
        }
    }

    pub fn clear(target: &FieldTarget) -> Self {
        PageRequest::Clear {
            cmd: "clear",
            target: target.clone(),
        }
    }

    pub fn quit() -> Self {
        PageRequest::Quit { cmd: "quit" }
    }
}

/// Response received from page_bridge.js over stdout (one JSON line).
#[derive(Debug, Deserialize)]
pub struct PageResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub nodes: Option<Value>,
    #[serde(default)]
    pub ready: Option<bool>,
}

/// A persistent page session backed by page_bridge.js.
///
/// Launches a long-lived Node.js process that keeps a Chromium page open.
/// Commands are sent as NDJSON over stdin, responses read from stdout.
pub struct PageSession {
    child: Child,
    stdin: std::process::ChildStdin,
    reader: BufReader<std::process::ChildStdout>,
    current_url: Option<String>,
}

impl PageSession {
    /// Launch a new page session by spawning page_bridge.js.
    pub fn launch() -> Result<Self, FillError> {
        let mut child = Command::new("node")
            .arg(BRIDGE_SCRIPT)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| FillError::SubprocessSpawn {
                script: BRIDGE_SCRIPT.into(),
                source: e,
            })?;

        let stdin = child.stdin.take().ok_or_else(|| {
            FillError::SessionIO("Failed to capture stdin of page_bridge.js".into())
        })?;

        let stdout = child.stdout.take().ok_or_else(|| {
            FillError::SessionIO("Failed to capture stdout of page_bridge.js".into())
        })?;

        let mut reader = BufReader::new(stdout);

        // Wait for the ready signal
        let mut line = String::new();
        reader
            .read_line(&mut line)
            .map_err(|e| FillError::SessionIO(format!("Failed to read ready signal: {}", e)))?;

        let response: PageResponse =
            serde_json::from_str(line.trim()).map_err(|e| FillError::JsonParse {
                context: "page_bridge.js ready signal".into(),
                source: e,
            })?;

        if !response.ok || response.ready != Some(true) {
            return Err(FillError::SessionProtocol {
                command: "launch".into(),
                error: "Did not receive ready signal from page_bridge.js".into(),
            });
        }

        Ok(PageSession {
            child,
            stdin,
            reader,
            current_url: None,
        })
    }

    /// Send a request and read the response.
    fn send(&mut self, request: &PageRequest) -> Result<PageResponse, FillError> {
        let json = serde_json::to_string(request).map_err(|e| FillError::JsonSerialize {
            context: "PageRequest".into(),
            source: e,
        })?;

        writeln!(self.stdin, "{}", json).map_err(|e| {
            FillError::SessionIO(format!("Failed to write to page_bridge.js stdin: {}", e))
        })?;

        self.stdin.flush().map_err(|e| {
            FillError::SessionIO(format!("Failed to flush page_bridge.js stdin: {}", e))
        })?;

        let mut line = String::new();
        self.reader.read_line(&mut line).map_err(|e| {
            FillError::SessionIO(format!("Failed to read from page_bridge.js stdout: {}", e))
        })?;

        if line.trim().is_empty() {
            return Err(FillError::SessionIO(
                "Empty response from page_bridge.js (process may have died)".into(),
            ));
        }

        let response: PageResponse =
            serde_json::from_str(line.trim()).map_err(|e| FillError::JsonParse {
                context: "page_bridge.js response".into(),
                source: e,
            })?;

        Ok(response)
    }

    /// Send a request and verify it succeeded.
    fn send_ok(&mut self, request: &PageRequest, command_name: &str) -> Result<PageResponse, FillError> {
        let response = self.send(request)?;
        if !response.ok {
            return Err(FillError::SessionProtocol {
                command: command_name.into(),
                error: response.error.unwrap_or_else(|| "Unknown error".into()),
            });
        }
        Ok(response)
    }

    /// Navigate to a URL.
    pub fn navigate(&mut self, url: &str) -> Result<(), FillError> {
        let request = PageRequest::navigate(url);
        self.send_ok(&request, "navigate")?;
        self.current_url = Some(url.to_string());
        Ok(())
    }

    /// Get the last navigated URL (cached, no bridge call).
    pub fn last_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    /// Quit the page session.
    pub fn quit(&mut self) -> Result<(), FillError> {
        let request = PageRequest::quit();
        // Best-effort quit — don't fail hard if process is already gone
        let _ = self.send(&request);
        let _ = self.child.wait();
        Ok(())
    }
}

impl PageAdapter for PageSession {
    fn snapshot(&mut self) -> Result<Vec<DomNode>, FillError> {
        let request = PageRequest::extract();
        let response = self.send_ok(&request, "extract")?;
        let nodes = response.nodes.ok_or_else(|| FillError::SessionProtocol {
            command: "extract".into(),
            error: "No nodes in extract response".into(),
        })?;
        serde_json::from_value(nodes).map_err(|e| FillError::JsonParse {
            context: "extracted node list".into(),
            source: e,
        })
    }

    fn fill(&mut self, target: &FieldTarget, value: &str) -> Result<(), FillError> {
        let request = PageRequest::fill(target, value);
        self.send_ok(&request, "fill")?;
        Ok(())
    }

    fn clear(&mut self, target: &FieldTarget) -> Result<(), FillError> {
        let request = PageRequest::clear(target);
        self.send_ok(&request, "clear")?;
        Ok(())
    }
}

impl Drop for PageSession {
    fn drop(&mut self) {
        // Best-effort cleanup
        let _ = self.quit();
    }
}
