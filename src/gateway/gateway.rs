use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::gateway::error::GatewayError;

/// Budget for a prompt round-trip. Materially longer than control calls:
/// completion latency dominates.
pub const PROMPT_TIMEOUT: Duration = Duration::from_secs(30);

/// Budget for capability and session calls.
pub const CONTROL_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Clone)]
pub struct GatewayCapabilities {
    pub available: bool,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Override the gateway's configured model for this session.
    pub model: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            model: None,
            max_tokens: 1024,
            temperature: 0.2,
        }
    }
}

/// The external model collaborator. Implementations must treat every
/// failure as call-scoped: the caller recovers per batch and never aborts
/// the run on one bad round-trip.
pub trait ModelGateway {
    fn capabilities(&self) -> Result<GatewayCapabilities, GatewayError>;
    fn create_session(&self, options: &SessionOptions) -> Result<String, GatewayError>;
    fn prompt(&self, session_id: &str, text: &str, timeout: Duration)
    -> Result<String, GatewayError>;
    fn destroy(&self, session_id: &str) -> Result<(), GatewayError>;
}

// ============================================================================
// HTTP backend (chat-completions contract)
// ============================================================================

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: Vec<ChatMessage<'a>>,
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
}

/// Chat-completions HTTP backend. Sessions are local bookkeeping — the
/// wire protocol is stateless, so a session just pins its options.
pub struct HttpGateway {
    endpoint: String,
    model: String,
    api_key: Option<String>,
    session_counter: AtomicU64,
    sessions: Mutex<HashMap<String, SessionOptions>>,
}

impl HttpGateway {
    pub fn new(endpoint: &str, model: &str, api_key: Option<String>) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            api_key,
            session_counter: AtomicU64::new(0),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn sessions(&self) -> std::sync::MutexGuard<'_, HashMap<String, SessionOptions>> {
        match self.sessions.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Pull the completion text out of a chat-completions envelope. On a
    /// malformed envelope the raw body is returned instead: the response
    /// parser downstream can still salvage it.
    fn unwrap_envelope(body: String) -> Result<String, GatewayError> {
        if body.trim().is_empty() {
            return Err(GatewayError::MalformedResponse("empty body".to_string()));
        }
        if let Ok(envelope) = serde_json::from_str::<Value>(&body) {
            if let Some(content) = envelope["choices"][0]["message"]["content"].as_str() {
                return Ok(content.to_string());
            }
        }
        Ok(body)
    }
}

impl ModelGateway for HttpGateway {
    fn capabilities(&self) -> Result<GatewayCapabilities, GatewayError> {
        Ok(GatewayCapabilities {
            available: !self.endpoint.is_empty(),
            model: self.model.clone(),
        })
    }

    fn create_session(&self, options: &SessionOptions) -> Result<String, GatewayError> {
        let n = self.session_counter.fetch_add(1, Ordering::Relaxed);
        let id = format!("s_{}", n);
        self.sessions().insert(id.clone(), options.clone());
        Ok(id)
    }

    fn prompt(
        &self,
        session_id: &str,
        text: &str,
        timeout: Duration,
    ) -> Result<String, GatewayError> {
        let options = self
            .sessions()
            .get(session_id)
            .cloned()
            .unwrap_or_default();
        let model = options.model.as_deref().unwrap_or(&self.model);

        let request = ChatRequest {
            messages: vec![ChatMessage { role: "user", content: text }],
            model,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
        };

        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(GatewayError::Network)?;

        let mut builder = client.post(&self.endpoint).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().map_err(|e| {
            if e.is_timeout() {
                GatewayError::Timeout(timeout)
            } else {
                GatewayError::Network(e)
            }
        })?;

        let status = response.status();
        let body = response.text().map_err(GatewayError::Network)?;

        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(GatewayError::Auth);
        }
        if !status.is_success() {
            let truncated: String = body.chars().take(500).collect();
            return Err(GatewayError::Http { status: status.as_u16(), body: truncated });
        }

        Self::unwrap_envelope(body)
    }

    fn destroy(&self, session_id: &str) -> Result<(), GatewayError> {
        self.sessions().remove(session_id);
        Ok(())
    }
}
