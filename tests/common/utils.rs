use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use serde_json::{Value, json};

use form_autofill::fill::runner::CancelToken;
use form_autofill::gateway::error::GatewayError;
use form_autofill::gateway::gateway::{GatewayCapabilities, ModelGateway, SessionOptions};
use form_autofill::page::page_model::DomNode;

pub fn fixture_path(name: &str) -> String {
    let base = std::env::current_dir().unwrap();
    base.join("tests").join("fixtures").join(name).display().to_string()
}

pub fn load_fixture(name: &str) -> Vec<DomNode> {
    let content = std::fs::read_to_string(fixture_path(name)).unwrap();
    serde_json::from_str(&content).unwrap()
}

// =========================================================================
// Node builders
// =========================================================================

/// A visible text-ish input with a name. Extend via json surgery.
pub fn input(node_ref: u32, name: &str, input_type: &str) -> Value {
    json!({
        "nodeRef": node_ref,
        "tag": "input",
        "type": input_type,
        "name": name,
        "rect": { "x": 0.0, "y": 0.0, "width": 220.0, "height": 32.0 },
    })
}

pub fn with_form(mut node: Value, form_index: i32) -> Value {
    node["form"] = json!({ "index": form_index });
    node
}

pub fn with_label(mut node: Value, label: &str) -> Value {
    node["labelForText"] = json!(label);
    node
}

pub fn nodes(values: Vec<Value>) -> Vec<DomNode> {
    serde_json::from_value(Value::Array(values)).unwrap()
}

// =========================================================================
// Scripted gateway
// =========================================================================

/// Gateway double replying from a canned script, one entry per prompt.
/// When the script runs dry it answers with an empty suggestion array.
pub struct ScriptedGateway {
    replies: Mutex<VecDeque<Result<String, GatewayError>>>,
    pub prompts: Mutex<Vec<String>>,
    pub destroyed: Mutex<Vec<String>>,
    /// When set, the token is cancelled during every prompt call —
    /// simulates the user hitting cancel while a batch is in flight.
    pub cancel_on_prompt: Option<CancelToken>,
}

impl ScriptedGateway {
    pub fn new(replies: Vec<Result<String, GatewayError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
            destroyed: Mutex::new(Vec::new()),
            cancel_on_prompt: None,
        }
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

impl ModelGateway for ScriptedGateway {
    fn capabilities(&self) -> Result<GatewayCapabilities, GatewayError> {
        Ok(GatewayCapabilities {
            available: true,
            model: "scripted".to_string(),
        })
    }

    fn create_session(&self, _options: &SessionOptions) -> Result<String, GatewayError> {
        Ok("scripted".to_string())
    }

    fn prompt(
        &self,
        _session_id: &str,
        text: &str,
        _timeout: Duration,
    ) -> Result<String, GatewayError> {
        self.prompts.lock().unwrap().push(text.to_string());
        if let Some(cancel) = &self.cancel_on_prompt {
            cancel.cancel();
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("[]".to_string()))
    }

    fn destroy(&self, session_id: &str) -> Result<(), GatewayError> {
        self.destroyed.lock().unwrap().push(session_id.to_string());
        Ok(())
    }
}
