use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

/// One JSONL record of fill-run progress.
#[derive(Debug, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: u128,
    pub stage: String,

    pub batch: Option<usize>,
    pub field_index: Option<usize>,
    pub key: Option<String>,

    pub value: Option<String>,
    pub confidence: Option<f64>,
    pub detail: Option<String>,
}

impl TraceEvent {
    pub fn now(stage: &str) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default(),
            stage: stage.to_string(),
            batch: None,
            field_index: None,
            key: None,
            value: None,
            confidence: None,
            detail: None,
        }
    }

    pub fn with_batch(mut self, batch: usize) -> Self {
        self.batch = Some(batch);
        self
    }

    pub fn with_field(mut self, index: usize, key: &str) -> Self {
        self.field_index = Some(index);
        self.key = Some(key.to_string());
        self
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = Some(value.to_string());
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn with_detail(mut self, detail: impl ToString) -> Self {
        self.detail = Some(detail.to_string());
        self
    }
}
