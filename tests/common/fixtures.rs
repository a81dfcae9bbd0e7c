//! Test fixtures
//!
//! [`BatchResponder`] plays the service side of a `$batch` exchange: it reads the posted
//! payload and answers every step, so tests see the same ids they sent.

use graph_batch::{BatchConfig, ConfigBuilder};
use serde_json::{Value, json};
use std::collections::HashMap;
use wiremock::{Request, Respond, ResponseTemplate};

/// Configuration pointing at a wiremock server's `/v1.0` root
pub fn service_config(server_uri: &str, limit: usize) -> BatchConfig {
    ConfigBuilder::new()
        .base_url(&format!("{}/v1.0", server_uri))
        .batch_request_limit(limit)
        .timeout_secs(5)
        .build()
        .expect("valid test config")
}

/// How the responder answers one step
#[derive(Debug, Clone)]
pub enum StepOutcome {
    /// Error envelope with this status and code
    Error(u16, &'static str),
    /// No status field at all
    Malformed,
}

/// Answers each posted step with `200` and `{"url": <relative url>, "method": ..}` unless an
/// outcome is registered for its id
#[derive(Debug, Clone, Default)]
pub struct BatchResponder {
    outcomes: HashMap<String, StepOutcome>,
}

impl BatchResponder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_outcome(mut self, id: &str, outcome: StepOutcome) -> Self {
        self.outcomes.insert(id.to_string(), outcome);
        self
    }

    fn answer(&self, step: &Value) -> Value {
        let id = step["id"].clone();
        let key = id.as_str().unwrap_or_default();
        match self.outcomes.get(key) {
            Some(StepOutcome::Error(status, code)) => json!({
                "id": id,
                "status": status,
                "headers": {"Content-Type": "application/json"},
                "body": {"error": {
                    "code": code,
                    "message": format!("step {} failed", key),
                    "innerError": {"request-id": format!("req-{}", key)}
                }}
            }),
            Some(StepOutcome::Malformed) => json!({"id": id}),
            None => json!({
                "id": id,
                "status": 200,
                "headers": {"Content-Type": "application/json"},
                "body": {
                    "url": step["url"],
                    "method": step["method"],
                    "dependsOn": step.get("dependsOn").cloned().unwrap_or(Value::Null),
                    "echo": step.get("body").cloned().unwrap_or(Value::Null)
                }
            }),
        }
    }
}

impl Respond for BatchResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let payload: Value = match serde_json::from_slice(&request.body) {
            Ok(payload) => payload,
            Err(_) => {
                return ResponseTemplate::new(400).set_body_json(json!({
                    "error": {"code": "BadRequest", "message": "Invalid batch payload format."}
                }));
            }
        };

        let responses: Vec<Value> = payload["requests"]
            .as_array()
            .map(|steps| steps.iter().map(|step| self.answer(step)).collect())
            .unwrap_or_default();

        ResponseTemplate::new(200).set_body_json(json!({ "responses": responses }))
    }
}
