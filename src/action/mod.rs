//! Dialogue-engine boundary.
//!
//! The hosting engine hands over the entities it extracted from the latest
//! user turn; the action replies with exactly one message. Nothing here
//! returns an error: every failure becomes something the user can read.

use serde::{Deserialize, Serialize};

use crate::context::DiagnosisContext;
use crate::error::{DxError, Result};

pub const ACTION_NAME: &str = "action_diagnose_symptoms";
pub const SYMPTOM_ENTITY: &str = "symptom";

/// Sent when the latest turn carried no symptom entity
pub const CLARIFICATION_PROMPT: &str =
    "I couldn't find any symptoms in your message. Could you describe what you're experiencing?";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedEntity {
    pub entity: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

impl ExtractedEntity {
    pub fn symptom(value: &str) -> Self {
        Self {
            entity: SYMPTOM_ENTITY.to_string(),
            value: serde_json::Value::String(value.to_string()),
        }
    }

    /// Entity value as text; numbers and booleans are stringified
    pub fn value_text(&self) -> Option<String> {
        match &self.value {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatestMessage {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub entities: Vec<ExtractedEntity>,
}

impl LatestMessage {
    /// Value of the first entity tagged as a symptom
    pub fn first_symptom(&self) -> Option<String> {
        self.entities
            .iter()
            .find(|e| e.entity == SYMPTOM_ENTITY)
            .and_then(|e| e.value_text())
    }
}

#[derive(Debug, Deserialize)]
struct Tracker {
    latest_message: LatestMessage,
}

/// Accepts either a full action call (`{"tracker": {"latest_message": ..}}`)
/// or a bare latest message.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ActionRequest {
    Call { tracker: Tracker },
    Message(LatestMessage),
}

/// Parse an action request body into the latest user message
pub fn parse_request(body: &str) -> Result<LatestMessage> {
    let request: ActionRequest = serde_json::from_str(body)
        .map_err(|e| DxError::InvalidInput(format!("unreadable action request: {}", e)))?;
    Ok(match request {
        ActionRequest::Call { tracker } => tracker.latest_message,
        ActionRequest::Message(message) => message,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseMessage {
    pub text: String,
}

/// Reply body in the shape dialogue engines expect from custom actions
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActionResponse {
    pub events: Vec<serde_json::Value>,
    pub responses: Vec<ResponseMessage>,
}

/// Where replies go
pub trait Dispatcher {
    fn utter_message(&mut self, text: &str);
}

/// Buffers replies until the action finishes
#[derive(Debug, Default)]
pub struct CollectingDispatcher {
    pub messages: Vec<String>,
}

impl Dispatcher for CollectingDispatcher {
    fn utter_message(&mut self, text: &str) {
        self.messages.push(text.to_string());
    }
}

impl CollectingDispatcher {
    pub fn into_response(self) -> ActionResponse {
        ActionResponse {
            events: Vec::new(),
            responses: self
                .messages
                .into_iter()
                .map(|text| ResponseMessage { text })
                .collect(),
        }
    }
}

/// User-facing apology that names what went wrong
pub fn apology(err: &DxError) -> String {
    format!(
        "Sorry, I ran into a problem while analysing your symptoms: {}",
        err
    )
}

pub struct ActionDiagnoseSymptoms<'a> {
    context: &'a DiagnosisContext,
}

impl<'a> ActionDiagnoseSymptoms<'a> {
    pub fn new(context: &'a DiagnosisContext) -> Self {
        Self { context }
    }

    pub fn name(&self) -> &'static str {
        ACTION_NAME
    }

    /// Handle one turn: exactly one message is dispatched
    pub fn run(&self, message: &LatestMessage, dispatcher: &mut dyn Dispatcher) {
        dispatcher.utter_message(&self.respond(message));
    }

    pub fn respond(&self, message: &LatestMessage) -> String {
        let Some(symptom) = message.first_symptom() else {
            tracing::info!("no symptom entity in message, asking for clarification");
            return CLARIFICATION_PROMPT.to_string();
        };

        tracing::info!(symptom = %symptom, "diagnosing symptom");
        match self.indicator_for(&symptom) {
            Ok(indicator) => self.context.diagnoser().diagnose(&indicator),
            Err(e) => {
                tracing::error!(kind = e.kind(), error = %e, symptom = %symptom, "symptom diagnosis failed");
                apology(&e)
            }
        }
    }

    fn indicator_for(&self, symptom: &str) -> Result<crate::diagnosis::IndicatorVector> {
        let encoded = self.context.encoder().encode(symptom)?;
        self.context.indicator_builder().build(&[encoded])
    }
}
