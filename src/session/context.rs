use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::config::PanelSettings;
use crate::settings::types::TestOutcome;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DebugEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub timestamp: DateTime<Utc>,
    pub payload: Map<String, Value>,
}

impl DebugEvent {
    /// `payload` should be a JSON object; anything else is stored under `value`.
    pub fn new(kind: &str, payload: Value) -> Self {
        let payload = match payload {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                map
            }
        };
        Self {
            kind: kind.to_string(),
            timestamp: Utc::now(),
            payload,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FlashLevel {
    Success,
    Info,
    Error,
}

/// A status message shown once and then discarded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

/// Everything a panel session remembers between user actions.
///
/// `endpoint` and `model` form the committed pair used for chat; they change
/// only together, through [`SessionContext::commit_endpoint`]. `edit_url`
/// and `picked_model` are unconfirmed form state.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub id: String,
    endpoint: String,
    model: String,
    pub api_key: Option<String>,
    pub edit_url: String,
    pub picked_model: String,
    pub available_models: Vec<String>,
    pub model_fetch_error: Option<String>,
    pub debug_mode: bool,
    transcript: Vec<ChatTurn>,
    debug_trail: Vec<Vec<DebugEvent>>,
    /// `None` selects every store the server lists.
    pub vector_db_selection: Option<Vec<String>>,
    pub last_test: Option<TestOutcome>,
    pub refresh_pending: bool,
    pub newly_created_db: Option<String>,
    flash: Option<Flash>,
    pub created_at: DateTime<Utc>,
}

impl SessionContext {
    pub fn new(id: String, settings: &PanelSettings) -> Self {
        Self {
            id,
            endpoint: settings.endpoint.url.clone(),
            model: settings.endpoint.model.clone(),
            api_key: settings.endpoint.api_key.clone(),
            edit_url: settings.endpoint.url.clone(),
            picked_model: String::new(),
            available_models: Vec::new(),
            model_fetch_error: None,
            debug_mode: false,
            transcript: Vec::new(),
            debug_trail: Vec::new(),
            vector_db_selection: None,
            last_test: None,
            refresh_pending: false,
            newly_created_db: None,
            flash: None,
            created_at: Utc::now(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.is_empty())
    }

    /// Commits a verified endpoint together with the model it was verified
    /// against and mirrors the URL into the edit field.
    pub(crate) fn commit_endpoint(&mut self, endpoint: &str, model: &str) {
        self.endpoint = endpoint.to_string();
        self.model = model.to_string();
        self.edit_url = endpoint.to_string();
        self.picked_model = model.to_string();
        self.refresh_pending = true;
    }

    pub fn transcript(&self) -> &[ChatTurn] {
        &self.transcript
    }

    pub fn debug_trail(&self) -> &[Vec<DebugEvent>] {
        &self.debug_trail
    }

    /// Appends a user turn and opens a fresh debug list for it.
    pub fn push_user_turn(&mut self, content: &str) {
        self.transcript.push(ChatTurn {
            role: Role::User,
            content: content.to_string(),
        });
        self.debug_trail.push(Vec::new());
    }

    pub fn push_assistant_turn(&mut self, content: String) {
        self.transcript.push(ChatTurn {
            role: Role::Assistant,
            content,
        });
    }

    /// Records a diagnostic event on the current turn.
    pub fn log_debug(&mut self, kind: &str, payload: Value) {
        let event = DebugEvent::new(kind, payload);
        let rendered = Value::Object(event.payload.clone());
        tracing::debug!(session = %self.id, event = %event.kind, "{}", rendered);
        if self.debug_trail.is_empty() {
            self.debug_trail.push(Vec::new());
        }
        if let Some(turn) = self.debug_trail.last_mut() {
            turn.push(event);
        }
    }

    pub fn reset_conversation(&mut self) {
        self.transcript.clear();
        self.debug_trail.clear();
    }

    pub fn set_flash(&mut self, level: FlashLevel, message: impl Into<String>) {
        self.flash = Some(Flash {
            level,
            message: message.into(),
        });
    }

    pub fn take_flash(&mut self) -> Option<Flash> {
        self.flash.take()
    }

    pub fn snapshot(&self) -> SessionView {
        SessionView {
            id: self.id.clone(),
            endpoint: self.endpoint.clone(),
            model: self.model.clone(),
            has_api_key: self.api_key().is_some(),
            edit_url: self.edit_url.clone(),
            picked_model: self.picked_model.clone(),
            available_models: self.available_models.clone(),
            model_fetch_error: self.model_fetch_error.clone(),
            debug_mode: self.debug_mode,
            turns: self.transcript.len(),
            vector_db_selection: self.vector_db_selection.clone(),
            last_test: self.last_test.clone(),
            refresh_pending: self.refresh_pending,
            created_at: self.created_at,
        }
    }
}

/// Serializable view of a session; never includes the API key.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: String,
    pub endpoint: String,
    pub model: String,
    pub has_api_key: bool,
    pub edit_url: String,
    pub picked_model: String,
    pub available_models: Vec<String>,
    pub model_fetch_error: Option<String>,
    pub debug_mode: bool,
    pub turns: usize,
    pub vector_db_selection: Option<Vec<String>>,
    pub last_test: Option<TestOutcome>,
    pub refresh_pending: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn session() -> SessionContext {
        SessionContext::new("s1".to_string(), &PanelSettings::default())
    }

    #[test]
    fn new_session_starts_on_configured_pair() {
        let ctx = session();
        assert_eq!(ctx.endpoint(), "http://llamastack:8321");
        assert_eq!(ctx.model(), "default-model");
        assert_eq!(ctx.edit_url, ctx.endpoint());
        assert!(ctx.transcript().is_empty());
    }

    #[test]
    fn debug_events_attach_to_the_latest_turn() {
        let mut ctx = session();
        ctx.push_user_turn("first");
        ctx.log_debug("a", json!({ "n": 1 }));
        ctx.push_assistant_turn("one".to_string());
        ctx.push_user_turn("second");
        ctx.log_debug("b", json!({ "n": 2 }));
        ctx.log_debug("c", json!("scalar"));

        assert_eq!(ctx.debug_trail().len(), 2);
        assert_eq!(ctx.debug_trail()[0].len(), 1);
        assert_eq!(ctx.debug_trail()[1].len(), 2);
        assert_eq!(ctx.debug_trail()[1][1].payload["value"], json!("scalar"));
        assert_eq!(ctx.transcript().len(), 3);
        assert_eq!(ctx.transcript()[1].role, Role::Assistant);
    }

    #[test]
    fn flash_is_shown_once() {
        let mut ctx = session();
        ctx.set_flash(FlashLevel::Success, "created");
        assert_eq!(ctx.take_flash().unwrap().message, "created");
        assert!(ctx.take_flash().is_none());
    }

    #[test]
    fn reset_clears_conversation_only() {
        let mut ctx = session();
        ctx.debug_mode = true;
        ctx.push_user_turn("hi");
        ctx.reset_conversation();
        assert!(ctx.transcript().is_empty());
        assert!(ctx.debug_trail().is_empty());
        assert!(ctx.debug_mode);
    }

    #[test]
    fn snapshot_hides_api_key() {
        let mut ctx = session();
        ctx.api_key = Some("sk-123".to_string());
        let view = serde_json::to_value(ctx.snapshot()).unwrap();
        assert_eq!(view["has_api_key"], json!(true));
        assert!(!view.to_string().contains("sk-123"));
    }
}
