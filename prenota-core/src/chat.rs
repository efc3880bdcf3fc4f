use log::warn;
use serde::{Deserialize, Serialize};

use crate::{PreferenceStore, StoreError};

pub const CHAT_HISTORY_KEY: &str = "arrost_chat_history_v1";

/// How many messages are kept when persisting
pub const MAX_STORED_MESSAGES: usize = 80;
/// How many messages are sent along as context
pub const MAX_CONTEXT_MESSAGES: usize = 20;

pub const WELCOME_MESSAGE: &str = "Ciao! Sono l'assistente del laboratorio. Dimmi cosa ti serve: orari, ritiro/consegna, come prenotare scatole 50/100/200, info generali.";
pub const CHAT_ERROR_MESSAGE: &str = "Errore. Riprova tra poco.";
pub const CHAT_NETWORK_ERROR_MESSAGE: &str = "Errore rete. Controlla connessione.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }

    pub fn welcome() -> Self {
        Self::assistant(WELCOME_MESSAGE)
    }
}

/// What gets posted to the completion backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub history: Vec<ChatMessage>,
}

/// Conversation shown in the chat widget, persisted between visits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatHistory {
    messages: Vec<ChatMessage>,
}

impl Default for ChatHistory {
    fn default() -> Self {
        Self {
            messages: vec![ChatMessage::welcome()],
        }
    }
}

impl ChatHistory {
    /// Restores the stored conversation, or starts over with the welcome message.
    pub fn load(store: &dyn PreferenceStore) -> Self {
        let stored = store
            .get(CHAT_HISTORY_KEY)
            .and_then(|raw| serde_json::from_str::<Vec<ChatMessage>>(&raw).ok())
            .filter(|messages| !messages.is_empty());

        match stored {
            Some(messages) => Self { messages },
            None => Self::default(),
        }
    }

    pub fn persist(&self, store: &dyn PreferenceStore) {
        let start = self.messages.len().saturating_sub(MAX_STORED_MESSAGES);

        let result = serde_json::to_string(&self.messages[start..])
            .map_err(StoreError::from)
            .and_then(|raw| store.set(CHAT_HISTORY_KEY, &raw));

        if let Err(e) = result {
            warn!("{e}");
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Adds the user's message and returns the request to send, or [None] for blank input.
    pub fn ask(&mut self, text: &str) -> Option<ChatRequest> {
        let text = text.trim();

        if text.is_empty() {
            return None;
        }

        let start = self.messages.len().saturating_sub(MAX_CONTEXT_MESSAGES);
        let mut history = self.messages[start..].to_vec();
        history.push(ChatMessage::user(text));

        self.messages.push(ChatMessage::user(text));

        Some(ChatRequest {
            message: text.to_string(),
            history,
        })
    }

    /// Records the backend's reply. A missing reply shows the error, or a generic one.
    pub fn answer(&mut self, reply: Option<&str>, error: Option<&str>) {
        let content = match reply.filter(|r| !r.is_empty()) {
            Some(reply) => reply,
            None => error.filter(|e| !e.is_empty()).unwrap_or(CHAT_ERROR_MESSAGE),
        };

        self.messages.push(ChatMessage::assistant(content));
    }

    pub fn answer_network_error(&mut self) {
        self.messages
            .push(ChatMessage::assistant(CHAT_NETWORK_ERROR_MESSAGE));
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
