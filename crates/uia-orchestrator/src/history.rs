//! Chat/message persistence is an external collaborator (§1 Non-goals: "Document
//! store for chats/messages/users/refresh tokens"). The orchestrator only
//! needs to append messages and read back the last assistant `encQuestion`
//! (to feed RAG's `previousQuestion` and to detect a pending-nudge re-ask),
//! so it depends on this narrow trait rather than owning a messages table.

use async_trait::async_trait;
use uia_core::model::Message;

#[async_trait]
pub trait ChatHistory: Send + Sync {
    async fn append(&self, message: Message);

    /// The most recent assistant message's `encQuestion`, if any -- used to
    /// detect a pending-nudge re-ask (§4.7) and to seed RAG's `previousQuestion`.
    async fn last_assistant_enc_question(&self, chat_id: &str) -> Option<String>;
}

/// In-process stand-in for the real transport-layer message store, for
/// tests and the demonstration CLI. Not meant for production use.
#[derive(Default)]
pub struct InMemoryChatHistory {
    messages: std::sync::Mutex<Vec<Message>>,
}

impl InMemoryChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self, chat_id: &str) -> Vec<Message> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.chat_id == chat_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ChatHistory for InMemoryChatHistory {
    async fn append(&self, message: Message) {
        self.messages.lock().unwrap().push(message);
    }

    async fn last_assistant_enc_question(&self, chat_id: &str) -> Option<String> {
        use uia_core::model::MessageRole;
        self.messages
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|m| m.chat_id == chat_id && matches!(m.role, MessageRole::Assistant))
            .and_then(|m| m.enc_question.clone())
    }
}
