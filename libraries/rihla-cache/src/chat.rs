//! Bounded chat-history store.
//!
//! The support-chat widget keeps its transcript client-side only. The store
//! holds at most [`CHAT_HISTORY_LIMIT`] messages per conversation; older
//! entries are dropped silently on save.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Maximum retained messages per conversation
pub const CHAT_HISTORY_LIMIT: usize = 50;

/// Who authored a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatSender {
    User,
    Advisor,
}

/// One message in a support-chat transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: ChatSender,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(sender: ChatSender, body: impl Into<String>) -> Self {
        Self {
            sender,
            body: body.into(),
            sent_at: Utc::now(),
        }
    }
}

/// In-memory per-conversation chat transcript store
#[derive(Debug, Clone, Default)]
pub struct ChatHistoryStore {
    conversations: Arc<RwLock<HashMap<String, VecDeque<ChatMessage>>>>,
}

impl ChatHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the transcript for a conversation, keeping only the most
    /// recent [`CHAT_HISTORY_LIMIT`] messages in their original order.
    pub async fn save(&self, conversation_id: &str, messages: Vec<ChatMessage>) {
        let mut transcript: VecDeque<ChatMessage> = messages.into();
        while transcript.len() > CHAT_HISTORY_LIMIT {
            transcript.pop_front();
        }

        let mut conversations = self.conversations.write().await;
        conversations.insert(conversation_id.to_string(), transcript);
    }

    /// Append one message, trimming the oldest entry if the transcript is
    /// already at the limit.
    pub async fn append(&self, conversation_id: &str, message: ChatMessage) {
        let mut conversations = self.conversations.write().await;
        let transcript = conversations.entry(conversation_id.to_string()).or_default();
        transcript.push_back(message);
        while transcript.len() > CHAT_HISTORY_LIMIT {
            transcript.pop_front();
        }
    }

    /// Load the transcript for a conversation, oldest first
    pub async fn load(&self, conversation_id: &str) -> Vec<ChatMessage> {
        let conversations = self.conversations.read().await;
        conversations
            .get(conversation_id)
            .map(|t| t.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Drop one conversation's transcript
    pub async fn clear(&self, conversation_id: &str) {
        let mut conversations = self.conversations.write().await;
        conversations.remove(conversation_id);
    }

    /// Drop every transcript (forced logout)
    pub async fn clear_all(&self) {
        let mut conversations = self.conversations.write().await;
        let dropped = conversations.len();
        conversations.clear();
        debug!(conversations = dropped, "Cleared chat history");
    }

    /// Number of stored conversations
    pub async fn conversation_count(&self) -> usize {
        self.conversations.read().await.len()
    }
}
