use async_trait::async_trait;
use log::info;
use std::collections::HashMap;
use std::error::Error;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::models::chat::{ ChatMessage, Conversation, HistoryEntry };

#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn add_message(
        &self,
        conversation_id: &str,
        message: ChatMessage
    ) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Returns the last `limit` messages; 0 returns the whole conversation.
    async fn get_conversation(
        &self,
        conversation_id: &str,
        limit: usize
    ) -> Result<Conversation, Box<dyn Error + Send + Sync>>;

    async fn clear(&self, conversation_id: &str) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// Session-scoped store. Chat history lives and dies with the process.
pub struct MemoryHistoryStore {
    conversations: Mutex<HashMap<String, Vec<ChatMessage>>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self {
            conversations: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn add_message(
        &self,
        conversation_id: &str,
        message: ChatMessage
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut conversations = self.conversations.lock().await;
        conversations.entry(conversation_id.to_string()).or_default().push(message);
        Ok(())
    }

    async fn get_conversation(
        &self,
        conversation_id: &str,
        limit: usize
    ) -> Result<Conversation, Box<dyn Error + Send + Sync>> {
        let conversations = self.conversations.lock().await;
        let messages = conversations.get(conversation_id).cloned().unwrap_or_default();
        let messages = if limit > 0 && messages.len() > limit {
            messages[messages.len() - limit..].to_vec()
        } else {
            messages
        };
        Ok(Conversation {
            id: conversation_id.to_string(),
            messages,
        })
    }

    async fn clear(&self, conversation_id: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut conversations = self.conversations.lock().await;
        conversations.remove(conversation_id);
        Ok(())
    }
}

pub fn initialize_history_store() -> Arc<dyn HistoryStore> {
    info!("Chat history is session-scoped (in-memory only)");
    Arc::new(MemoryHistoryStore::new())
}

/// Projects a conversation onto the wire shape the webhook expects.
pub fn history_for_payload(conversation: &Conversation) -> Vec<HistoryEntry> {
    conversation.messages.iter().map(HistoryEntry::from).collect()
}
