//! Local ephemeral caches for the Rihla client.
//!
//! Nothing here is persisted: both stores are in-memory, scoped to the UI
//! session, and exist so forced logout has something concrete to wipe.
//!
//! - [`ChatHistoryStore`]: per-conversation message log, silently trimmed to
//!   the most recent 50 entries.
//! - [`NamespaceCache`]: string-keyed store for offline assets, purgeable by
//!   key prefix.

#![forbid(unsafe_code)]

mod chat;
mod namespace;

pub use chat::{ChatHistoryStore, ChatMessage, ChatSender, CHAT_HISTORY_LIMIT};
pub use namespace::{NamespaceCache, OFFLINE_CACHE_PREFIX};
