//! Hosted-service clients and local persistence for AgriGenius
//!
//! - `gemini`: text/image generation and streaming chat
//! - `search`: Google Custom Search web results
//! - `history`: scan history over a key-value store
//! - `chat`: transcript model for streamed replies

pub mod chat;
pub mod gemini;
pub mod history;
pub mod prompts;
pub mod search;

pub use chat::{ChatMessage, ChatTranscript, MessageId, Role};
pub use gemini::{ChatSession, ChatStream, GeminiClient, GeminiError, InlineImage};
pub use history::{
    FileKeyValueStore, HistoryError, KeyValueStore, MemoryKeyValueStore, ScanHistory, ScanRecord,
};
pub use search::{SearchResult, WebSearchClient, WebSearchError};
