//! Wire types for the RAG chat and items API.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`message`] | Chat turns and roles |
//! | [`chat`] | Chat completion request/reply bodies |
//! | [`item`] | Knowledge-base items, create/update payloads |
//! | [`events`] | Streaming chat events |
//!
//! ```rust
//! use rag_kb_sdk::types::{ChatRequest, ChatTurn, NewItem};
//!
//! let request = ChatRequest::new("What is in my notes about tokio?")
//!     .history(vec![ChatTurn::user("hi"), ChatTurn::assistant("hello")])
//!     .system_prompt("Answer from the knowledge base only.");
//! assert!(request.system_prompt.is_some());
//!
//! let item = NewItem::new().title("Tokio notes").tags(["rust", "async"]);
//! assert!(item.validate().is_ok());
//! ```

pub mod chat;
pub mod events;
pub mod item;
pub mod message;

pub use chat::{ChatReply, ChatRequest};
pub use events::ChatStreamEvent;
pub use item::{DeleteResponse, Item, ItemDetail, ItemId, ItemPatch, NewItem};
pub use message::{ChatRole, ChatTurn};
