//! # rag-kb-sdk
//!
//! Async client for a RAG chat and knowledge-base items REST API.
//!
//! ## Overview
//!
//! Every operation is one HTTP request mapped onto typed Rust values, with input validation
//! done before anything goes over the wire. On top of the chat endpoint, [`ChatSession`]
//! keeps the conversation history and threads it into each call.
//!
//! - **Chat**: [`RagClient::rag_chat`] and, with the `streaming` feature,
//!   [`RagClient::rag_chat_stream`] over Server-Sent Events
//! - **Items**: list, get (with neighbors), create, update, delete
//! - **Sessions**: [`RagClient::chat_session`] accumulates user/assistant turns
//! - **Errors**: one [`Error`] type exposing `message()`, `status()` and `payload()`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rag_kb_sdk::{NewItem, RagClient};
//!
//! #[tokio::main]
//! async fn main() -> rag_kb_sdk::Result<()> {
//!     let client = RagClient::builder()
//!         .base_url("http://localhost:3000")
//!         .api_key("your-api-key")
//!         .build()?;
//!
//!     client
//!         .create_item(&NewItem::new().title("Tokio").text("An async runtime for Rust"))
//!         .await?;
//!
//!     let mut session = client.chat_session(Some("Answer from my notes.".into()));
//!     let reply = session.send_message("What is tokio?").await?;
//!     println!("{}", reply.reply);
//!     assert_eq!(session.history().len(), 2);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Client, builder, chat, items and sessions |
//! | [`config`] | Base URL, credential and header configuration |
//! | [`transport`] | Single-attempt JSON-over-HTTP transport |
//! | [`types`] | Wire types (turns, chat bodies, items, stream events) |
//! | [`utils`] | History normalization |

pub mod client;
pub mod config;
pub mod transport;
pub mod types;
pub mod utils;

#[cfg(feature = "streaming")]
pub mod stream;

pub use client::{ChatSession, RagClient, RagClientBuilder};
pub use config::ClientConfig;
pub use types::{
    ChatReply, ChatRequest, ChatRole, ChatStreamEvent, ChatTurn, DeleteResponse, Item,
    ItemDetail, ItemId, ItemPatch, NewItem,
};
pub use utils::format_chat_history;

use futures::Stream;
use std::pin::Pin;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// A unified pinned, boxed stream that emits `Result<T>`
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = Result<T>> + Send + 'a>>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
