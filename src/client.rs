//! Client for the RAG chat and items API.
//!
//! Keep the public surface small and predictable. Implementation details are split into
//! submodules under `src/client/`: the client and its setters, the builder, chat calls,
//! item CRUD and the chat session.

pub mod builder;
pub mod chat;
pub mod core;
pub mod items;
pub mod session;

pub use builder::RagClientBuilder;
pub use self::core::RagClient;
pub use session::ChatSession;
