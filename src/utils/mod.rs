//! Pure helpers that need no client.

pub mod history;

pub use history::format_chat_history;
