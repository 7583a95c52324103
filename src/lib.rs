//! Word Tutor - Personal Vocabulary and Grammar Tutor Library
//!
//! A learning assistant with:
//! - LLM-generated explanations, translations, and riddles
//! - A nine-level mastery model with weighted item selection
//! - SQLite-backed storage for words, irregular verbs, and grammar themes
//! - Optional speech output via an OpenAI-compatible TTS endpoint
//!
//! # Example
//!
//! ```ignore
//! use word_tutor::store::WordStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = WordStore::open_in_memory().await?;
//!     store.upsert_word("serendipity", "", "a happy accident", "...").await?;
//!     println!("{:?}", store.fetch_word("serendipity").await?);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod store;
pub mod tutor;
pub mod ui;
pub mod voice;

pub use config::Config;
pub use error::{Result, TutorError};
pub use store::{CategoryFilter, GrammarTheme, IrregularVerb, Word, WordStore};
pub use tutor::{AppContext, Mode, ModeKind, Outcome, Teacher};
pub use voice::Speaker;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
