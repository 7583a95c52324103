//! Tutoring core: mastery model, item selection, generation backend,
//! session modes, and the command router.

pub mod dictionary;
pub mod grammar;
pub mod llm;
pub mod mastery;
pub mod prompts;
pub mod router;
pub mod selector;
pub mod session;
pub mod teacher;
pub mod verb_trainer;
pub mod word_trainer;
pub mod words;

pub use session::{AppContext, Mode, ModeKind, Outcome};
pub use teacher::Teacher;
