//! Speech output

pub mod tts;

pub use tts::Speaker;
