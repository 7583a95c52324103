//! Persistent store for words, irregular verbs, and grammar themes
//!
//! Three independent key-value collections with no foreign keys between
//! them. The store object is constructed once per process and injected into
//! each mode; there is no global instance.

mod sqlite;

pub use sqlite::WordStore;

use std::fmt;

use crate::tutor::mastery;

/// A tracked vocabulary word or phrase.
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    /// The word or phrase itself. Primary key, immutable once created.
    pub word: String,
    /// Free-form grouping; empty means "uncategorized".
    pub category: String,
    pub explanation_en: String,
    pub explanation_ru: String,
    /// Times the word was looked up or drilled. Never decremented.
    pub ask_counter: i64,
    /// Mastery level, always within `[0, LEVELS-1]`.
    pub state: u8,
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} : Category - \"{}\"; Asks - {}; State - \"{}\"",
            self.word,
            self.category,
            self.ask_counter,
            mastery::label(self.state)
        )
    }
}

/// An irregular verb with its three forms.
#[derive(Debug, Clone, PartialEq)]
pub struct IrregularVerb {
    pub base_form: String,
    pub past_simple: String,
    pub past_participle: String,
    pub ask_counter: i64,
    pub state: u8,
}

impl fmt::Display for IrregularVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} - {} : Asks - {}; State - \"{}\"",
            self.base_form,
            self.past_simple,
            self.past_participle,
            self.ask_counter,
            mastery::label(self.state)
        )
    }
}

/// A grammar theme. Reference material only: no counter, no mastery.
#[derive(Debug, Clone, PartialEq)]
pub struct GrammarTheme {
    pub name: String,
    pub description: String,
}

/// Category filter for listing words.
///
/// `"all"` is a reserved query sentinel, never a stored value.
#[derive(Debug, Clone, PartialEq)]
pub enum CategoryFilter {
    /// Only words with an empty category.
    Uncategorized,
    /// Every word.
    All,
    /// Exact category match.
    Named(String),
}

impl CategoryFilter {
    /// Parse a user-supplied category argument.
    pub fn parse(arg: Option<&str>) -> Self {
        match arg.map(str::trim) {
            None | Some("") => CategoryFilter::Uncategorized,
            Some("all") => CategoryFilter::All,
            Some(name) => CategoryFilter::Named(name.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_filter_parsing() {
        assert_eq!(CategoryFilter::parse(None), CategoryFilter::Uncategorized);
        assert_eq!(CategoryFilter::parse(Some("")), CategoryFilter::Uncategorized);
        assert_eq!(CategoryFilter::parse(Some("  ")), CategoryFilter::Uncategorized);
        assert_eq!(CategoryFilter::parse(Some("all")), CategoryFilter::All);
        assert_eq!(
            CategoryFilter::parse(Some("verbs")),
            CategoryFilter::Named("verbs".to_string())
        );
    }

    #[test]
    fn word_display_shows_state_label() {
        let word = Word {
            word: "run".to_string(),
            category: "verb".to_string(),
            explanation_en: String::new(),
            explanation_ru: String::new(),
            ask_counter: 3,
            state: 0,
        };
        let text = word.to_string();
        assert!(text.contains("run"));
        assert!(text.contains("\"new\""));
        assert!(text.contains("Asks - 3"));
    }
}
