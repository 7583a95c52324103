//! SQLite-backed store for words, irregular verbs, and grammar themes

use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{CategoryFilter, GrammarTheme, IrregularVerb, Word};
use crate::error::{Result, TutorError};
use crate::tutor::mastery;

/// SQLite-backed item store.
///
/// Every mutation commits before returning (rusqlite autocommit); there are
/// no multi-statement transactions spanning a user-visible operation.
pub struct WordStore {
    conn: Arc<Mutex<Connection>>,
}

impl WordStore {
    /// Open (or create) the store at the given path.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let conn = Connection::open(&path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// In-memory store, used by tests.
    pub async fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS words (
                word TEXT PRIMARY KEY,
                category TEXT NOT NULL DEFAULT '',
                explanation_en TEXT NOT NULL,
                explanation_ru TEXT NOT NULL,
                ask_counter INTEGER NOT NULL DEFAULT 1,
                state INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS irregular_verbs (
                base_form TEXT PRIMARY KEY,
                past_simple TEXT NOT NULL,
                past_participle TEXT NOT NULL,
                ask_counter INTEGER NOT NULL DEFAULT 1,
                state INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS grammar_themes (
                name TEXT PRIMARY KEY,
                description TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_words_category ON words(category);
            "#,
        )?;
        Ok(())
    }

    // ============ Words ============

    /// Fetch a word by its key.
    pub async fn fetch_word(&self, word: &str) -> Result<Option<Word>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare_cached(
            "SELECT word, category, explanation_en, explanation_ru, ask_counter, state
             FROM words WHERE word = ?1",
        )?;
        let result = stmt
            .query_row(params![word], |row| {
                Ok(Word {
                    word: row.get(0)?,
                    category: row.get(1)?,
                    explanation_en: row.get(2)?,
                    explanation_ru: row.get(3)?,
                    ask_counter: row.get(4)?,
                    state: row.get::<_, i64>(5)?.clamp(0, mastery::TOP as i64) as u8,
                })
            })
            .optional()?;
        Ok(result)
    }

    /// List words matching a category filter.
    pub async fn fetch_words(&self, filter: &CategoryFilter) -> Result<Vec<Word>> {
        let conn = self.conn.lock().await;
        let base = "SELECT word, category, explanation_en, explanation_ru, ask_counter, state FROM words";
        let map = |row: &rusqlite::Row<'_>| {
            Ok(Word {
                word: row.get(0)?,
                category: row.get(1)?,
                explanation_en: row.get(2)?,
                explanation_ru: row.get(3)?,
                ask_counter: row.get(4)?,
                state: row.get::<_, i64>(5)?.clamp(0, mastery::TOP as i64) as u8,
            })
        };
        let words = match filter {
            CategoryFilter::All => {
                let mut stmt = conn.prepare_cached(&format!("{base} ORDER BY word"))?;
                let rows = stmt.query_map([], map)?.collect::<rusqlite::Result<Vec<_>>>()?;
                rows
            }
            CategoryFilter::Uncategorized => {
                let mut stmt =
                    conn.prepare_cached(&format!("{base} WHERE category = '' ORDER BY word"))?;
                let rows = stmt.query_map([], map)?.collect::<rusqlite::Result<Vec<_>>>()?;
                rows
            }
            CategoryFilter::Named(name) => {
                let mut stmt =
                    conn.prepare_cached(&format!("{base} WHERE category = ?1 ORDER BY word"))?;
                let rows = stmt
                    .query_map(params![name], map)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                rows
            }
        };
        Ok(words)
    }

    /// Insert a word, or refresh an existing one.
    ///
    /// A new word starts with ask_counter 1 and state 0. An existing word
    /// keeps its ask_counter and state, keeps its category when the supplied
    /// category is empty, and gets both explanation texts replaced.
    /// `"all"` is a query sentinel and is rejected as a category.
    pub async fn upsert_word(
        &self,
        word: &str,
        category: &str,
        explanation_en: &str,
        explanation_ru: &str,
    ) -> Result<()> {
        reject_reserved_category(category)?;
        let conn = self.conn.lock().await;
        let existing: Option<String> = conn
            .query_row(
                "SELECT category FROM words WHERE word = ?1",
                params![word],
                |row| row.get(0),
            )
            .optional()?;

        match existing {
            Some(stored_category) => {
                let category = if category.trim().is_empty() {
                    stored_category
                } else {
                    category.trim().to_string()
                };
                conn.execute(
                    "UPDATE words SET category = ?1, explanation_en = ?2, explanation_ru = ?3
                     WHERE word = ?4",
                    params![category, explanation_en, explanation_ru, word],
                )?;
            }
            None => {
                conn.execute(
                    "INSERT INTO words (word, category, explanation_en, explanation_ru, ask_counter, state)
                     VALUES (?1, ?2, ?3, ?4, 1, 0)",
                    params![word, category.trim(), explanation_en, explanation_ru],
                )?;
            }
        }
        Ok(())
    }

    /// Delete a word. Returns false if the key did not exist.
    pub async fn delete_word(&self, word: &str) -> Result<bool> {
        let conn = self.conn.lock().await;
        let affected = conn.execute("DELETE FROM words WHERE word = ?1", params![word])?;
        Ok(affected > 0)
    }

    /// Increment a word's ask counter.
    pub async fn increment_counter(&self, word: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        let affected = conn.execute(
            "UPDATE words SET ask_counter = ask_counter + 1 WHERE word = ?1",
            params![word],
        )?;
        if affected == 0 {
            return Err(TutorError::NotFound(word.to_string()));
        }
        Ok(())
    }

    /// Set a word's category directly. `"all"` is rejected, as in upsert.
    pub async fn set_category(&self, word: &str, category: &str) -> Result<()> {
        reject_reserved_category(category)?;
        let conn = self.conn.lock().await;
        let affected = conn.execute(
            "UPDATE words SET category = ?1 WHERE word = ?2",
            params![category.trim(), word],
        )?;
        if affected == 0 {
            return Err(TutorError::NotFound(word.to_string()));
        }
        Ok(())
    }

    /// Shift a word's mastery state by `delta`, clamped into range.
    pub async fn adjust_state(&self, word: &str, delta: i8) -> Result<()> {
        let current = self
            .fetch_word(word)
            .await?
            .ok_or_else(|| TutorError::NotFound(word.to_string()))?;
        let new_state = mastery::adjust(current.state, delta);
        let conn = self.conn.lock().await;
        conn.execute(
            "UPDATE words SET state = ?1 WHERE word = ?2",
            params![new_state as i64, word],
        )?;
        Ok(())
    }

    /// Set a word's mastery state directly (manual edit).
    pub async fn set_state(&self, word: &str, state: u8) -> Result<()> {
        let conn = self.conn.lock().await;
        let affected = conn.execute(
            "UPDATE words SET state = ?1 WHERE word = ?2",
            params![state.min(mastery::TOP) as i64, word],
        )?;
        if affected == 0 {
            return Err(TutorError::NotFound(word.to_string()));
        }
        Ok(())
    }

    /// Mean mastery state of the words in a category, 0.0 when none match.
    pub async fn category_average(&self, category: &str) -> Result<f64> {
        let filter = CategoryFilter::parse(Some(category));
        let words = self.fetch_words(&filter).await?;
        if words.is_empty() {
            return Ok(0.0);
        }
        let sum: i64 = words.iter().map(|w| w.state as i64).sum();
        Ok(sum as f64 / words.len() as f64)
    }

    /// Distinct stored categories with word counts (empty category included).
    pub async fn category_counts(&self) -> Result<Vec<(String, i64)>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare_cached(
            "SELECT category, COUNT(*) FROM words GROUP BY category ORDER BY category",
        )?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    // ============ Irregular verbs ============

    /// Insert a new verb, or replace the forms of an existing one while
    /// keeping its counter and state (same preservation rule as words).
    pub async fn add_verb(&self, verb: &IrregularVerb) -> Result<()> {
        let conn = self.conn.lock().await;
        let exists: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM irregular_verbs WHERE base_form = ?1",
                params![verb.base_form],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_some() {
            conn.execute(
                "UPDATE irregular_verbs SET past_simple = ?1, past_participle = ?2
                 WHERE base_form = ?3",
                params![verb.past_simple, verb.past_participle, verb.base_form],
            )?;
        } else {
            conn.execute(
                "INSERT INTO irregular_verbs (base_form, past_simple, past_participle, ask_counter, state)
                 VALUES (?1, ?2, ?3, 1, 0)",
                params![verb.base_form, verb.past_simple, verb.past_participle],
            )?;
        }
        Ok(())
    }

    pub async fn fetch_verb(&self, base_form: &str) -> Result<Option<IrregularVerb>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare_cached(
            "SELECT base_form, past_simple, past_participle, ask_counter, state
             FROM irregular_verbs WHERE base_form = ?1",
        )?;
        let result = stmt
            .query_row(params![base_form], |row| {
                Ok(IrregularVerb {
                    base_form: row.get(0)?,
                    past_simple: row.get(1)?,
                    past_participle: row.get(2)?,
                    ask_counter: row.get(3)?,
                    state: row.get::<_, i64>(4)?.clamp(0, mastery::TOP as i64) as u8,
                })
            })
            .optional()?;
        Ok(result)
    }

    pub async fn all_verbs(&self) -> Result<Vec<IrregularVerb>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare_cached(
            "SELECT base_form, past_simple, past_participle, ask_counter, state
             FROM irregular_verbs ORDER BY base_form",
        )?;
        let verbs = stmt
            .query_map([], |row| {
                Ok(IrregularVerb {
                    base_form: row.get(0)?,
                    past_simple: row.get(1)?,
                    past_participle: row.get(2)?,
                    ask_counter: row.get(3)?,
                    state: row.get::<_, i64>(4)?.clamp(0, mastery::TOP as i64) as u8,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(verbs)
    }

    pub async fn delete_verb(&self, base_form: &str) -> Result<bool> {
        let conn = self.conn.lock().await;
        let affected = conn.execute(
            "DELETE FROM irregular_verbs WHERE base_form = ?1",
            params![base_form],
        )?;
        Ok(affected > 0)
    }

    pub async fn increment_verb_counter(&self, base_form: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        let affected = conn.execute(
            "UPDATE irregular_verbs SET ask_counter = ask_counter + 1 WHERE base_form = ?1",
            params![base_form],
        )?;
        if affected == 0 {
            return Err(TutorError::NotFound(base_form.to_string()));
        }
        Ok(())
    }

    /// Shift a verb's mastery state by `delta`, clamped into range.
    pub async fn adjust_verb_state(&self, base_form: &str, delta: i8) -> Result<()> {
        let current = self
            .fetch_verb(base_form)
            .await?
            .ok_or_else(|| TutorError::NotFound(base_form.to_string()))?;
        let new_state = mastery::adjust(current.state, delta);
        let conn = self.conn.lock().await;
        conn.execute(
            "UPDATE irregular_verbs SET state = ?1 WHERE base_form = ?2",
            params![new_state as i64, base_form],
        )?;
        Ok(())
    }

    // ============ Grammar themes ============

    pub async fn add_theme(&self, theme: &GrammarTheme) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR REPLACE INTO grammar_themes (name, description) VALUES (?1, ?2)",
            params![theme.name, theme.description],
        )?;
        Ok(())
    }

    pub async fn fetch_theme(&self, name: &str) -> Result<Option<GrammarTheme>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare_cached("SELECT name, description FROM grammar_themes WHERE name = ?1")?;
        let result = stmt
            .query_row(params![name], |row| {
                Ok(GrammarTheme {
                    name: row.get(0)?,
                    description: row.get(1)?,
                })
            })
            .optional()?;
        Ok(result)
    }

    pub async fn all_themes(&self) -> Result<Vec<GrammarTheme>> {
        let conn = self.conn.lock().await;
        let mut stmt =
            conn.prepare_cached("SELECT name, description FROM grammar_themes ORDER BY name")?;
        let themes = stmt
            .query_map([], |row| {
                Ok(GrammarTheme {
                    name: row.get(0)?,
                    description: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(themes)
    }

    pub async fn delete_theme(&self, name: &str) -> Result<bool> {
        let conn = self.conn.lock().await;
        let affected =
            conn.execute("DELETE FROM grammar_themes WHERE name = ?1", params![name])?;
        Ok(affected > 0)
    }
}

/// `"all"` is the list-everything query sentinel; storing it as a category
/// would make that group unreachable by name.
fn reject_reserved_category(category: &str) -> Result<()> {
    if category.trim() == "all" {
        return Err(TutorError::InvalidInput(
            "\"all\" is a reserved category name".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reserved_category_name_is_rejected() {
        let store = WordStore::open_in_memory().await.unwrap();
        assert!(store.upsert_word("w", "all", "x", "y").await.is_err());
        assert!(store.upsert_word("w", " all ", "x", "y").await.is_err());

        store.upsert_word("w", "", "x", "y").await.unwrap();
        assert!(store.set_category("w", "all").await.is_err());
        assert_eq!(store.fetch_word("w").await.unwrap().unwrap().category, "");

        // "All" is not the sentinel; exact-match filters can still reach it.
        store.set_category("w", "All").await.unwrap();
        assert_eq!(store.fetch_word("w").await.unwrap().unwrap().category, "All");
    }

    #[tokio::test]
    async fn upsert_preserves_progress() {
        let store = WordStore::open_in_memory().await.unwrap();
        store
            .upsert_word("run", "verb", "to move fast", "бежать")
            .await
            .unwrap();
        store.adjust_state("run", 3).await.unwrap();
        store.increment_counter("run").await.unwrap();

        // Empty category: stored category, counter, and state all survive.
        store
            .upsert_word("run", "", "to move fast v2", "бежать v2")
            .await
            .unwrap();

        let word = store.fetch_word("run").await.unwrap().unwrap();
        assert_eq!(word.category, "verb");
        assert_eq!(word.ask_counter, 2);
        assert_eq!(word.state, 3);
        assert_eq!(word.explanation_en, "to move fast v2");
        assert_eq!(word.explanation_ru, "бежать v2");
    }

    #[tokio::test]
    async fn category_filter_semantics() {
        let store = WordStore::open_in_memory().await.unwrap();
        store.upsert_word("alpha", "", "a", "а").await.unwrap();
        store.upsert_word("beta", "noun", "b", "б").await.unwrap();
        store.upsert_word("gamma", "noun", "c", "в").await.unwrap();

        let uncategorized = store
            .fetch_words(&CategoryFilter::Uncategorized)
            .await
            .unwrap();
        assert_eq!(uncategorized.len(), 1);
        assert_eq!(uncategorized[0].word, "alpha");

        let all = store.fetch_words(&CategoryFilter::All).await.unwrap();
        assert_eq!(all.len(), 3);

        let nouns = store
            .fetch_words(&CategoryFilter::Named("noun".to_string()))
            .await
            .unwrap();
        assert_eq!(nouns.len(), 2);
    }

    #[tokio::test]
    async fn delete_reports_missing_keys() {
        let store = WordStore::open_in_memory().await.unwrap();
        assert!(!store.delete_word("ghost").await.unwrap());
        store.upsert_word("real", "", "x", "y").await.unwrap();
        assert!(store.delete_word("real").await.unwrap());
        assert!(store.fetch_word("real").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn category_average_is_the_mean_state() {
        let store = WordStore::open_in_memory().await.unwrap();
        store.upsert_word("one", "noun", "x", "y").await.unwrap();
        store.upsert_word("two", "noun", "x", "y").await.unwrap();
        store.adjust_state("one", 3).await.unwrap();
        store.adjust_state("two", 5).await.unwrap();

        let avg = store.category_average("noun").await.unwrap();
        assert!((avg - 4.0).abs() < f64::EPSILON);
        assert_eq!(store.category_average("ghost").await.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn state_adjustment_clamps() {
        let store = WordStore::open_in_memory().await.unwrap();
        store.upsert_word("w", "", "x", "y").await.unwrap();
        store.adjust_state("w", -3).await.unwrap();
        assert_eq!(store.fetch_word("w").await.unwrap().unwrap().state, 0);
        store.adjust_state("w", 100).await.unwrap();
        assert_eq!(
            store.fetch_word("w").await.unwrap().unwrap().state,
            mastery::TOP
        );
    }

    #[tokio::test]
    async fn verbs_and_themes_roundtrip() {
        let store = WordStore::open_in_memory().await.unwrap();
        let verb = IrregularVerb {
            base_form: "go".to_string(),
            past_simple: "went".to_string(),
            past_participle: "gone".to_string(),
            ask_counter: 1,
            state: 0,
        };
        store.add_verb(&verb).await.unwrap();
        store.adjust_verb_state("go", 2).await.unwrap();

        // Re-adding replaces the forms but keeps the state.
        let revised = IrregularVerb {
            past_participle: "gone (pp)".to_string(),
            ..verb.clone()
        };
        store.add_verb(&revised).await.unwrap();
        let fetched = store.fetch_verb("go").await.unwrap().unwrap();
        assert_eq!(fetched.past_participle, "gone (pp)");
        assert_eq!(fetched.state, 2);

        store
            .add_theme(&GrammarTheme {
                name: "Present Perfect".to_string(),
                description: "have/has + past participle".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(store.all_themes().await.unwrap().len(), 1);
        assert!(store.delete_theme("Present Perfect").await.unwrap());
        assert!(!store.delete_theme("Present Perfect").await.unwrap());
    }
}
