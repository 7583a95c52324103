//! Word trainer: riddle-based guessing over a category of stored words
//!
//! A training round is a small state machine: readiness gate, riddle,
//! guessing (with an optional clarification dialog), grading, mastery
//! update. The next word is drawn at random, weighted toward the least
//! mastered.

use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;
use std::time::Duration;

use crate::error::Result;
use crate::store::{CategoryFilter, Word};
use crate::tutor::mastery;
use crate::tutor::router::required;
use crate::tutor::selector;
use crate::tutor::session::{AppContext, Mode, ModeKind, Outcome};
use crate::tutor::words;
use crate::ui;

/// Replies at the readiness gate that mean "not yet".
const NOT_READY: [&str; 7] = ["n", "no", "not ready", "not yet", "nope", "nah", "nay"];

pub struct WordTrainer {
    /// Category of the running session, if any.
    filter: Option<CategoryFilter>,
    /// Words already drawn in the current pass over the pool.
    used: HashSet<String>,
    include_fully_mastered: bool,
}

impl WordTrainer {
    pub fn new() -> Self {
        Self {
            filter: None,
            used: HashSet::new(),
            include_fully_mastered: false,
        }
    }

    /// Run training rounds until the learner quits or the pool runs dry.
    async fn train(&mut self, ctx: &mut AppContext, category: &str) -> Result<Outcome> {
        let (category, full) = match category.strip_suffix("--full") {
            Some(rest) => (rest.trim(), true),
            None => (category.trim(), false),
        };
        self.filter = Some(CategoryFilter::parse(Some(category)));
        self.include_fully_mastered = full;
        self.used.clear();

        loop {
            let filter = self.filter.clone().unwrap_or(CategoryFilter::Uncategorized);
            let pool = ctx.store.fetch_words(&filter).await?;
            if pool.is_empty() {
                ui::dim("No words in this category. /a lists what is stored.");
                return Ok(Outcome::Continue);
            }
            show_stats(&pool);

            let Some(word) = self.draw(&pool) else {
                ui::dim("Every word in this category is done for now.");
                return Ok(Outcome::Continue);
            };
            ctx.previous_argument = Some(word.word.clone());

            if !readiness_gate(ctx).await? {
                return Ok(Outcome::Continue);
            }

            if let Outcome::Quit = run_round(ctx, &word).await? {
                return Ok(Outcome::Continue);
            }
        }
    }

    /// Weighted draw; one reset when the current pass is exhausted.
    fn draw(&mut self, pool: &[Word]) -> Option<Word> {
        if let Some(word) = selector::select(pool, &mut self.used, self.include_fully_mastered) {
            return Some(word.clone());
        }
        if self.used.is_empty() {
            // Nothing was eligible to begin with.
            return None;
        }
        ui::dim("Pool exhausted; starting the next pass.");
        self.used.clear();
        selector::select(pool, &mut self.used, self.include_fully_mastered).cloned()
    }
}

#[async_trait]
impl Mode for WordTrainer {
    fn kind(&self) -> ModeKind {
        ModeKind::WordTrainer
    }

    fn prompt(&self) -> &'static str {
        "train"
    }

    async fn handle_command(
        &mut self,
        ctx: &mut AppContext,
        action: &str,
        argument: Option<&str>,
    ) -> Result<Outcome> {
        match action {
            "/l" | "/lookup" => {
                words::process_word(ctx, required(argument)?, false).await?;
                Ok(Outcome::Continue)
            }
            // Without an argument, list the session's category.
            "/a" | "/all" if argument.is_none() => {
                let filter = self.filter.clone().unwrap_or(CategoryFilter::Uncategorized);
                let pool = ctx.store.fetch_words(&filter).await?;
                ui::show_word_list(&pool);
                Ok(Outcome::Continue)
            }
            _ => Ok(Outcome::Unhandled),
        }
    }

    async fn handle_free_text(&mut self, ctx: &mut AppContext, input: &str) -> Result<Outcome> {
        self.train(ctx, input).await
    }
}

/// Ask until the learner is ready; a "no" earns an increasingly impatient
/// stalling remark. Returns false when the learner quits instead.
async fn readiness_gate(ctx: &mut AppContext) -> Result<bool> {
    let mut refusals: u32 = 0;
    loop {
        let prompt = if refusals == 0 { "Ready for the next word?" } else { "Now?" };
        let Some(reply) = ctx.read_line(prompt)? else {
            return Ok(false);
        };
        let reply = reply.to_lowercase();
        if reply == "/q" || reply == "/quit" {
            return Ok(false);
        }
        if NOT_READY.contains(&reply.as_str()) {
            refusals += 1;
            let stream = ctx.teacher.stall(refusals).await?;
            ctx.show_stream(stream).await?;
            continue;
        }
        return Ok(true);
    }
}

/// One full round for one word: riddle, guesses, grading, mastery update.
async fn run_round(ctx: &mut AppContext, word: &Word) -> Result<Outcome> {
    ui::robot(&token_clue(&word.word));
    let stream = ctx.teacher.riddle(&word.word).await?;
    let riddle = ctx.show_stream(stream).await?;

    let Some(guess) = collect_guess(ctx, word, &riddle).await? else {
        // Quitting mid-riddle leaves the word's state untouched.
        return Ok(Outcome::Quit);
    };

    grade_guess(ctx, word, &guess).await
}

/// A one-word answer or a multi-word phrase? Tell the learner which.
fn token_clue(word: &str) -> String {
    let tokens = word.split_whitespace().count();
    if tokens <= 1 {
        "The answer is a single word.".to_string()
    } else {
        format!("The answer is a phrase of {tokens} words.")
    }
}

/// Read guesses; `? question` opens a clarification dialog about the riddle
/// that never names the answer. `None` means the learner quit.
async fn collect_guess(ctx: &mut AppContext, word: &Word, riddle: &str) -> Result<Option<String>> {
    let mut dialog_open = false;
    loop {
        let Some(line) = ctx.read_line("Your guess ('? question' asks about the riddle)")? else {
            return Ok(None);
        };
        if line.is_empty() {
            continue;
        }
        if line == "/q" || line == "/quit" {
            return Ok(None);
        }
        if let Some(question) = line.strip_prefix('?') {
            let question = question.trim();
            if question.is_empty() {
                ui::dim("Ask something after the question mark.");
                continue;
            }
            if !dialog_open {
                ctx.teacher.start_riddle_dialog(&word.word, riddle);
                dialog_open = true;
            }
            let stream = ctx.teacher.converse(question).await?;
            let reply = ctx.show_stream(stream).await?;
            ctx.teacher.note_reply(&reply);
            continue;
        }
        return Ok(Some(line));
    }
}

/// Grade a guess and move the word's mastery one step.
///
/// A literal match needs no grader call. An incorrect answer offers a chat
/// about the word before moving on.
async fn grade_guess(ctx: &mut AppContext, word: &Word, guess: &str) -> Result<Outcome> {
    let correct = if guess.trim().eq_ignore_ascii_case(word.word.trim()) {
        ui::robot("Correct! That is the word, letter for letter.");
        true
    } else {
        let spinner = thinking_spinner();
        let verdict = ctx.teacher.grade(&word.word, guess).await;
        spinner.finish_and_clear();
        let verdict = verdict?;
        ui::robot(&verdict);
        ctx.last_output = Some(verdict.clone());
        ctx.speak_last().await;
        verdict_is_correct(&verdict)
    };

    if correct {
        ctx.store.adjust_state(&word.word, 1).await?;
        return Ok(Outcome::Continue);
    }

    ctx.store.adjust_state(&word.word, -1).await?;
    ui::info(&format!("The word was \"{}\".", word.word));

    let Some(reply) = ctx.read_line("Chat about this word? y/n")? else {
        return Ok(Outcome::Quit);
    };
    if reply == "/q" || reply == "/quit" {
        return Ok(Outcome::Quit);
    }
    if reply.eq_ignore_ascii_case("y") {
        return words::chat_about_word(ctx, &word.word).await;
    }
    Ok(Outcome::Continue)
}

/// The grader's verdict line starts with "Correct" or "Incorrect"; anything
/// that does not start with "correct" counts as incorrect.
pub fn verdict_is_correct(verdict: &str) -> bool {
    verdict
        .trim_start_matches(ui::ROBOT)
        .trim()
        .to_lowercase()
        .starts_with("correct")
}

fn thinking_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.blue} grading...") {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn show_stats(pool: &[Word]) {
    let mut counts = [0usize; mastery::LEVELS.len()];
    for word in pool {
        counts[word.state.min(mastery::TOP) as usize] += 1;
    }
    ui::show_training_stats(&counts, pool.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_classification() {
        assert!(verdict_is_correct("Correct! Close enough."));
        assert!(verdict_is_correct("  correct, well done"));
        assert!(verdict_is_correct(&format!("{} Correct!", ui::ROBOT)));
        assert!(!verdict_is_correct("Incorrect. The word means something else."));
        assert!(!verdict_is_correct("That is not quite right."));
        assert!(!verdict_is_correct(""));
    }

    #[test]
    fn token_clue_counts_phrase_words() {
        assert_eq!(token_clue("apple"), "The answer is a single word.");
        assert_eq!(token_clue("give up"), "The answer is a phrase of 2 words.");
        assert_eq!(
            token_clue("  out   of  the blue "),
            "The answer is a phrase of 4 words."
        );
    }

    #[test]
    fn affirmatives_pass_the_readiness_gate() {
        for reply in ["yes", "ready", "y", "go", "sure"] {
            assert!(!NOT_READY.contains(&reply), "{reply} must not stall");
        }
        for reply in ["no", "not yet", "nah"] {
            assert!(NOT_READY.contains(&reply), "{reply} must stall");
        }
    }
}
