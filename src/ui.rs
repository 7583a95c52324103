//! Presentation layer
//!
//! Plain structured text over ANSI colors. The tutor core hands text here
//! and never assumes anything about the terminal beyond "printed before the
//! next prompt".

use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use std::io::{self, Write};

use crate::store::{GrammarTheme, IrregularVerb, Word};
use crate::tutor::mastery;
use crate::tutor::session::ModeKind;

pub const ROBOT: &str = "\u{1F916}";

/// Print colored output
fn print_colored(text: &str, color: Color) {
    let _ = execute!(
        io::stdout(),
        SetForegroundColor(color),
        Print(text),
        ResetColor
    );
}

/// Print a dimmed line
pub fn dim(text: &str) {
    print_colored(&format!("{text}\n"), Color::DarkGrey);
}

/// Print a success message
pub fn success(text: &str) {
    print_colored(&format!("{text}\n"), Color::Green);
}

/// Print an info message
pub fn info(text: &str) {
    print_colored(&format!("{text}\n"), Color::Cyan);
}

/// Print an error message
pub fn error(text: &str) {
    print_colored(&format!("{text}\n"), Color::Red);
}

/// Print a header line
pub fn header(text: &str) {
    print_colored(&format!("\n{text}\n"), Color::Cyan);
}

/// Print a robot-prefixed remark (clues, verdicts, asides).
pub fn robot(text: &str) {
    print_colored(&format!("{ROBOT} {text}\n"), Color::Blue);
}

/// Begin a streamed answer: robot prefix, no newline.
pub fn stream_begin() {
    print!("{ROBOT} ");
    let _ = io::stdout().flush();
}

/// Print one streamed fragment.
pub fn stream_chunk(chunk: &str) {
    print!("{chunk}");
    let _ = io::stdout().flush();
}

/// Finish a streamed answer.
pub fn stream_end() {
    println!();
    println!();
}

/// Display a stored word: both explanations under a highlighted title.
pub fn show_word(word: &Word) {
    header(&format!("── {} ──", word.word));
    println!("{}\n", word.explanation_en.trim());
    print_colored(&format!("{}\n\n", word.explanation_ru.trim()), Color::Blue);
    dim(&format!(
        "category: {} | asks: {} | state: {}",
        if word.category.is_empty() { "uncategorized" } else { &word.category },
        word.ask_counter,
        mastery::label(word.state)
    ));
}

/// Category overview: name, average mastery label, word count.
pub fn show_categories(rows: &[(String, &'static str, i64)], total: i64) {
    header("Categories");
    println!("  {:<24} {:<12} {:>5}", "Category", "Avg state", "Count");
    println!("  {}", "─".repeat(45));
    println!("  {:<24} {:<12} {:>5}", "Total words", "", total);
    for (name, avg, count) in rows {
        let name = if name.is_empty() { "Uncategorized" } else { name };
        println!("  {:<24} {:<12} {:>5}", name, avg, count);
    }
    println!();
}

/// Per-level counts shown before each training round.
pub fn show_training_stats(counts: &[usize; mastery::LEVELS.len()], total: usize) {
    header("Training stats");
    println!("  {:<14} {:>5}", "Total words", total);
    for (i, label) in mastery::LEVELS.iter().enumerate() {
        if counts[i] > 0 {
            println!("  {:<14} {:>5}", label, counts[i]);
        }
    }
    println!();
}

/// Full word listing, weakest first.
pub fn show_word_list(words: &[Word]) {
    if words.is_empty() {
        dim("No words match.");
        return;
    }
    let width = crossterm::terminal::size().map(|(w, _)| w as usize).unwrap_or(80);
    let word_col = width.saturating_sub(30).max(20);

    let mut sorted: Vec<&Word> = words.iter().collect();
    sorted.sort_by_key(|w| (w.state, w.word.clone()));

    println!("  {:<word_col$} {:<15} {}", "Word", "Category", "State");
    println!("  {}", "─".repeat(width.saturating_sub(4)));
    for w in sorted {
        let category = if w.category.is_empty() { "Uncategorized" } else { &w.category };
        println!(
            "  {:<word_col$} {:<15} {}",
            w.word,
            category,
            mastery::label(w.state)
        );
    }
    println!();
}

pub fn show_verb_list(verbs: &[IrregularVerb]) {
    if verbs.is_empty() {
        dim("No verbs stored yet.");
        return;
    }
    println!(
        "  {:<18} {:<18} {:<18} {:>5}  {}",
        "Base", "Past simple", "Past participle", "Asks", "State"
    );
    println!("  {}", "─".repeat(72));
    for v in verbs {
        println!(
            "  {:<18} {:<18} {:<18} {:>5}  {}",
            v.base_form,
            v.past_simple,
            v.past_participle,
            v.ask_counter,
            mastery::label(v.state)
        );
    }
    println!();
}

pub fn show_theme_list(themes: &[GrammarTheme]) {
    if themes.is_empty() {
        dim("No grammar themes stored yet.");
        return;
    }
    header("Grammar themes");
    for t in themes {
        println!("  {}", t.name);
        dim(&format!("    {}", t.description));
    }
    println!();
}

/// Mode-specific help screen.
pub fn show_help(kind: ModeKind) {
    let shared: &[(&str, &str)] = &[
        ("/h, /help", "Show this help message"),
        ("/i, /info {word}", "Show a word's record (previous word if omitted)"),
        ("/n, /new {word}", "Look up a word or phrase"),
        ("/m, /man {word}", "Manually set a word's category and state"),
        ("/ct, /cat", "Show categories with average mastery"),
        ("/a, /all {category}", "List words ('all' for everything, empty for uncategorized)"),
        ("/d, /del {word}", "Delete a word"),
        ("/c, /conv {word}", "Chat about a word (/bye ends the chat)"),
        ("/say {text}", "Speak text (or the last output)"),
        ("/voice on|off", "Toggle speaking generated output"),
        ("/stop", "Stop audio playback"),
        ("/q, /quit", "Quit"),
    ];

    let (title, specific): (&str, &[(&str, &str)]) = match kind {
        ModeKind::Dictionary => (
            "Dictionary mode",
            &[
                ("{word or phrase}", "Look up a word or phrase"),
                ("/u, /upd {word}", "Regenerate an existing word's texts (progress kept)"),
            ],
        ),
        ModeKind::WordTrainer => (
            "Word trainer",
            &[
                ("{category}", "Start training ('all' for every word; append ' --full' to include mastered)"),
                ("/l, /lookup {word}", "Look up a word without leaving the trainer"),
                ("? {question}", "Ask about the current riddle before guessing"),
                ("{guess}", "Guess the hidden word"),
            ],
        ),
        ModeKind::VerbTrainer => (
            "Verb trainer",
            &[
                ("{verb}", "Look up an irregular verb"),
                ("/nv, /newverb {verb}", "Add an irregular verb"),
                ("/dv, /delverb {verb}", "Delete a verb"),
                ("/iv, /infoverb {verb}", "Show a verb's record"),
                ("/av, /allverbs", "List all verbs"),
                ("/cv, /convverb {verb}", "Chat about a verb (/bye ends the chat)"),
                ("/g, /game", "Start the verb drilling game"),
            ],
        ),
        ModeKind::Grammar => (
            "Grammar tutor",
            &[
                ("{theme}", "Start a conversation about a stored theme"),
                ("/nt, /newtheme", "Add a grammar theme"),
                ("/dt, /deltheme {theme}", "Delete a theme"),
                ("/at, /allthemes", "List all themes"),
            ],
        ),
    };

    header(&format!("{title} commands"));
    for (cmd, desc) in specific.iter().chain(shared) {
        print_colored(&format!("  {:<24}", cmd), Color::Cyan);
        println!(" {desc}");
    }
    println!();
}
