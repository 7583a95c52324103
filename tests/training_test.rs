//! Integration tests for command parsing, item selection, and grading rules.

use std::collections::HashSet;

use word_tutor::store::Word;
use word_tutor::tutor::mastery;
use word_tutor::tutor::router::{parse_command, Parsed};
use word_tutor::tutor::selector;
use word_tutor::tutor::word_trainer::verdict_is_correct;

fn word(key: &str, state: u8) -> Word {
    Word {
        word: key.to_string(),
        category: String::new(),
        explanation_en: String::new(),
        explanation_ru: String::new(),
        ask_counter: 1,
        state,
    }
}

#[test]
fn command_parsing_covers_the_fallback_rules() {
    // A plain command with an argument.
    assert_eq!(
        parse_command("/new take off", None),
        Parsed::Command {
            action: "/new".to_string(),
            argument: Some("take off".to_string()),
        }
    );

    // No argument, no previous one either.
    assert_eq!(
        parse_command("/cat", None),
        Parsed::Command {
            action: "/cat".to_string(),
            argument: None,
        }
    );

    // No argument: the previous one is inherited.
    assert_eq!(
        parse_command("/info", Some("take off")),
        Parsed::Command {
            action: "/info".to_string(),
            argument: Some("take off".to_string()),
        }
    );

    // An explicit argument always wins over the previous one.
    assert_eq!(
        parse_command("/info apple", Some("take off")),
        Parsed::Command {
            action: "/info".to_string(),
            argument: Some("apple".to_string()),
        }
    );

    // Anything that does not start with a slash is free text.
    assert_eq!(
        parse_command("  what does it mean?  ", Some("x")),
        Parsed::Text("what does it mean?".to_string())
    );
}

#[test]
fn selection_is_weighted_exclusive_and_finite() {
    let pool: Vec<Word> = vec![
        word("fresh", 0),
        word("halfway", 4),
        word("done", mastery::TOP),
    ];

    // The mastered word is invisible without the full flag.
    let mut exclude = HashSet::new();
    for _ in 0..2 {
        let picked = selector::select(&pool, &mut exclude, false).unwrap();
        assert_ne!(picked.word, "done");
    }
    // Two draws exhaust the two eligible words.
    assert!(selector::select(&pool, &mut exclude, false).is_none());

    // With the flag, one more draw finds the mastered word.
    let picked = selector::select(&pool, &mut exclude, true).unwrap();
    assert_eq!(picked.word, "done");
}

#[test]
fn weak_items_dominate_over_many_draws() {
    let pool = vec![word("weak", 0), word("strong", 7)];
    let mut weak_hits = 0;
    for _ in 0..1000 {
        let mut exclude = HashSet::new();
        if selector::select(&pool, &mut exclude, false).unwrap().word == "weak" {
            weak_hits += 1;
        }
    }
    // Weight 9 against weight 2: expect roughly 82% weak draws.
    assert!(weak_hits > 650, "weak item picked only {weak_hits}/1000 times");
}

#[test]
fn grading_verdicts_are_prefix_based() {
    assert!(verdict_is_correct("Correct! A close synonym."));
    assert!(verdict_is_correct("correct"));
    assert!(!verdict_is_correct("Incorrect. That word means the opposite."));
    // The verdict must start with the word, not merely contain it.
    assert!(!verdict_is_correct("That is correct."));
    assert!(!verdict_is_correct(""));
}

#[test]
fn mastery_levels_round_trip_between_label_and_index() {
    for level in 0..=mastery::TOP {
        let name = mastery::label(level);
        assert_eq!(mastery::parse_level(name), Some(level));
        assert_eq!(mastery::parse_level(&level.to_string()), Some(level));
    }
    assert_eq!(mastery::parse_level("9"), None);
    assert_eq!(mastery::parse_level("guru"), None);
}
