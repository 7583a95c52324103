//! Weighted random selection of the next training item
//!
//! Less-mastered items are drawn more often; a weight floor of 1 keeps every
//! eligible item reachable. The exclusion set grows with each draw, so a
//! finite pool is exhausted in at most `pool.len()` calls.

use rand::Rng;
use std::collections::HashSet;

use crate::store::{IrregularVerb, Word};
use crate::tutor::mastery;

/// Anything the trainer can drill: a key plus a mastery level.
pub trait Drillable {
    fn key(&self) -> &str;
    fn level(&self) -> u8;
}

impl Drillable for Word {
    fn key(&self) -> &str {
        &self.word
    }
    fn level(&self) -> u8 {
        self.state
    }
}

impl Drillable for IrregularVerb {
    fn key(&self) -> &str {
        &self.base_form
    }
    fn level(&self) -> u8 {
        self.state
    }
}

/// Pick the next training item from `pool`.
///
/// Items at the top mastery level are skipped unless `include_fully_mastered`
/// is set; items whose key is in `exclude` are skipped always. Returns `None`
/// when nothing is eligible (the caller is expected to clear `exclude` and
/// retry once). The selected key is added to `exclude` before returning.
pub fn select<'a, T: Drillable>(
    pool: &'a [T],
    exclude: &mut HashSet<String>,
    include_fully_mastered: bool,
) -> Option<&'a T> {
    let eligible: Vec<&T> = pool
        .iter()
        .filter(|item| include_fully_mastered || item.level() < mastery::TOP)
        .filter(|item| !exclude.contains(item.key()))
        .collect();

    if eligible.is_empty() {
        return None;
    }

    let weights: Vec<u32> = eligible
        .iter()
        .map(|item| (mastery::LEVELS.len() as u32).saturating_sub(item.level() as u32).max(1))
        .collect();
    let total: u32 = weights.iter().sum();

    let mut roll = rand::rng().random_range(0..total);
    let mut chosen = *eligible.last().expect("eligible set is non-empty");
    for (item, weight) in eligible.iter().zip(&weights) {
        if roll < *weight {
            chosen = item;
            break;
        }
        roll -= weight;
    }

    exclude.insert(chosen.key().to_string());
    Some(chosen)
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn never_returns_excluded_items() {
        let pool = vec![word("a", 0), word("b", 0)];
        let mut exclude: HashSet<String> = ["a".to_string()].into();
        for _ in 0..50 {
            let mut round = exclude.clone();
            let picked = select(&pool, &mut round, false).unwrap();
            assert_eq!(picked.key(), "b");
        }
        exclude.insert("b".to_string());
        assert!(select(&pool, &mut exclude, false).is_none());
    }

    #[test]
    fn skips_mastered_items_by_default() {
        let pool = vec![word("done", mastery::TOP), word("fresh", 0)];
        let mut exclude = HashSet::new();
        let picked = select(&pool, &mut exclude, false).unwrap();
        assert_eq!(picked.key(), "fresh");
        // With the flag set, the mastered word becomes eligible again.
        let mut exclude = HashSet::from(["fresh".to_string()]);
        let picked = select(&pool, &mut exclude, true).unwrap();
        assert_eq!(picked.key(), "done");
    }

    #[test]
    fn empty_pool_yields_none() {
        let pool: Vec<Word> = Vec::new();
        let mut exclude = HashSet::new();
        assert!(select(&pool, &mut exclude, false).is_none());
    }

    #[test]
    fn exhausts_pool_in_pool_size_draws() {
        let pool: Vec<Word> = (0..10).map(|i| word(&format!("w{i}"), i % 9)).collect();
        let mut exclude = HashSet::new();
        let mut seen = HashSet::new();
        for _ in 0..pool.len() {
            let picked = select(&pool, &mut exclude, true).unwrap();
            assert!(seen.insert(picked.key().to_string()), "repeat within a pass");
        }
        assert!(select(&pool, &mut exclude, true).is_none());
    }

    #[test]
    fn weights_favor_weak_items() {
        // A level-0 item carries weight 9 against weight 1 for a level-8
        // item drilled with the full flag; over many draws the weak item
        // must dominate.
        let pool = vec![word("weak", 0), word("strong", mastery::TOP)];
        let mut weak_hits = 0;
        for _ in 0..500 {
            let mut exclude = HashSet::new();
            if select(&pool, &mut exclude, true).unwrap().key() == "weak" {
                weak_hits += 1;
            }
        }
        assert!(weak_hits > 350, "weak item picked only {weak_hits}/500 times");
    }
}
