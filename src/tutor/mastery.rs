//! Mastery model: nine ordered proficiency levels with clamped updates
//!
//! Policy: a lookup of an already-stored item decrements the level by one (a
//! needed reminder counts as forgetting), a correct training answer
//! increments it, an incorrect one decrements it. No path ever leaves the
//! `[0, TOP]` range.

/// Ordered mastery labels, least to most mastered.
pub const LEVELS: [&str; 9] = [
    "new",
    "seen",
    "learning",
    "familiar",
    "understood",
    "practiced",
    "applied",
    "confident",
    "mastered",
];

/// Index of the top ("mastered") level.
pub const TOP: u8 = (LEVELS.len() - 1) as u8;

/// Apply a delta to a mastery level, clamped into `[0, TOP]`.
pub fn adjust(current: u8, delta: i8) -> u8 {
    (current as i16 + delta as i16).clamp(0, TOP as i16) as u8
}

/// Human-readable label for a level, clamped for out-of-range values.
pub fn label(level: u8) -> &'static str {
    LEVELS[level.min(TOP) as usize]
}

/// Parse a manual state entry: a level index or a level name.
pub fn parse_level(input: &str) -> Option<u8> {
    let input = input.trim();
    input
        .parse::<i16>()
        .ok()
        .filter(|n| (0..=TOP as i16).contains(n))
        .map(|n| n as u8)
        .or_else(|| {
            LEVELS
                .iter()
                .position(|l| l.eq_ignore_ascii_case(input))
                .map(|i| i as u8)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjust_clamps_at_both_ends() {
        assert_eq!(adjust(0, -1), 0);
        assert_eq!(adjust(TOP, 1), TOP);
        assert_eq!(adjust(4, 1), 5);
        assert_eq!(adjust(4, -1), 3);
        assert_eq!(adjust(0, i8::MIN), 0);
        assert_eq!(adjust(TOP, i8::MAX), TOP);
    }

    #[test]
    fn adjust_never_escapes_range() {
        for level in 0..=TOP {
            for delta in [-120i8, -9, -1, 0, 1, 9, 120] {
                let next = adjust(level, delta);
                assert!(next <= TOP);
            }
        }
    }

    #[test]
    fn labels_are_ordered() {
        assert_eq!(label(0), "new");
        assert_eq!(label(TOP), "mastered");
        assert_eq!(label(200), "mastered");
    }

    #[test]
    fn manual_level_parsing() {
        assert_eq!(parse_level("3"), Some(3));
        assert_eq!(parse_level(" 8 "), Some(8));
        assert_eq!(parse_level("9"), None);
        assert_eq!(parse_level("-1"), None);
        assert_eq!(parse_level("three"), None);
        assert_eq!(parse_level("mastered"), Some(TOP));
        assert_eq!(parse_level("NEW"), Some(0));
    }
}
