//! Leetspeak Substitution
//!
//! Static table of visually similar replacements per lowercase letter, and a
//! bounded depth-first expansion over the substitutable positions of a word.
//!
//! The expansion walks positions left to right. Substituting position `n`
//! opens a branch for every replacement of position `n + 1`, so each variant
//! is a chain of substitutions starting at the first substitutable position.
//! Two caps keep the tree finite: only the first [`MAX_LEET_POSITIONS`]
//! positions are ever touched, and at most [`MAX_LEET_VARIANTS`] words are
//! returned (the first ones in depth-first order, unmodified word first).

use std::collections::HashMap;
use std::sync::LazyLock;

/// Substitutable positions considered per word.
pub const MAX_LEET_POSITIONS: usize = 10;

/// Variants returned per word, including the word itself.
pub const MAX_LEET_VARIANTS: usize = 1000;

const LEET_TABLE: &[(char, &[&str])] = &[
    ('a', &["@", "4", "^", "/-\\", "A"]),
    ('b', &["8", "|3", "13", "B"]),
    ('c', &["(", "[", "<", "{", "C"]),
    ('d', &["|)", "|}", "D"]),
    ('e', &["3", "&", "€", "E"]),
    ('f', &["|=", "ph", "F"]),
    ('g', &["9", "6", "&", "G"]),
    ('h', &["#", "|-|", "H"]),
    ('i', &["1", "!", "|", "][", "I"]),
    ('j', &["_|", "J"]),
    ('k', &["|<", "1<", "K"]),
    ('l', &["1", "|", "7", "|_", "L"]),
    ('m', &["/\\/", "|\\/|", "M"]),
    ('n', &["/\\/", "|\\|", "N"]),
    ('o', &["0", "*", "()", "O"]),
    ('p', &["|*", "P"]),
    ('q', &["0_", "9", "Q"]),
    ('r', &["|2", "R"]),
    ('s', &["5", "$", "z", "§", "S"]),
    ('t', &["7", "+", "†", "T"]),
    ('u', &["|_|", "v", "U"]),
    ('v', &["\\/", "V"]),
    ('w', &["\\/\\/", "vv", "W"]),
    ('x', &["%", "><", "X"]),
    ('y', &["j", "`/", "Y"]),
    ('z', &["2", "%", "7_", "Z"]),
];

static LEET_MAP: LazyLock<HashMap<char, &'static [&'static str]>> =
    LazyLock::new(|| LEET_TABLE.iter().copied().collect());

/// Replacements for a lowercase letter, in table order. Empty for anything
/// not in the table.
pub fn substitutes(c: char) -> &'static [&'static str] {
    LEET_MAP.get(&c).copied().unwrap_or(&[])
}

/// One pending node of the depth-first walk.
struct Frame {
    segments: Vec<String>,
    depth: usize,
    next_option: usize,
}

/// All leetspeak variants of `word` (lowercased first), capped at
/// [`MAX_LEET_VARIANTS`]. The lowercased word itself is always the first
/// element. Empty input yields an empty result.
pub fn expand(word: &str) -> Vec<String> {
    if word.is_empty() {
        return Vec::new();
    }

    let lowered = word.to_lowercase();
    let chars: Vec<char> = lowered.chars().collect();
    let positions: Vec<usize> = chars
        .iter()
        .enumerate()
        .filter(|(_, c)| !substitutes(**c).is_empty())
        .map(|(i, _)| i)
        .take(MAX_LEET_POSITIONS)
        .collect();

    let mut variants = vec![lowered];
    let mut stack = vec![Frame {
        segments: chars.iter().map(|c| c.to_string()).collect(),
        depth: 0,
        next_option: 0,
    }];

    while variants.len() < MAX_LEET_VARIANTS {
        let Some(frame) = stack.last_mut() else {
            break;
        };
        if frame.depth >= positions.len() {
            stack.pop();
            continue;
        }

        let pos = positions[frame.depth];
        let options = substitutes(chars[pos]);
        if frame.next_option >= options.len() {
            stack.pop();
            continue;
        }

        let mut segments = frame.segments.clone();
        segments[pos] = options[frame.next_option].to_string();
        frame.next_option += 1;
        let depth = frame.depth + 1;

        variants.push(segments.concat());
        stack.push(Frame {
            segments,
            depth,
            next_option: 0,
        });
    }

    variants
}

/// Leet variants of every word, concatenated in input order.
pub fn expand_all<'a>(words: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    words.into_iter().flat_map(expand).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_always_included() {
        let variants = expand("pass");
        assert_eq!(variants[0], "pass");
        assert!(variants.contains(&"pass".to_string()));
    }

    #[test]
    fn test_lowercases_before_expanding() {
        let variants = expand("PASS");
        assert_eq!(variants[0], "pass");
        assert!(variants.contains(&"P@$$".to_string()));
    }

    #[test]
    fn test_depth_first_chain_order() {
        let variants = expand("pass");
        // p -> "|*" first, then recurse into 'a'
        assert_eq!(variants[1], "|*ass");
        assert_eq!(variants[2], "|*@ss");
        assert_eq!(variants[3], "|*@5s");
        assert_eq!(variants[4], "|*@55");
        // 2 + 2*5 + 2*5*5 + 2*5*5*5 substitutions plus the word itself
        assert_eq!(variants.len(), 313);
    }

    #[test]
    fn test_position_cap() {
        // 13 substitutable letters; only the first ten may change
        let word = "abcdefghijklm";
        let variants = expand(word);
        assert!(variants.len() > 1);
        for v in &variants {
            assert!(v.ends_with("klm"), "position beyond cap changed: {}", v);
        }
    }

    #[test]
    fn test_variant_cap() {
        let variants = expand("abcdefghijkl");
        assert_eq!(variants.len(), MAX_LEET_VARIANTS);
    }

    #[test]
    fn test_non_substitutable_word() {
        assert_eq!(expand("1234"), vec!["1234".to_string()]);
        assert!(expand("").is_empty());
    }

    #[test]
    fn test_multichar_replacement_keeps_positions() {
        // "m" expands to three characters; the following 'a' must still be found
        let variants = expand("ma");
        assert!(variants.contains(&"/\\/@".to_string()));
        assert!(variants.contains(&"M4".to_string()));
    }

    #[test]
    fn test_substitutes_lookup() {
        assert_eq!(substitutes('o'), &["0", "*", "()", "O"]);
        assert!(substitutes('7').is_empty());
        assert!(substitutes('A').is_empty());
    }
}
