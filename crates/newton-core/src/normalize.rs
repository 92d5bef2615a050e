// ─────────────────────────────────────────────────────────────────────
// Newton Governor — Text Normalizer
// ─────────────────────────────────────────────────────────────────────
//! Canonical form used by every phrase detector: lowercase, filler
//! words removed, whitespace collapsed and trimmed.

use std::sync::LazyLock;

use regex::Regex;

static FILLER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:um+|uh+|like|just|actually|kinda|sorta|i guess|idk|i don'?t know)\b")
        .expect("filler pattern is a valid regex")
});

/// Normalize raw text for matching.
///
/// Filler removal repeats until nothing changes, since dropping one
/// filler can join two words into another ("i just guess"). Each pass
/// that changes the text shortens it, so the loop terminates.
pub fn normalize(raw: &str) -> String {
    let mut current = collapse_whitespace(&raw.to_lowercase());
    loop {
        let next = collapse_whitespace(&FILLER.replace_all(&current, " "));
        if next == current {
            return next;
        }
        current = next;
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_lowercases_and_trims() {
        assert_eq!(normalize("  Hello   WORLD \n"), "hello world");
    }

    #[test]
    fn test_removes_fillers() {
        assert_eq!(
            normalize("Um, I just kinda want, like, an answer"),
            ", i want, , an answer"
        );
        assert_eq!(normalize("uhhh idk what to say"), "what to say");
        assert_eq!(normalize("I don't know I dont know ok"), "ok");
    }

    #[test]
    fn test_fillers_are_whole_words() {
        assert_eq!(normalize("unlikely justice"), "unlikely justice");
        assert_eq!(normalize("drum umbrella"), "drum umbrella");
    }

    #[test]
    fn test_nested_filler_reaches_fixpoint() {
        assert_eq!(normalize("i just guess so"), "so");
        let once = normalize("i just guess so");
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn test_empty_and_whitespace() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \t\n "), "");
    }

    proptest! {
        #[test]
        fn prop_idempotent(text in ".{0,200}") {
            let once = normalize(&text);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn prop_idempotent_on_filler_soup(
            words in prop::collection::vec(
                prop::sample::select(vec![
                    "i", "just", "guess", "um", "like", "don't", "know", "idk", "so", "Actually",
                ]),
                0..20,
            )
        ) {
            let text = words.join(" ");
            let once = normalize(&text);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn prop_no_edge_or_double_spaces(text in ".{0,200}") {
            let out = normalize(&text);
            prop_assert!(!out.starts_with(' ') && !out.ends_with(' '));
            prop_assert!(!out.contains("  "));
        }
    }
}
