use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    // Runs of letters/digits/underscores; hyphens and all other punctuation
    // act as separators.
    static ref TOKEN_RE: Regex = Regex::new(r"[\p{L}\p{N}_]+").expect("valid regex");
    static ref STOP_WORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a", "an", "the", "and", "or", "but", "is", "of", "in", "to", "for", "with",
            "on", "at", "by", "from", "up", "down", "out", "about", "into", "as", "then",
            "now", "it", "its", "are", "was", "were", "be", "been", "that", "this",
            "must", "can", "will", "i", "my",
        ];
        words.iter().copied().collect()
    };
}

fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(token)
}

/// Tokenize text into lowercase word tokens using NFKC normalization,
/// punctuation stripping, and stop-word removal. Order is preserved and
/// duplicates are retained; callers dedupe if they need to.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = text.nfkc().collect::<String>().to_lowercase();
    TOKEN_RE
        .find_iter(&normalized)
        .map(|m| m.as_str().to_string())
        .filter(|t| !is_stop_word(t))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_strips_punctuation() {
        let t = tokenize("Forza Horizon 5: Premium!");
        assert_eq!(t, vec!["forza", "horizon", "5", "premium"]);
    }

    #[test]
    fn hyphens_split_words() {
        assert_eq!(tokenize("open-world"), vec!["open", "world"]);
    }

    #[test]
    fn drops_stop_words() {
        let t = tokenize("The rise and fall of an empire");
        assert_eq!(t, vec!["rise", "fall", "empire"]);
    }

    #[test]
    fn keeps_underscores_and_digits() {
        assert_eq!(tokenize("half_life 2"), vec!["half_life", "2"]);
    }

    #[test]
    fn retains_duplicates_in_order() {
        assert_eq!(tokenize("war of war"), vec!["war", "war"]);
    }

    #[test]
    fn empty_and_punctuation_only_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("!!! ... ---").is_empty());
    }

    #[test]
    fn keeps_unicode_letters() {
        assert_eq!(tokenize("Café Simulator"), vec!["café", "simulator"]);
    }
}
