use lazy_static::lazy_static;
use std::collections::{HashMap, HashSet};

lazy_static! {
    /// Hand-curated synonym lists for a few high-traffic genre words.
    /// Keys are matched against whole query tokens, not substrings.
    static ref CONCEPT_MAP: HashMap<&'static str, &'static [&'static str]> = {
        let mut m: HashMap<&'static str, &'static [&'static str]> = HashMap::new();
        m.insert(
            "vehicle",
            &[
                "car", "cars", "truck", "bus", "racing", "drive", "driving", "simulator",
                "automobil", "motor",
            ][..],
        );
        m.insert(
            "car",
            &[
                "vehicle", "racing", "drive", "drift", "rally", "motorsport", "auto", "speed",
                "forza", "gran", "turismo", "need", "wanted", "heat", "carbon",
            ][..],
        );
        m.insert(
            "racing",
            &[
                "car", "vehicle", "speed", "f1", "formula", "rally", "drift", "moto", "bike",
                "forza", "assetto", "crew",
            ][..],
        );
        m.insert(
            "fps",
            &[
                "shooter", "gun", "weapon", "war", "combat", "sniper", "strike", "counter",
                "cod", "call", "duty", "battlefield", "global", "offensive", "csgo", "apex",
                "valorant", "doom", "halo", "left", "dead",
            ][..],
        );
        m.insert(
            "shooter",
            &["fps", "gun", "shooting", "kill", "warfare", "sniper"][..],
        );
        m.insert(
            "rpg",
            &[
                "role", "playing", "adventure", "quest", "fantasy", "dragon", "witcher",
                "souls", "elden", "ring", "skyrim", "fallout", "baldur", "persona", "final",
                "fantasy",
            ][..],
        );
        m.insert(
            "horror",
            &[
                "scary", "zombie", "dead", "survival", "resident", "evil", "silent", "fear",
                "outlast", "amnesia", "phasmophobia",
            ][..],
        );
        m.insert(
            "soccer",
            &["football", "fifa", "pes", "manager", "sport", "fc"][..],
        );
        m.insert(
            "strategy",
            &[
                "rts", "tactical", "war", "civilization", "city", "build", "manage", "empire",
                "age", "empires", "total", "war",
            ][..],
        );
        m
    };
}

/// Synonyms for every query token that names a known concept,
/// deduplicated across tokens. Unknown tokens contribute nothing.
pub fn expand<'a, I>(tokens: I) -> HashSet<&'static str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut expansion = HashSet::new();
    for token in tokens {
        if let Some(synonyms) = CONCEPT_MAP.get(token) {
            expansion.extend(synonyms.iter().copied());
        }
    }
    expansion
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_concept_expands() {
        let terms = expand(["car"]);
        assert!(terms.contains("vehicle"));
        assert!(terms.contains("forza"));
        assert!(!terms.contains("car"));
    }

    #[test]
    fn unknown_tokens_expand_to_nothing() {
        assert!(expand(["portal"]).is_empty());
        assert!(expand([]).is_empty());
    }

    #[test]
    fn expansion_unions_across_tokens() {
        let terms = expand(["horror", "soccer"]);
        assert!(terms.contains("zombie"));
        assert!(terms.contains("fifa"));
    }

    #[test]
    fn matches_whole_tokens_only() {
        assert!(expand(["cars"]).is_empty());
        assert!(expand(["horrors"]).is_empty());
    }
}
