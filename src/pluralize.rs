//! English pluralization for entity names
//!
//! Deliberately simple: words too far off the usual rules come out wrong
//! (`goose -> gooses`).

/// Words ending in `o` that take `es`
const O_EXCEPTIONS: &[&str] = &["echo", "embargo", "hero", "potato", "tomato", "veto", "volcano"];

enum Rule {
    /// Swap the matched suffix for a replacement
    Replace(&'static [&'static str], &'static str),
    /// Append to the whole word
    Concat(&'static [&'static str], &'static str),
    /// Append to listed words only
    Exception(&'static [&'static str], &'static str),
    /// Leave the word as-is
    Keep(&'static [&'static str]),
}

const RULES: &[Rule] = &[
    Rule::Replace(&["ex"], "ices"),
    Rule::Replace(&["us"], "i"),
    Rule::Concat(&["oof"], "s"),
    Rule::Replace(&["f"], "ves"),
    Rule::Replace(&["fe"], "ves"),
    Rule::Replace(&["is"], "es"),
    Rule::Replace(&["um"], "a"),
    Rule::Exception(O_EXCEPTIONS, "es"),
    Rule::Concat(&["ay", "ey", "iy", "oy", "uy"], "s"),
    Rule::Replace(&["y"], "ies"),
    Rule::Keep(&["craft"]),
    Rule::Concat(&["ch", "sh", "s", "x", "z"], "es"),
];

impl Rule {
    fn apply(&self, word: &str) -> Option<String> {
        let ending = |suffixes: &[&'static str]| suffixes.iter().copied().find(|s| word.ends_with(s));

        match self {
            Rule::Replace(suffixes, replacement) => {
                ending(suffixes).map(|suffix| format!("{}{}", &word[..word.len() - suffix.len()], replacement))
            }
            Rule::Concat(suffixes, tail) => ending(suffixes).map(|_| format!("{}{}", word, tail)),
            Rule::Exception(words, tail) => words.contains(&word).then(|| format!("{}{}", word, tail)),
            Rule::Keep(suffixes) => ending(suffixes).map(|_| word.to_string()),
        }
    }
}

/// Plural form of `word`, trimmed and lowercased. Empty input gives `""`.
pub fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }

    let word = word.trim().to_lowercase();

    RULES
        .iter()
        .find_map(|rule| rule.apply(&word))
        .unwrap_or_else(|| format!("{}s", word))
}
