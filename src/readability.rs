//! Flesch reading-ease scoring for page copy.

use crate::models::ReadabilityReport;

/// Lower bounds of the reading-ease bands, highest first.
const LEVELS: [(f64, &str); 6] = [
    (90.0, "very easy"),
    (80.0, "easy"),
    (70.0, "fairly easy"),
    (60.0, "standard"),
    (50.0, "fairly difficult"),
    (30.0, "difficult"),
];

pub fn analyze(text: &str) -> ReadabilityReport {
    let words: Vec<&str> = text
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| !w.is_empty())
        .collect();

    if words.is_empty() {
        return ReadabilityReport {
            sentences: 0,
            words: 0,
            syllables: 0,
            average_words_per_sentence: 0.0,
            average_syllables_per_word: 0.0,
            flesch_reading_ease: 0.0,
            level: "n/a".to_string(),
        };
    }

    let sentences = count_sentences(text).max(1);
    let syllables: usize = words.iter().map(|w| count_syllables(w)).sum();

    let words_per_sentence = words.len() as f64 / sentences as f64;
    let syllables_per_word = syllables as f64 / words.len() as f64;
    let ease = (206.835 - 1.015 * words_per_sentence - 84.6 * syllables_per_word).clamp(0.0, 100.0);

    ReadabilityReport {
        sentences,
        words: words.len(),
        syllables,
        average_words_per_sentence: round_to(words_per_sentence, 2),
        average_syllables_per_word: round_to(syllables_per_word, 2),
        flesch_reading_ease: round_to(ease, 1),
        level: level_for(ease).to_string(),
    }
}

/// Runs of text ending in `.`, `!` or `?`; a trailing run without a terminator counts too.
fn count_sentences(text: &str) -> usize {
    text.split(|c: char| matches!(c, '.' | '!' | '?'))
        .filter(|s| s.chars().any(char::is_alphanumeric))
        .count()
}

/// Vowel-group heuristic: each run of vowels is a syllable, a silent trailing `e`
/// (but not `-le`) is dropped, and every word has at least one.
pub fn count_syllables(word: &str) -> usize {
    let word: String = word
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .collect();

    let mut count = 0;
    let mut previous_was_vowel = false;
    for c in word.chars() {
        let is_vowel = matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
        if is_vowel && !previous_was_vowel {
            count += 1;
        }
        previous_was_vowel = is_vowel;
    }

    if count > 1 && word.ends_with('e') && !word.ends_with("le") {
        count -= 1;
    }

    count.max(1)
}

fn level_for(ease: f64) -> &'static str {
    LEVELS
        .iter()
        .find(|(min, _)| ease >= *min)
        .map_or("very difficult", |(_, level)| *level)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
