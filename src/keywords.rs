use crate::models::KeywordRanking;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// Common English function words that carry no topical signal.
static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any",
        "are", "as", "at", "be", "because", "been", "before", "being", "below", "between",
        "both", "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during",
        "each", "few", "for", "from", "further", "had", "has", "have", "having", "he", "her",
        "here", "hers", "herself", "him", "himself", "his", "how", "i", "if", "in", "into",
        "is", "it", "its", "itself", "just", "me", "more", "most", "my", "myself", "no", "nor",
        "not", "now", "of", "off", "on", "once", "only", "or", "other", "our", "ours",
        "ourselves", "out", "over", "own", "same", "she", "should", "so", "some", "such",
        "than", "that", "the", "their", "theirs", "them", "themselves", "then", "there",
        "these", "they", "this", "those", "through", "to", "too", "under", "until", "up",
        "very", "was", "we", "were", "what", "when", "where", "which", "while", "who", "whom",
        "why", "will", "with", "would", "you", "your", "yours", "yourself", "yourselves",
    ]
    .into_iter()
    .collect()
});

/// Lowercases the text, blanks out everything except ASCII letters, digits, whitespace and
/// hyphens, and splits on whitespace runs.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || c == '-' {
                c
            } else {
                ' '
            }
        })
        .collect();

    normalized.split_whitespace().map(str::to_string).collect()
}

pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(token)
}

/// Whether a token may take part in keyword and phrase counts.
fn is_candidate(token: &str) -> bool {
    !is_stopword(token)
        && !token.chars().all(|c| c.is_ascii_digit())
        && token.chars().any(|c| c.is_ascii_alphanumeric())
}

/// Frequency counter that remembers first-seen order so ties rank deterministically.
#[derive(Default)]
struct FrequencyTable {
    entries: Vec<(String, usize)>,
    index: HashMap<String, usize>,
}

impl FrequencyTable {
    fn add(&mut self, term: String) {
        match self.index.get(&term) {
            Some(&i) => self.entries[i].1 += 1,
            None => {
                self.index.insert(term.clone(), self.entries.len());
                self.entries.push((term, 1));
            }
        }
    }

    fn top(mut self, n: usize) -> Vec<String> {
        // Stable sort keeps first-seen order among equal counts
        self.entries.sort_by(|a, b| b.1.cmp(&a.1));
        self.entries
            .into_iter()
            .take(n)
            .map(|(term, _)| term)
            .collect()
    }
}

/// Ranks single words and two/three-word phrases by frequency.
///
/// Returns the top `floor(max * 0.6)` words as keywords, and the top `floor(max * 0.3)`
/// bigrams followed by the top `floor(max * 0.1)` trigrams as phrases. Phrases only form
/// from tokens that are adjacent in the original text: a filtered token between two
/// candidates breaks the phrase instead of being skipped over.
pub fn rank(text: &str, max: usize) -> KeywordRanking {
    let tokens = tokenize(text);
    let keep: Vec<bool> = tokens.iter().map(|t| is_candidate(t)).collect();

    let mut unigrams = FrequencyTable::default();
    let mut bigrams = FrequencyTable::default();
    let mut trigrams = FrequencyTable::default();

    for (i, token) in tokens.iter().enumerate() {
        if !keep[i] {
            continue;
        }
        unigrams.add(token.clone());

        if keep.get(i + 1).copied().unwrap_or(false) {
            bigrams.add(format!("{} {}", token, tokens[i + 1]));

            if keep.get(i + 2).copied().unwrap_or(false) {
                trigrams.add(format!("{} {} {}", token, tokens[i + 1], tokens[i + 2]));
            }
        }
    }

    let mut phrases = bigrams.top(tenths_of(max, 3));
    phrases.extend(trigrams.top(tenths_of(max, 1)));

    KeywordRanking {
        keywords: unigrams.top(tenths_of(max, 6)),
        phrases,
    }
}

/// `floor(max * tenths / 10)` without overflowing for large `max`.
fn tenths_of(max: usize, tenths: usize) -> usize {
    max / 10 * tenths + max % 10 * tenths / 10
}
