//! Deterministic article-text normalization
//!
//! Turns raw wiki markup into an ordered sequence of stemmed tokens. The
//! pipeline order is significant and fixed: markup stripping and lowercasing,
//! references truncation, URL removal, word-boundary repair, tokenization,
//! punctuation filtering and trimming, stopword filtering on the trimmed
//! words, and Porter stemming. The same input always yields the same token
//! sequence. Re-running the pipeline on its own output is not supported;
//! stemming is applied exactly once to raw text.

use super::markup::MarkupStripper;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use std::sync::OnceLock;

/// Everything from the first references heading onward is discarded
const REFERENCES_MARKER: &str = "=references=";

/// ASCII punctuation, matching the original filter set
const PUNCTUATION: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// Fixed English stopword list (NLTK), contraction forms included
const STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you",
    "you're", "you've", "you'll", "you'd", "your", "yours", "yourself",
    "yourselves", "he", "him", "his", "himself", "she", "she's", "her",
    "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this",
    "that", "that'll", "these", "those", "am", "is", "are", "was", "were",
    "be", "been", "being", "have", "has", "had", "having", "do", "does",
    "did", "doing", "a", "an", "the", "and", "but", "if", "or", "because",
    "as", "until", "while", "of", "at", "by", "for", "with", "about",
    "against", "between", "into", "through", "during", "before", "after",
    "above", "below", "to", "from", "up", "down", "in", "out", "on", "off",
    "over", "under", "again", "further", "then", "once", "here", "there",
    "when", "where", "why", "how", "all", "any", "both", "each", "few",
    "more", "most", "other", "some", "such", "no", "nor", "not", "only",
    "own", "same", "so", "than", "too", "very", "s", "t", "can", "will",
    "just", "don", "don't", "should", "should've", "now", "d", "ll", "m",
    "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't",
    "didn", "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn",
    "hasn't", "haven", "haven't", "isn", "isn't", "ma", "mightn",
    "mightn't", "mustn", "mustn't", "needn", "needn't", "shan", "shan't",
    "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won",
    "won't", "wouldn", "wouldn't",
];

static RE_URL: OnceLock<Regex> = OnceLock::new();
static STOPWORD_SET: OnceLock<HashSet<&'static str>> = OnceLock::new();

fn url_pattern() -> &'static Regex {
    // Lazy match up to and including the next whitespace character; a URL at
    // end-of-input with no trailing whitespace is left for the token filters.
    RE_URL.get_or_init(|| Regex::new(r"https?://.*?\s").unwrap())
}

fn stopwords() -> &'static HashSet<&'static str> {
    STOPWORD_SET.get_or_init(|| STOPWORDS.iter().copied().collect())
}

fn is_punctuation(c: char) -> bool {
    PUNCTUATION.contains(c)
}

/// Normalizes raw article markup into stemmed tokens
pub struct TextNormalizer {
    stripper: MarkupStripper,
    stemmer: Stemmer,
}

impl TextNormalizer {
    pub fn new() -> Self {
        Self {
            stripper: MarkupStripper::new(),
            stemmer: Stemmer::create(Algorithm::English),
        }
    }

    /// Run the full pipeline. An empty result is valid output.
    pub fn normalize(&self, raw: &str) -> Vec<String> {
        let mut text = self.stripper.strip(raw).to_lowercase();

        if let Some(pos) = text.find(REFERENCES_MARKER) {
            text.truncate(pos);
        }

        let text = url_pattern().replace_all(&text, "");
        let text = text.replace(['|', '\n'], " ");

        let mut tokens = Vec::new();
        for word in text.split_whitespace() {
            if word.chars().count() == 1 && word.chars().all(is_punctuation) {
                continue;
            }
            if word.contains('=') {
                continue;
            }
            if word.chars().all(|c| c.is_ascii_digit() || is_punctuation(c)) {
                continue;
            }
            // Stopword membership is decided on the word with edge
            // punctuation already off, so "here." matches "here".
            let trimmed = word.trim_matches(is_punctuation);
            if stopwords().contains(trimmed) {
                continue;
            }
            if trimmed.chars().count() <= 1 {
                continue;
            }
            if trimmed.chars().any(|c| c.is_ascii_digit()) {
                continue;
            }
            tokens.push(self.stemmer.stem(trimmed).into_owned());
        }

        tokens
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
