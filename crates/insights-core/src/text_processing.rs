//! Tokenization, stop-word removal and stemming for free-text labels.
//!
//! Nothing here is process-global: callers build a [`TextNormalizer`] and pass
//! it to whatever needs one.  [`TextNormalizer::shared_english`] is a lazily
//! built convenience instance for callers that do not customise anything.

use std::collections::HashSet;
use std::sync::OnceLock;

use rust_stemmers::{Algorithm, Stemmer};

/// English stop words (the classic NLTK list).
pub const ENGLISH_STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your", "yours",
    "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself",
    "it", "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
    "who", "whom", "this", "that", "these", "those", "am", "is", "are", "was", "were", "be",
    "been", "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an",
    "the", "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by",
    "for", "with", "about", "against", "between", "into", "through", "during", "before",
    "after", "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over",
    "under", "again", "further", "then", "once", "here", "there", "when", "where", "why",
    "how", "all", "any", "both", "each", "few", "more", "most", "other", "some", "such", "no",
    "nor", "not", "only", "own", "same", "so", "than", "too", "very", "s", "t", "can", "will",
    "just", "don", "should", "now", "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren",
    "couldn", "didn", "doesn", "hadn", "hasn", "haven", "isn", "ma", "mightn", "mustn",
    "needn", "shan", "shouldn", "wasn", "weren", "won", "wouldn",
];

/// Tokens shorter than this are dropped.
const MIN_TOKEN_CHARS: usize = 2;

/// Stop-word filter plus stemmer.
pub struct TextNormalizer {
    stopwords: HashSet<String>,
    stemmer: Stemmer,
}

impl TextNormalizer {
    /// Build a normalizer from an explicit stop-word list and stemming algorithm.
    pub fn new<I, S>(stopwords: I, algorithm: Algorithm) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            stopwords: stopwords
                .into_iter()
                .map(|w| w.into().to_lowercase())
                .collect(),
            stemmer: Stemmer::create(algorithm),
        }
    }

    /// English stop words with the Porter2 English stemmer.
    pub fn english() -> Self {
        Self::new(ENGLISH_STOPWORDS.iter().copied(), Algorithm::English)
    }

    /// A process-wide English instance, built on first use.
    pub fn shared_english() -> &'static TextNormalizer {
        static SHARED: OnceLock<TextNormalizer> = OnceLock::new();
        SHARED.get_or_init(TextNormalizer::english)
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(&word.to_lowercase())
    }

    pub fn stem(&self, word: &str) -> String {
        self.stemmer.stem(&word.to_lowercase()).into_owned()
    }

    /// Split `text` on non-alphanumeric characters, lowercase, drop stop words
    /// and very short tokens, then stem what remains.
    pub fn tokens(&self, text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|t| t.chars().count() >= MIN_TOKEN_CHARS)
            .map(str::to_lowercase)
            .filter(|t| !self.stopwords.contains(t))
            .map(|t| self.stemmer.stem(&t).into_owned())
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
