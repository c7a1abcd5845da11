//! Tokenization into the pre-filter stream and the token filters applied
//! on top of it.
//!
//! Positions elsewhere in the engine are ordinals into the *pre-filter*
//! stream produced here: every word-like unit and every punctuation run
//! occupies one slot, whether or not it survives filtering. Keeping dropped
//! tokens in the count preserves locality between surviving terms across
//! removed stopwords.

use ahash::AHashSet;
use std::sync::LazyLock;

/// Standard English stopword list (the NLTK set).
///
/// High-frequency words that add nothing to relevance and pollute fuzzy
/// matching. Contracted forms are listed for completeness even though the
/// tokenizer splits them apart before the filter runs.
pub(crate) const STOP_WORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn",
    "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn",
    "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan", "shan't",
    "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't", "wouldn",
    "wouldn't",
];

static STOP_WORD_SET: LazyLock<AHashSet<&'static str>> =
    LazyLock::new(|| STOP_WORDS.iter().copied().collect());

/// Check whether a token is an English stopword.
#[inline]
pub(crate) fn is_stop_word(token: &str) -> bool {
    STOP_WORD_SET.contains(token)
}

/// Minimum surviving token length: tokens of one or two characters are
/// always dropped by the filters.
pub(crate) const MIN_TOKEN_LENGTH: usize = 3;

/// Split text into the pre-filter token stream.
///
/// The caller lowercases first. One scan produces:
/// - a token per maximal run of alphanumeric characters;
/// - a token per maximal run of other non-whitespace characters (so
///   punctuation occupies ordinals but never survives the filters);
/// - nothing for whitespace.
///
/// An apostrophe therefore ends the current word token and the suffix after
/// it starts a new one, consistent with standard word tokenizers splitting
/// contractions.
pub(crate) fn pre_filter_tokens(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut word = String::new();
    let mut other = String::new();

    for c in text.chars() {
        if c.is_alphanumeric() {
            if !other.is_empty() {
                tokens.push(std::mem::take(&mut other));
            }
            word.push(c);
        } else if c.is_whitespace() {
            if !word.is_empty() {
                tokens.push(std::mem::take(&mut word));
            }
            if !other.is_empty() {
                tokens.push(std::mem::take(&mut other));
            }
        } else {
            if !word.is_empty() {
                tokens.push(std::mem::take(&mut word));
            }
            other.push(c);
        }
    }
    if !word.is_empty() {
        tokens.push(word);
    }
    if !other.is_empty() {
        tokens.push(other);
    }

    tokens
}

/// Filter for document indexing: alphanumeric, longer than two characters,
/// not a stopword.
pub(crate) fn is_index_token(token: &str) -> bool {
    token.chars().count() >= MIN_TOKEN_LENGTH
        && token.chars().all(char::is_alphanumeric)
        && !is_stop_word(token)
}

/// Filter for vocabulary building and single-word queries: purely
/// alphabetic and longer than two characters.
pub(crate) fn is_alphabetic_token(token: &str) -> bool {
    token.chars().count() >= MIN_TOKEN_LENGTH && token.chars().all(char::is_alphabetic)
}

/// Vocabulary-phase text cleanup: punctuation and digit runs become
/// spaces, one- and two-letter words are removed, whitespace collapses.
pub(crate) fn clean_vocabulary_text(text: &str) -> String {
    let mut spaced = String::with_capacity(text.len());
    for c in text.to_lowercase().chars() {
        if c.is_alphabetic() {
            spaced.push(c);
        } else {
            spaced.push(' ');
        }
    }

    spaced
        .split_whitespace()
        .filter(|w| w.chars().count() >= MIN_TOKEN_LENGTH)
        .collect::<Vec<_>>()
        .join(" ")
}
