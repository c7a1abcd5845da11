//! Text normalization: lowercasing, tokenization, filtering and
//! POS-aware lemmatization.
//!
//! Four variants of the same pipeline feed the engine:
//! - [`document_terms`]: ingest-side, with pre-filter positions;
//! - [`vocabulary_terms`]: lexicon building over the raw text columns;
//! - [`single_query_term`] / [`multi_query_terms`]: the two query modes,
//!   which differ in filtering and tagging exactly as the search paths
//!   expect.

mod lemma;
mod tokenize;

use lemma::{PosTag, lemmatize, tag_in_isolation};
use tokenize::{
    clean_vocabulary_text, is_alphabetic_token, is_index_token, is_stop_word, pre_filter_tokens,
};

/// Normalize document text into `(lemma, position)` pairs.
///
/// Positions are ordinals into the pre-filter token stream, so surviving
/// terms stay sparse where stopwords and punctuation were dropped between
/// them. Tokens are POS-tagged in isolation before lemmatization.
pub fn document_terms(text: &str) -> Vec<(String, u32)> {
    let lowered = text.to_lowercase();
    pre_filter_tokens(&lowered)
        .iter()
        .enumerate()
        .filter(|(_, token)| is_index_token(token))
        .map(|(i, token)| {
            let lemma = lemmatize(token, tag_in_isolation(token));
            (lemma, i as u32)
        })
        .collect()
}

/// Normalize raw column text for vocabulary building: aggressive cleanup
/// (digits and punctuation stripped, short words removed), purely
/// alphabetic tokens, stopwords dropped, noun-default lemmas.
pub fn vocabulary_terms(text: &str) -> Vec<String> {
    clean_vocabulary_text(text)
        .split_whitespace()
        .filter(|token| !is_stop_word(token))
        .map(|token| lemmatize(token, PosTag::Noun))
        .collect()
}

/// Normalize a single-word query: the first alphabetic token longer than
/// two characters, POS-tagged and lemmatized. Stopwords are not filtered
/// in this mode; positions are discarded.
pub fn single_query_term(text: &str) -> Option<String> {
    let lowered = text.to_lowercase();
    pre_filter_tokens(&lowered)
        .iter()
        .find(|token| is_alphabetic_token(token))
        .map(|token| lemmatize(token, tag_in_isolation(token)))
}

/// Normalize a multi-word query: stopword- and length-filtered tokens with
/// noun-default lemmas.
pub fn multi_query_terms(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    pre_filter_tokens(&lowered)
        .iter()
        .filter(|token| is_index_token(token))
        .map(|token| lemmatize(token, PosTag::Noun))
        .collect()
}
