//! Centralized error handling with typed error enums.
//!
//! Errors distinguish the two recovery policies of the engine:
//! - artifacts the engine itself produces (lexicon, forward index) may be
//!   absent on first run, and callers re-create them empty rather than fail;
//! - malformed data and shard I/O failures are surfaced to the caller.
//!
//! Query-time misses (empty query, unknown word) are reported back to the
//! user as a no-results response, not as a crash.

use std::path::PathBuf;
use thiserror::Error;

/// A specialized Result type for engine operations.
///
/// This is an alias for `anyhow::Result` with context added via `.context()`
/// and `.with_context()` throughout the codebase.
pub type Result<T> = anyhow::Result<T>;

/// Primary error type for engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Persistent-store failures (missing inputs, malformed artifacts,
    /// shard I/O).
    #[error("{0}")]
    Store(#[from] StoreError),

    /// Query resolution failures.
    #[error("{0}")]
    Query(#[from] QueryError),
}

impl EngineError {
    /// Get optional help text for this error.
    pub fn help(&self) -> Option<&'static str> {
        match self {
            Self::Store(e) => e.help(),
            Self::Query(e) => e.help(),
        }
    }

    /// Get a user-friendly message with optional help text appended.
    pub fn user_message(&self) -> String {
        match self.help() {
            Some(help) => format!("{}\n\n{}", self, help),
            None => self.to_string(),
        }
    }
}

/// Errors raised by the persistent index store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A required input file is missing and is not one of the artifacts the
    /// engine can re-create empty.
    #[error("Input file not found: {path}")]
    InputMissing { path: PathBuf },

    /// A CSV or JSON artifact could not be parsed. Fatal for the batch.
    #[error("Failed to parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    /// Reading or writing a barrel file failed. Fatal for the ingest batch;
    /// barrels already written remain on disk.
    #[error("Shard I/O failure on barrel {barrel}: {reason}")]
    ShardIo { barrel: u32, reason: String },
}

impl StoreError {
    /// Get help text for this error.
    pub fn help(&self) -> Option<&'static str> {
        match self {
            Self::InputMissing { .. } => {
                Some("Check that the path exists and is readable.")
            }
            Self::Parse { .. } => Some(
                "The file is present but malformed. If it is an index artifact,\n\
                 delete it and re-run the ingest; source CSVs must be fixed upstream.",
            ),
            Self::ShardIo { .. } => Some(
                "Partial barrel updates are safe to leave in place: re-run the\n\
                 ingest from the same delta (`jobindex reapply`) to converge.",
            ),
        }
    }
}

/// Errors raised while resolving a query against the lexicon.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The query normalized to nothing (empty input, or only stopwords and
    /// short tokens).
    #[error("Empty query after normalization")]
    EmptyQuery,

    /// A single-word query missed the lexicon and no entry cleared the
    /// similarity cutoff.
    #[error("Word '{word}' (and closest matches) not found in the lexicon")]
    WordNotFound { word: String },

    /// A multi-word query token could not be resolved even by fuzzy
    /// fallback (empty lexicon).
    #[error("Term '{token}' could not be resolved against the lexicon")]
    UnknownTerm { token: String },
}

impl QueryError {
    /// Get help text for this error.
    pub fn help(&self) -> Option<&'static str> {
        match self {
            Self::EmptyQuery => Some("Provide at least one word longer than two characters."),
            Self::WordNotFound { .. } => Some(
                "Search tips:\n\
                 • Check the spelling; close matches are only accepted above\n\
                   a similarity threshold\n\
                 • Try a different form of the word; queries are lemmatized",
            ),
            Self::UnknownTerm { .. } => {
                Some("The index may be empty. Ingest a corpus first with `jobindex ingest`.")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    #[test]
    fn user_message_appends_help() {
        let err = EngineError::Query(QueryError::EmptyQuery);
        let msg = err.user_message();
        check!(msg.contains("Empty query"));
        check!(msg.contains("longer than two characters"));
    }

    #[test]
    fn word_not_found_names_the_word() {
        let err = QueryError::WordNotFound {
            word: "enginer".to_string(),
        };
        check!(err.to_string().contains("enginer"));
    }

    #[test]
    fn shard_error_mentions_recovery() {
        let err = StoreError::ShardIo {
            barrel: 4,
            reason: "disk full".to_string(),
        };
        check!(err.help().unwrap().contains("reapply"));
    }
}
