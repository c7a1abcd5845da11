//! The lexicon: a persistent, monotonically assigned `word → term id`
//! dictionary.
//!
//! Ids are handed out on first sight and never change or get reused, so
//! they stay valid across incremental ingests and inside every barrel file
//! ever written. On disk the lexicon is a `Word,Index` CSV; on re-open the
//! next id is `max(existing) + 1`.

use crate::error::{Result, StoreError};
use crate::store::write_atomic;
use crate::types::TermId;
use ahash::AHashMap;
use anyhow::Context;
use std::path::Path;

/// How a missed lookup falls back to the closest lexicon entry.
///
/// The two query modes historically disagree: single-word search demands a
/// similarity ratio above a cutoff, multi-word search takes the nearest
/// neighbour unconditionally. Both are kept as explicit policies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FuzzyPolicy {
    /// Accept the best match only if its normalized similarity reaches the
    /// given cutoff (0.8 for single-word queries).
    RatioCutoff(f64),
    /// Always accept the entry with the minimum edit distance.
    NearestNeighbor,
}

/// In-memory lexicon with its append-only entry list.
#[derive(Debug, Default)]
pub struct Lexicon {
    /// Entries in id-assignment order, mirroring the file layout.
    entries: Vec<(String, TermId)>,
    by_word: AHashMap<String, TermId>,
    next_id: TermId,
}

impl Lexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the lexicon from its CSV file. An absent file is an expected
    /// state (first run) and yields an empty lexicon.
    pub async fn load(path: &Path) -> Result<Self> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No lexicon file, starting empty");
                return Ok(Self::new());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("reading lexicon {}", path.display()));
            }
        };

        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let mut lexicon = Self::new();
        for record in reader.records() {
            let record = record.map_err(|e| StoreError::Parse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
            let word = record.get(0).unwrap_or_default().to_string();
            let id: TermId = record
                .get(1)
                .unwrap_or_default()
                .trim()
                .parse()
                .map_err(|_| StoreError::Parse {
                    path: path.to_path_buf(),
                    reason: format!("non-numeric index for word '{word}'"),
                })?;
            lexicon.next_id = lexicon.next_id.max(id + 1);
            lexicon.by_word.insert(word.clone(), id);
            lexicon.entries.push((word, id));
        }

        tracing::debug!(words = lexicon.entries.len(), "Loaded lexicon");
        Ok(lexicon)
    }

    /// Persist the lexicon as a `Word,Index` CSV, atomically.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(["Word", "Index"])
            .context("writing lexicon header")?;
        for (word, id) in &self.entries {
            writer
                .write_record([word.as_str(), &id.to_string()])
                .context("writing lexicon row")?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("flushing lexicon: {e}"))?;
        write_atomic(path, &bytes).await
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a word's id. Words are stored case-folded; callers pass
    /// normalized lemmas.
    pub fn get(&self, word: &str) -> Option<TermId> {
        self.by_word.get(word).copied()
    }

    /// Insert a word if unseen and return its id. Duplicate inserts are
    /// no-ops returning the existing id.
    pub fn add_or_get(&mut self, word: &str) -> TermId {
        let folded = word.to_lowercase();
        if let Some(id) = self.by_word.get(&folded) {
            return *id;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.by_word.insert(folded.clone(), id);
        self.entries.push((folded, id));
        id
    }

    /// Register a batch of vocabulary occurrences: words are counted and
    /// new ones get ids in descending corpus-frequency order (ties by
    /// first occurrence), making id assignment deterministic per batch.
    /// Returns the number of newly added words.
    pub fn register_vocabulary<I>(&mut self, words: I) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        let mut counts: AHashMap<String, u64> = AHashMap::new();
        let mut order: Vec<String> = Vec::new();
        for word in words {
            match counts.get_mut(&word) {
                Some(count) => *count += 1,
                None => {
                    counts.insert(word.clone(), 1);
                    order.push(word);
                }
            }
        }

        // Stable sort keeps first-occurrence order among equal counts.
        order.sort_by_key(|w| std::cmp::Reverse(counts[w]));

        let before = self.len();
        for word in order {
            self.add_or_get(&word);
        }
        self.len() - before
    }

    /// Find the lexically closest entry under the given policy, or `None`
    /// if the lexicon is empty or nothing clears the cutoff.
    pub fn closest(&self, word: &str, policy: FuzzyPolicy) -> Option<&str> {
        match policy {
            FuzzyPolicy::RatioCutoff(cutoff) => {
                let mut best: Option<(&str, f64)> = None;
                for (entry, _) in &self.entries {
                    let similarity = rapidfuzz::distance::indel::normalized_similarity(
                        word.chars(),
                        entry.chars(),
                    );
                    if similarity >= cutoff && best.is_none_or(|(_, s)| similarity > s) {
                        best = Some((entry, similarity));
                    }
                }
                best.map(|(entry, _)| entry)
            }
            FuzzyPolicy::NearestNeighbor => {
                let mut best: Option<(&str, usize)> = None;
                for (entry, _) in &self.entries {
                    let distance =
                        rapidfuzz::distance::levenshtein::distance(word.chars(), entry.chars());
                    if best.is_none_or(|(_, d)| distance < d) {
                        best = Some((entry, distance));
                    }
                }
                best.map(|(entry, _)| entry)
            }
        }
    }
}
