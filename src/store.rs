//! The `Store`: one value owning the data directory and sequencing the
//! ingest and query pipelines over it.
//!
//! Every path the engine touches derives from the data directory, so
//! components receive explicit paths instead of reaching for ambient
//! global state. Ingest stages run strictly in order and any failure
//! skips the rest; queries open files per call and tolerate a store that
//! is mid-batch (per-barrel-file atomicity is all the write side
//! guarantees).

use crate::error::{EngineError, Result};
use crate::index::{BarrelStore, forward, inverted};
use crate::lexicon::Lexicon;
use crate::metadata::{self, MetadataTable};
use crate::search::{self, FilteredResults, QueryConfig, ResolvedQuery};
use crate::text::vocabulary_terms;
use crate::types::{Posting, RankedHit, TermId};
use anyhow::Context;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Write a file atomically: write to a sibling temp file, then rename.
/// Readers never observe a partially written artifact. Temp names carry a
/// process-unique counter so concurrent writers of the same path (two
/// parallel queries refreshing the results file) cannot steal each
/// other's rename.
pub(crate) async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);
    let serial = TMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let tmp = path.with_extension(format!("tmp.{}.{serial}", std::process::id()));

    tokio::fs::write(&tmp, bytes)
        .await
        .with_context(|| format!("writing {}", tmp.display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("renaming {} into place", tmp.display()))
}

/// What happened during one ingest batch.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub documents: usize,
    pub new_words: usize,
    pub distinct_terms: usize,
}

/// Outcome of a query: ranked hits, or a structured no-results response.
/// Resolution misses (empty query, unknown word) land here instead of
/// surfacing as errors.
#[derive(Debug)]
pub enum QueryOutcome {
    Hits {
        resolved: ResolvedQuery,
        hits: Vec<RankedHit>,
    },
    NoResults {
        reason: String,
    },
}

impl QueryOutcome {
    pub fn hits(&self) -> &[RankedHit] {
        match self {
            Self::Hits { hits, .. } => hits,
            Self::NoResults { .. } => &[],
        }
    }
}

/// Handle on a data directory holding every persistent artifact of the
/// engine.
#[derive(Debug, Clone)]
pub struct Store {
    data_dir: PathBuf,
    config: QueryConfig,
}

impl Store {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self::with_config(data_dir, QueryConfig::default())
    }

    pub fn with_config(data_dir: impl Into<PathBuf>, config: QueryConfig) -> Self {
        Self {
            data_dir: data_dir.into(),
            config,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn lexicon_path(&self) -> PathBuf {
        self.data_dir.join("lexicon.csv")
    }

    pub fn forward_index_path(&self) -> PathBuf {
        self.data_dir.join("forward_index.json")
    }

    pub fn delta_index_path(&self) -> PathBuf {
        self.data_dir.join("new_forward_index.json")
    }

    pub fn inverted_index_path(&self) -> PathBuf {
        self.data_dir.join("inverted_delta.json")
    }

    pub fn filtered_results_path(&self) -> PathBuf {
        self.data_dir.join("filtered_results.json")
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.data_dir.join("postings.csv")
    }

    pub fn barrels(&self) -> BarrelStore {
        BarrelStore::new(self.data_dir.join("barrels"))
    }

    /// Run the ingest pipeline over one batch CSV:
    /// vocabulary → lexicon update → forward index (combined + delta) →
    /// metadata append → inverted delta → barrel merge.
    pub async fn ingest(&self, batch_csv: &Path) -> Result<IngestReport> {
        let started = Instant::now();
        tokio::fs::create_dir_all(&self.data_dir)
            .await
            .with_context(|| format!("creating data directory {}", self.data_dir.display()))?;

        let rows = metadata::read_batch(batch_csv).await?;
        tracing::info!(rows = rows.len(), batch = %batch_csv.display(), "Ingesting batch");

        let mut lexicon = Lexicon::load(&self.lexicon_path()).await?;
        // Column-major over the five text columns, matching the order in
        // which vocabulary has always been counted.
        let vocabulary: Vec<String> = (0..5)
            .flat_map(|column| {
                rows.iter()
                    .flat_map(move |row| vocabulary_terms(row.vocabulary_columns()[column]))
            })
            .collect();
        let new_words = lexicon.register_vocabulary(vocabulary);
        lexicon.save(&self.lexicon_path()).await?;
        tracing::info!(new_words, total = lexicon.len(), "Lexicon updated");

        let existing = forward::load(&self.forward_index_path()).await?;
        let batch = forward::index_documents(&rows, &lexicon, existing);
        forward::save(&self.forward_index_path(), &batch.combined).await?;
        forward::save(&self.delta_index_path(), &batch.delta).await?;

        metadata::append_batch(&self.metadata_path(), &rows).await?;

        let delta_inverted = inverted::invert(&batch.delta);
        inverted::save(&self.inverted_index_path(), &delta_inverted).await?;
        self.barrels().update(&delta_inverted).await?;

        tracing::info!(elapsed = ?started.elapsed(), "Ingest complete");
        Ok(IngestReport {
            documents: batch.delta.len(),
            new_words,
            distinct_terms: delta_inverted.len(),
        })
    }

    /// Resolve and execute a query, returning ranked hits joined with
    /// metadata. Also writes the filtered-results file for external
    /// consumers before ranking.
    pub async fn query(&self, text: &str) -> Result<QueryOutcome> {
        let lexicon = Lexicon::load(&self.lexicon_path()).await?;
        let resolved = match search::resolve(text, &lexicon, &self.config) {
            Ok(resolved) => resolved,
            Err(e) => {
                tracing::info!(query = %text, error = %e, "Query did not resolve");
                return Ok(QueryOutcome::NoResults {
                    reason: EngineError::from(e).user_message(),
                });
            }
        };

        let barrels = self.barrels();
        let Some(results) = search::fetch_results(&resolved, &barrels).await? else {
            return Ok(QueryOutcome::NoResults {
                reason: format!("No results found for query '{text}'"),
            });
        };

        self.write_filtered_results(&results).await?;
        if results.is_empty() {
            return Ok(QueryOutcome::NoResults {
                reason: format!("No documents contain every term of '{text}'"),
            });
        }

        let metadata = MetadataTable::load(&self.metadata_path()).await?;
        let hits = search::rank(&results, &metadata);
        Ok(QueryOutcome::Hits { resolved, hits })
    }

    /// Point lookup of one term's postings in the barrel store.
    pub async fn term_postings(&self, term_id: TermId) -> Result<Option<Vec<Posting>>> {
        self.barrels().lookup(term_id).await
    }

    /// Recovery path: re-run the inverted and barrel stages from the delta
    /// forward index on disk. Safe after a cancelled or failed ingest:
    /// the merge never duplicates postings or positions.
    pub async fn reapply(&self) -> Result<IngestReport> {
        let delta = forward::load(&self.delta_index_path()).await?;
        if delta.is_empty() {
            tracing::warn!("No delta forward index to reapply");
            return Ok(IngestReport {
                documents: 0,
                new_words: 0,
                distinct_terms: 0,
            });
        }

        let delta_inverted = inverted::invert(&delta);
        inverted::save(&self.inverted_index_path(), &delta_inverted).await?;
        self.barrels().update(&delta_inverted).await?;
        tracing::info!(
            documents = delta.len(),
            terms = delta_inverted.len(),
            "Reapplied delta to barrel store"
        );
        Ok(IngestReport {
            documents: delta.len(),
            new_words: 0,
            distinct_terms: delta_inverted.len(),
        })
    }

    async fn write_filtered_results(&self, results: &FilteredResults) -> Result<()> {
        let bytes = serde_json::to_vec(results).context("serializing filtered results")?;
        write_atomic(&self.filtered_results_path(), &bytes).await
    }
}
