//! Forward index construction: per-document term occurrences.
//!
//! Each ingest batch produces two artifacts written atomically: the
//! combined forward index (everything ever ingested) and the delta
//! (this batch only). Downstream stages consume the delta so the corpus is
//! never reprocessed.

use crate::error::Result;
use crate::lexicon::Lexicon;
use crate::metadata::JobRecord;
use crate::store::write_atomic;
use crate::text::document_terms;
use crate::types::{DocId, ForwardMap, TermId, TermOccurrence};
use anyhow::Context;
use std::collections::BTreeMap;
use std::path::Path;

/// Result of indexing one batch: the merged view and the batch-only view.
#[derive(Debug)]
pub struct ForwardBatch {
    pub combined: ForwardMap,
    pub delta: ForwardMap,
}

/// The next document id given the existing combined index: one past the
/// maximum, or 0 for an empty index. Ids are never reused.
pub fn next_doc_id(existing: &ForwardMap) -> DocId {
    existing.keys().next_back().map_or(0, |max| max + 1)
}

/// Index a batch of rows against the current lexicon, assigning document
/// ids in row order starting after the existing index.
///
/// Only lemmas present in the lexicon contribute occurrences; everything
/// else in `title + " " + description` is dropped silently.
pub fn index_documents(
    rows: &[JobRecord],
    lexicon: &Lexicon,
    existing: ForwardMap,
) -> ForwardBatch {
    let mut combined = existing;
    let mut delta = ForwardMap::new();
    let mut doc_id = next_doc_id(&combined);

    for row in rows {
        let text = format!("{} {}", row.title, row.description);
        let mut positions_by_term: BTreeMap<TermId, Vec<u32>> = BTreeMap::new();
        for (lemma, position) in document_terms(&text) {
            if let Some(term_id) = lexicon.get(&lemma) {
                positions_by_term.entry(term_id).or_default().push(position);
            }
        }

        let record: BTreeMap<TermId, TermOccurrence> = positions_by_term
            .into_iter()
            .map(|(term_id, positions)| (term_id, TermOccurrence::from_positions(positions)))
            .collect();

        combined.insert(doc_id, record.clone());
        delta.insert(doc_id, record);
        doc_id += 1;
    }

    tracing::info!(
        documents = delta.len(),
        total = combined.len(),
        "Indexed forward batch"
    );
    ForwardBatch { combined, delta }
}

/// Load a forward index JSON file. An absent file is an empty index.
pub async fn load(path: &Path) -> Result<ForwardMap> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "No forward index, starting empty");
            return Ok(ForwardMap::new());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("reading forward index {}", path.display()));
        }
    };

    serde_json::from_slice(&bytes)
        .with_context(|| format!("parsing forward index {}", path.display()))
}

/// Persist a forward index atomically.
pub async fn save(path: &Path, index: &ForwardMap) -> Result<()> {
    let bytes = serde_json::to_vec(index).context("serializing forward index")?;
    write_atomic(path, &bytes).await
}
