//! Inverted index construction: term id to posting lists.
//!
//! Built from a forward-index delta and written to a single JSON file that
//! the barrel stage consumes. The file is replaced on every batch; the
//! barrel store is the authoritative persistent structure, so no combined
//! inverted index is kept.

use crate::error::Result;
use crate::store::write_atomic;
use crate::types::{ForwardMap, InvertedMap, Posting};
use anyhow::Context;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::path::Path;

/// Invert a forward index: every document's occurrence of a term becomes a
/// posting in that term's list. Posting lists are sorted by descending
/// frequency (stable, so equal frequencies keep document order) as a
/// top-k hint for consumers.
pub fn invert(forward: &ForwardMap) -> InvertedMap {
    let mut inverted = InvertedMap::new();
    for (doc_id, terms) in forward {
        for (term_id, occurrence) in terms {
            inverted
                .entry(*term_id)
                .or_default()
                .push(Posting::new(*doc_id, occurrence));
        }
    }

    for postings in inverted.values_mut() {
        postings.sort_by_key(|p| Reverse(p.frequency));
    }

    tracing::debug!(terms = inverted.len(), "Built inverted index");
    inverted
}

/// Persist the inverted delta, replacing any previous file.
pub async fn save(path: &Path, inverted: &InvertedMap) -> Result<()> {
    let bytes = serde_json::to_vec(inverted).context("serializing inverted index")?;
    write_atomic(path, &bytes).await
}

/// Load an inverted delta file.
///
/// Term ids are parsed from the JSON object keys; a non-numeric key cannot
/// be routed to any barrel, so the term is skipped with a diagnostic
/// instead of failing the batch.
pub async fn load(path: &Path) -> Result<Option<InvertedMap>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("reading inverted index {}", path.display()));
        }
    };

    let raw: BTreeMap<String, Vec<Posting>> = serde_json::from_slice(&bytes)
        .with_context(|| format!("parsing inverted index {}", path.display()))?;

    let mut inverted = InvertedMap::new();
    for (key, postings) in raw {
        match key.parse() {
            Ok(term_id) => {
                inverted.insert(term_id, postings);
            }
            Err(_) => {
                tracing::warn!(term = %key, "Skipping term with non-numeric id");
            }
        }
    }
    Ok(Some(inverted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TermOccurrence;
    use assert2::check;

    fn forward_fixture() -> ForwardMap {
        let mut forward = ForwardMap::new();
        forward.insert(
            0,
            [
                (0, TermOccurrence::from_positions(vec![0, 2])),
                (2, TermOccurrence::from_positions(vec![1])),
            ]
            .into_iter()
            .collect(),
        );
        forward.insert(
            1,
            [(0, TermOccurrence::from_positions(vec![5]))]
                .into_iter()
                .collect(),
        );
        forward
    }

    #[test]
    fn every_occurrence_becomes_a_posting() {
        let inverted = invert(&forward_fixture());
        check!(inverted[&0].len() == 2);
        check!(inverted[&2].len() == 1);
    }

    #[test]
    fn postings_sort_by_descending_frequency() {
        let inverted = invert(&forward_fixture());
        // Term 0: doc 0 has frequency 2, doc 1 frequency 1.
        check!(inverted[&0][0].doc_id == 0);
        check!(inverted[&0][1].doc_id == 1);
    }

    #[test]
    fn ties_keep_document_order() {
        let mut forward = ForwardMap::new();
        for doc_id in [3, 7, 9] {
            forward.insert(
                doc_id,
                [(4, TermOccurrence::from_positions(vec![0]))]
                    .into_iter()
                    .collect(),
            );
        }
        let inverted = invert(&forward);
        let docs: Vec<_> = inverted[&4].iter().map(|p| p.doc_id).collect();
        check!(docs == vec![3, 7, 9]);
    }

    #[test]
    fn empty_forward_inverts_to_empty() {
        check!(invert(&ForwardMap::new()).is_empty());
    }

    #[tokio::test]
    async fn round_trips_through_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inverted.json");

        let inverted = invert(&forward_fixture());
        save(&path, &inverted).await.unwrap();
        let reloaded = load(&path).await.unwrap().unwrap();
        check!(reloaded == inverted);
    }

    #[tokio::test]
    async fn non_numeric_term_ids_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inverted.json");
        tokio::fs::write(
            &path,
            r#"{"7": [{"docID": "0", "frequency": 1, "positions": [4]}], "java": []}"#,
        )
        .await
        .unwrap();

        let loaded = load(&path).await.unwrap().unwrap();
        check!(loaded.len() == 1);
        check!(loaded.contains_key(&7));
    }

    #[tokio::test]
    async fn absent_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        check!(load(&dir.path().join("absent.json")).await.unwrap() == None);
    }
}
