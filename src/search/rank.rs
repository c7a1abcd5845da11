//! Ranking: consolidate fetched postings per document, score, and join
//! with display metadata.

use crate::metadata::MetadataTable;
use crate::search::FilteredResults;
use crate::types::{DocId, RankedHit};

/// One document's combined occurrence data across all query terms.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ConsolidatedDoc {
    doc_id: DocId,
    frequency: u32,
    positions: Vec<u32>,
}

/// Collapse filtered results into one entry per document.
///
/// Multi-word entries sum frequencies across terms and take the sorted
/// union of positions; single-word postings pass through unchanged.
fn consolidate(results: &FilteredResults) -> Vec<ConsolidatedDoc> {
    match results {
        FilteredResults::Single(postings) => postings
            .iter()
            .map(|p| ConsolidatedDoc {
                doc_id: p.doc_id,
                frequency: p.frequency,
                positions: p.positions.clone(),
            })
            .collect(),
        FilteredResults::Multi(by_doc) => by_doc
            .iter()
            .map(|(doc_id, terms)| {
                let frequency = terms.values().map(|t| t.frequency).sum();
                let mut positions: Vec<u32> = terms
                    .values()
                    .flat_map(|t| t.positions.iter().copied())
                    .collect();
                positions.sort_unstable();
                positions.dedup();
                ConsolidatedDoc {
                    doc_id: *doc_id,
                    frequency,
                    positions,
                }
            })
            .collect(),
    }
}

/// Relevance score: `0.7 * frequency + 0.3 * (1 / mean_position)`.
///
/// Without positions there is no locality signal and the reciprocal term
/// is 0. A mean position of exactly 0 (a single occurrence at the very
/// first token) gets the same treatment rather than a division by zero.
fn score(frequency: u32, positions: &[u32]) -> f64 {
    let base = 0.7 * f64::from(frequency);
    if positions.is_empty() {
        return base;
    }
    let mean = positions.iter().map(|p| f64::from(*p)).sum::<f64>() / positions.len() as f64;
    if mean > 0.0 {
        base + 0.3 * (1.0 / mean)
    } else {
        base
    }
}

/// Rank filtered results against the metadata table.
///
/// Returns the full list sorted by descending score, ties broken by
/// ascending document id; each hit carries the document's title and
/// posting URL, `"N/A"` when the id is beyond the table. An empty
/// metadata table means there is nothing to display, so the result list
/// is empty.
pub fn rank(results: &FilteredResults, metadata: &MetadataTable) -> Vec<RankedHit> {
    if metadata.is_empty() {
        tracing::warn!("No metadata available for ranking");
        return Vec::new();
    }

    let mut scored: Vec<(DocId, f64)> = consolidate(results)
        .into_iter()
        .map(|doc| (doc.doc_id, score(doc.frequency, &doc.positions)))
        .collect();
    scored.sort_by(|(doc_a, score_a), (doc_b, score_b)| {
        score_b.total_cmp(score_a).then(doc_a.cmp(doc_b))
    });

    scored
        .into_iter()
        .map(|(doc_id, score)| {
            let (title, url) = metadata.get(doc_id).unwrap_or(("N/A", "N/A"));
            RankedHit {
                doc_id,
                score,
                title: title.to_string(),
                url: url.to_string(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Posting, TermOccurrence};
    use assert2::check;
    use rstest::rstest;
    use std::collections::BTreeMap;

    #[rstest]
    #[case(1, &[1], 1.0)] // 0.7 + 0.3/1
    #[case(3, &[0, 2, 3], 2.28)] // 0.7*3 + 0.3/(5/3)
    #[case(2, &[], 1.4)] // no positions: reciprocal term is 0
    #[case(1, &[0], 0.7)] // mean position 0: guarded
    fn scoring(#[case] frequency: u32, #[case] positions: &[u32], #[case] expected: f64) {
        check!((score(frequency, positions) - expected).abs() < 1e-9);
    }

    async fn metadata_with_one_row() -> MetadataTable {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("postings.csv");
        tokio::fs::write(
            &path,
            "title,description,company_name,location,skills_desc,job_posting_url\n\
             Java Engineer,java analytics,,,,https://jobs.example/0\n",
        )
        .await
        .unwrap();
        MetadataTable::load(&path).await.unwrap()
    }

    #[tokio::test]
    async fn single_results_rank_with_metadata_join() {
        let results = FilteredResults::Single(vec![Posting {
            doc_id: 0,
            frequency: 1,
            positions: vec![1],
        }]);
        let hits = rank(&results, &metadata_with_one_row().await);
        check!(hits.len() == 1);
        check!(hits[0].title == "Java Engineer");
        check!((hits[0].score - 1.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn out_of_range_documents_join_as_na() {
        let results = FilteredResults::Single(vec![Posting {
            doc_id: 42,
            frequency: 1,
            positions: vec![1],
        }]);
        let hits = rank(&results, &metadata_with_one_row().await);
        check!(hits[0].title == "N/A");
        check!(hits[0].url == "N/A");
    }

    #[test]
    fn empty_metadata_means_no_hits() {
        let results = FilteredResults::Single(vec![Posting {
            doc_id: 0,
            frequency: 1,
            positions: vec![1],
        }]);
        check!(rank(&results, &MetadataTable::default()).is_empty());
    }

    #[test]
    fn multi_results_sum_frequencies_and_union_positions() {
        let mut by_doc = BTreeMap::new();
        by_doc.insert(
            0,
            [
                (
                    "java".to_string(),
                    TermOccurrence::from_positions(vec![0, 2]),
                ),
                (
                    "analytics".to_string(),
                    TermOccurrence::from_positions(vec![3]),
                ),
            ]
            .into_iter()
            .collect(),
        );
        let docs = consolidate(&FilteredResults::Multi(by_doc));
        check!(docs.len() == 1);
        check!(docs[0].frequency == 3);
        check!(docs[0].positions == vec![0, 2, 3]);
    }

    #[tokio::test]
    async fn ties_break_by_ascending_doc_id() {
        let results = FilteredResults::Single(vec![
            Posting {
                doc_id: 5,
                frequency: 1,
                positions: vec![2],
            },
            Posting {
                doc_id: 1,
                frequency: 1,
                positions: vec![2],
            },
        ]);
        let hits = rank(&results, &metadata_with_one_row().await);
        let ids: Vec<_> = hits.iter().map(|h| h.doc_id).collect();
        check!(ids == vec![1, 5]);
    }

    #[tokio::test]
    async fn higher_scores_rank_first() {
        let results = FilteredResults::Single(vec![
            Posting {
                doc_id: 0,
                frequency: 1,
                positions: vec![4],
            },
            Posting {
                doc_id: 1,
                frequency: 3,
                positions: vec![1],
            },
        ]);
        let hits = rank(&results, &metadata_with_one_row().await);
        check!(hits[0].doc_id == 1);
    }
}
