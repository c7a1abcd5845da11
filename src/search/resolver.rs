//! Query resolution: from raw query text to term ids and fetched postings.
//!
//! A query is single-word or multi-word by whitespace splitting, and the
//! two modes differ deliberately: single-word search POS-tags its token
//! and only accepts fuzzy matches above a similarity cutoff; multi-word
//! search filters stopwords, lemmatizes noun-default and takes the nearest
//! lexicon entry unconditionally. Both policies are configuration.

use crate::error::QueryError;
use crate::index::BarrelStore;
use crate::lexicon::{FuzzyPolicy, Lexicon};
use crate::search::FilteredResults;
use crate::text::{multi_query_terms, single_query_term};
use crate::types::{TermId, TermOccurrence};
use std::collections::BTreeMap;

/// Fuzzy-fallback configuration for the two query modes.
#[derive(Debug, Clone, Copy)]
pub struct QueryConfig {
    pub single_policy: FuzzyPolicy,
    pub multi_policy: FuzzyPolicy,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            single_policy: FuzzyPolicy::RatioCutoff(0.8),
            multi_policy: FuzzyPolicy::NearestNeighbor,
        }
    }
}

/// Whether a term resolved exactly or through fuzzy fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Exact,
    Fuzzy,
}

/// One resolved query term.
#[derive(Debug, Clone)]
pub struct ResolvedTerm {
    /// The normalized lemma from the query.
    pub surface: String,
    /// The lexicon word actually matched (differs from `surface` on fuzzy
    /// resolution).
    pub matched_form: String,
    pub term_id: TermId,
    pub resolution: Resolution,
}

/// A fully resolved query, ready for shard fetching.
#[derive(Debug, Clone)]
pub enum ResolvedQuery {
    Single(ResolvedTerm),
    Multi(Vec<ResolvedTerm>),
}

impl ResolvedQuery {
    pub fn terms(&self) -> &[ResolvedTerm] {
        match self {
            Self::Single(term) => std::slice::from_ref(term),
            Self::Multi(terms) => terms,
        }
    }
}

/// Resolve a raw query against the lexicon.
pub fn resolve(
    query: &str,
    lexicon: &Lexicon,
    config: &QueryConfig,
) -> Result<ResolvedQuery, QueryError> {
    let token_count = query.split_whitespace().count();
    match token_count {
        0 => Err(QueryError::EmptyQuery),
        1 => resolve_single(query, lexicon, config.single_policy).map(ResolvedQuery::Single),
        _ => resolve_multi(query, lexicon, config.multi_policy).map(ResolvedQuery::Multi),
    }
}

fn resolve_single(
    query: &str,
    lexicon: &Lexicon,
    policy: FuzzyPolicy,
) -> Result<ResolvedTerm, QueryError> {
    let lemma = single_query_term(query).ok_or(QueryError::EmptyQuery)?;
    resolve_term(lemma, lexicon, policy, |word| QueryError::WordNotFound {
        word,
    })
}

fn resolve_multi(
    query: &str,
    lexicon: &Lexicon,
    policy: FuzzyPolicy,
) -> Result<Vec<ResolvedTerm>, QueryError> {
    let lemmas = multi_query_terms(query);
    if lemmas.is_empty() {
        return Err(QueryError::EmptyQuery);
    }
    lemmas
        .into_iter()
        .map(|lemma| {
            resolve_term(lemma, lexicon, policy, |token| QueryError::UnknownTerm {
                token,
            })
        })
        .collect()
}

fn resolve_term(
    lemma: String,
    lexicon: &Lexicon,
    policy: FuzzyPolicy,
    miss: impl FnOnce(String) -> QueryError,
) -> Result<ResolvedTerm, QueryError> {
    if let Some(term_id) = lexicon.get(&lemma) {
        return Ok(ResolvedTerm {
            matched_form: lemma.clone(),
            surface: lemma,
            term_id,
            resolution: Resolution::Exact,
        });
    }

    match lexicon.closest(&lemma, policy) {
        Some(matched) => {
            let matched_form = matched.to_string();
            // The closest entry came out of the lexicon, so it must have an id.
            let term_id = lexicon.get(&matched_form).ok_or_else(|| miss(lemma.clone()))?;
            tracing::info!(
                surface = %lemma,
                matched = %matched_form,
                "Resolved query term by fuzzy fallback"
            );
            Ok(ResolvedTerm {
                surface: lemma,
                matched_form,
                term_id,
                resolution: Resolution::Fuzzy,
            })
        }
        None => Err(miss(lemma)),
    }
}

/// Fetch postings for a resolved query from the barrel store.
///
/// Single mode returns `None` when the term has no postings. Multi mode
/// fetches every term's shard concurrently, treats an absent shard as an
/// empty posting list, and keeps only documents covering every query term
/// (AND semantics), possibly an empty map.
pub async fn fetch_results(
    resolved: &ResolvedQuery,
    barrels: &BarrelStore,
) -> crate::error::Result<Option<FilteredResults>> {
    match resolved {
        ResolvedQuery::Single(term) => {
            let postings = barrels.lookup(term.term_id).await?;
            Ok(postings.map(FilteredResults::Single))
        }
        ResolvedQuery::Multi(terms) => {
            let lookups = terms.iter().map(|term| barrels.lookup(term.term_id));
            let fetched = futures::future::try_join_all(lookups).await?;

            let mut by_doc: BTreeMap<u64, BTreeMap<String, TermOccurrence>> = BTreeMap::new();
            for (term, postings) in terms.iter().zip(fetched) {
                for posting in postings.unwrap_or_default() {
                    by_doc.entry(posting.doc_id).or_default().insert(
                        term.surface.clone(),
                        TermOccurrence {
                            frequency: posting.frequency,
                            positions: posting.positions,
                        },
                    );
                }
            }

            let required: Vec<&str> = terms.iter().map(|t| t.surface.as_str()).collect();
            by_doc.retain(|_, found| required.iter().all(|term| found.contains_key(*term)));

            Ok(Some(FilteredResults::Multi(by_doc)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    fn seeded_lexicon() -> Lexicon {
        let mut lexicon = Lexicon::new();
        lexicon.add_or_get("java");
        lexicon.add_or_get("analytics");
        lexicon.add_or_get("engineer");
        lexicon
    }

    #[test]
    fn single_word_resolves_exactly_after_lemmatization() {
        let resolved = resolve("engineers", &seeded_lexicon(), &QueryConfig::default()).unwrap();
        let ResolvedQuery::Single(term) = resolved else {
            panic!("expected single mode");
        };
        check!(term.surface == "engineer");
        check!(term.term_id == 2);
        check!(term.resolution == Resolution::Exact);
    }

    #[test]
    fn single_word_typo_resolves_fuzzily() {
        let resolved = resolve("enginer", &seeded_lexicon(), &QueryConfig::default()).unwrap();
        let ResolvedQuery::Single(term) = resolved else {
            panic!("expected single mode");
        };
        check!(term.matched_form == "engineer");
        check!(term.resolution == Resolution::Fuzzy);
    }

    #[test]
    fn single_word_far_from_everything_is_not_found() {
        let err = resolve("zzzzzzzz", &seeded_lexicon(), &QueryConfig::default()).unwrap_err();
        check!(err == QueryError::WordNotFound { word: "zzzzzzzz".to_string() });
    }

    #[test]
    fn stopword_only_query_is_empty() {
        let err = resolve("the and", &seeded_lexicon(), &QueryConfig::default()).unwrap_err();
        check!(err == QueryError::EmptyQuery);
        check!(
            resolve("", &seeded_lexicon(), &QueryConfig::default()).unwrap_err()
                == QueryError::EmptyQuery
        );
    }

    #[test]
    fn multi_word_resolves_every_token() {
        let resolved = resolve("java analytics", &seeded_lexicon(), &QueryConfig::default())
            .unwrap();
        let ResolvedQuery::Multi(terms) = resolved else {
            panic!("expected multi mode");
        };
        check!(terms.len() == 2);
        check!(terms[0].term_id == 0);
        check!(terms[1].term_id == 1);
    }

    #[test]
    fn multi_word_always_falls_back_on_nonempty_lexicon() {
        let resolved =
            resolve("java zzzzzzzz", &seeded_lexicon(), &QueryConfig::default()).unwrap();
        let ResolvedQuery::Multi(terms) = resolved else {
            panic!("expected multi mode");
        };
        check!(terms[1].resolution == Resolution::Fuzzy);
    }

    #[test]
    fn multi_word_on_empty_lexicon_is_unknown_term() {
        let lexicon = Lexicon::new();
        let err = resolve("java analytics", &lexicon, &QueryConfig::default()).unwrap_err();
        check!(matches!(err, QueryError::UnknownTerm { .. }));
    }

    #[tokio::test]
    async fn multi_fetch_applies_and_semantics() {
        use crate::types::{InvertedMap, Posting};

        let dir = tempfile::tempdir().unwrap();
        let barrels = BarrelStore::new(dir.path().join("barrels"));
        // java (id 0) in docs 0 and 1; analytics (id 1) only in doc 0.
        let delta: InvertedMap = [
            (
                0,
                vec![
                    Posting { doc_id: 0, frequency: 2, positions: vec![0, 2] },
                    Posting { doc_id: 1, frequency: 1, positions: vec![4] },
                ],
            ),
            (
                1,
                vec![Posting { doc_id: 0, frequency: 1, positions: vec![3] }],
            ),
        ]
        .into_iter()
        .collect();
        barrels.update(&delta).await.unwrap();

        let resolved = resolve("java analytics", &seeded_lexicon(), &QueryConfig::default())
            .unwrap();
        let results = fetch_results(&resolved, &barrels).await.unwrap().unwrap();
        let FilteredResults::Multi(by_doc) = results else {
            panic!("expected multi results");
        };
        check!(by_doc.len() == 1);
        check!(by_doc.contains_key(&0));
    }

    #[tokio::test]
    async fn single_fetch_with_no_postings_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let barrels = BarrelStore::new(dir.path().join("barrels"));
        let resolved = resolve("java", &seeded_lexicon(), &QueryConfig::default()).unwrap();
        check!(fetch_results(&resolved, &barrels).await.unwrap().is_none());
    }
}
