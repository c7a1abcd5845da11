//! Query resolution and ranking.

pub mod rank;
pub mod resolver;

pub use rank::rank;
pub use resolver::{
    QueryConfig, ResolvedQuery, ResolvedTerm, Resolution, fetch_results, resolve,
};

use crate::types::{DocId, Posting, TermOccurrence};
use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Postings fetched for a query, in the shape the ranker consumes.
///
/// Single-word queries yield the term's posting list directly; multi-word
/// queries yield per-document per-term occurrences for the documents that
/// matched every term. The serialized forms are the two historical shapes
/// of the filtered-results file (a JSON list and a JSON object), which the
/// untagged representation reproduces exactly.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilteredResults {
    Single(Vec<Posting>),
    Multi(BTreeMap<DocId, BTreeMap<String, TermOccurrence>>),
}

impl FilteredResults {
    /// True when no document matched.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(postings) => postings.is_empty(),
            Self::Multi(by_doc) => by_doc.is_empty(),
        }
    }
}

// Hand-rolled instead of `#[serde(untagged)]`: document ids arrive as JSON
// object keys (strings), and untagged buffering loses the string-to-integer
// key conversion a direct map deserialization would do.
impl<'de> Deserialize<'de> for FilteredResults {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ResultsVisitor;

        impl<'de> Visitor<'de> for ResultsVisitor {
            type Value = FilteredResults;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a posting list or a document-to-terms map")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut postings = Vec::new();
                while let Some(posting) = seq.next_element()? {
                    postings.push(posting);
                }
                Ok(FilteredResults::Single(postings))
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut by_doc = BTreeMap::new();
                while let Some(key) = map.next_key::<String>()? {
                    let doc_id: DocId = key.parse().map_err(|_| {
                        serde::de::Error::custom(format!("invalid document id '{key}'"))
                    })?;
                    by_doc.insert(doc_id, map.next_value()?);
                }
                Ok(FilteredResults::Multi(by_doc))
            }
        }

        deserializer.deserialize_any(ResultsVisitor)
    }
}
