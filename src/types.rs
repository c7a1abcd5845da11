//! Domain value types shared across the indexing and query pipelines.
//!
//! Everything that ends up on disk lives here as a typed record; JSON is a
//! boundary concern handled by serde. The on-disk shapes are kept
//! bit-for-bit compatible with the historical layout: postings carry their
//! document id under the `docID` key as a decimal string, and all persisted
//! maps use ordered keys so that serializing equal state twice produces
//! identical bytes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifier of an ingested document. Assigned monotonically per row,
/// never reused.
pub type DocId = u64;

/// Identifier of a lexicon word. Assigned monotonically on first sight,
/// never reassigned.
pub type TermId = u32;

/// Per-term occurrence data inside a single document: how often the term
/// appears and at which pre-filter token ordinals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermOccurrence {
    pub frequency: u32,
    pub positions: Vec<u32>,
}

impl TermOccurrence {
    /// Build an occurrence from a position list; the frequency is the
    /// position count.
    pub fn from_positions(positions: Vec<u32>) -> Self {
        Self {
            frequency: positions.len() as u32,
            positions,
        }
    }
}

/// One document's entry in a term's posting list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    #[serde(rename = "docID", with = "doc_id_repr")]
    pub doc_id: DocId,
    pub frequency: u32,
    pub positions: Vec<u32>,
}

impl Posting {
    pub fn new(doc_id: DocId, occurrence: &TermOccurrence) -> Self {
        Self {
            doc_id,
            frequency: occurrence.frequency,
            positions: occurrence.positions.clone(),
        }
    }

    /// Merge another posting for the same document into this one:
    /// frequencies add, positions become the sorted deduplicated union.
    ///
    /// Re-applying the same posting never duplicates positions, so a
    /// replayed batch leaves the position list untouched.
    pub fn absorb(&mut self, incoming: &Posting) {
        debug_assert_eq!(self.doc_id, incoming.doc_id);
        self.frequency += incoming.frequency;
        self.positions.extend_from_slice(&incoming.positions);
        self.positions.sort_unstable();
        self.positions.dedup();
    }
}

/// Forward index: per-document map from term id to occurrence data.
pub type ForwardMap = BTreeMap<DocId, BTreeMap<TermId, TermOccurrence>>;

/// Inverted index: per-term posting lists.
pub type InvertedMap = BTreeMap<TermId, Vec<Posting>>;

/// A scored query hit joined with display metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedHit {
    pub doc_id: DocId,
    pub score: f64,
    pub title: String,
    pub url: String,
}

/// Historical quirk: posting document ids are stored as decimal strings
/// (they originate from JSON object keys). Serialization preserves that;
/// deserialization also tolerates plain integers.
mod doc_id_repr {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub(super) fn serialize<S: Serializer>(id: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&id.to_string())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Number(u64),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Text(s) => s
                .parse()
                .map_err(|_| D::Error::custom(format!("invalid document id '{s}'"))),
            Repr::Number(n) => Ok(n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    #[test]
    fn posting_serializes_doc_id_as_string() {
        let posting = Posting {
            doc_id: 7,
            frequency: 2,
            positions: vec![0, 4],
        };
        let json = serde_json::to_value(&posting).unwrap();
        check!(json["docID"] == serde_json::json!("7"));
        check!(json["frequency"] == serde_json::json!(2));
    }

    #[test]
    fn posting_deserializes_integer_doc_id() {
        let posting: Posting =
            serde_json::from_str(r#"{"docID": 3, "frequency": 1, "positions": [5]}"#).unwrap();
        check!(posting.doc_id == 3);
    }

    #[test]
    fn absorb_unions_positions_and_adds_frequency() {
        let mut existing = Posting {
            doc_id: 0,
            frequency: 2,
            positions: vec![0, 2],
        };
        let incoming = Posting {
            doc_id: 0,
            frequency: 2,
            positions: vec![0, 2],
        };
        existing.absorb(&incoming);
        check!(existing.frequency == 4);
        check!(existing.positions == vec![0, 2]);
    }

    #[test]
    fn occurrence_frequency_tracks_position_count() {
        let occ = TermOccurrence::from_positions(vec![1, 5, 9]);
        check!(occ.frequency == 3);
    }
}
