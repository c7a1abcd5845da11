//! The barrel store: the authoritative, shard-addressable inverted index.
//!
//! A term id `t` lives in barrel `t / 100`, bucket `t % 10`. Two ids whose
//! quotient and remainder both collide (5 and 15, say) share a bucket in
//! different barrels; a bucket therefore holds at most ten distinct ids of
//! its barrel's range. The scheme is preserved exactly for storage
//! compatibility; resist the urge to widen the bucket key to `t % 100`.
//!
//! Each barrel is one JSON file `{bucket: {term_id: [posting, ...]}}`.
//! Updates rewrite whole barrel files atomically (temp + rename); a batch
//! touching several barrels is only atomic per file, and readers tolerate
//! the store being mid-batch.

use crate::error::{Result, StoreError};
use crate::store::write_atomic;
use crate::types::{InvertedMap, Posting, TermId};
use anyhow::Context;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// On-disk layout of one barrel: bucket key to term id to postings.
type BarrelFile = BTreeMap<u32, BTreeMap<TermId, Vec<Posting>>>;

/// Barrel file key for a term id.
pub fn barrel_of(term_id: TermId) -> u32 {
    term_id / 100
}

/// In-file bucket key for a term id.
pub fn bucket_of(term_id: TermId) -> u32 {
    term_id % 10
}

/// Handle on a barrel directory. Files are opened per call; the store
/// keeps no in-memory state.
#[derive(Debug, Clone)]
pub struct BarrelStore {
    dir: PathBuf,
}

impl BarrelStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn barrel_path(&self, barrel: u32) -> PathBuf {
        self.dir.join(format!("{barrel}.json"))
    }

    async fn load_barrel(&self, barrel: u32) -> Result<BarrelFile> {
        let path = self.barrel_path(barrel);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BarrelFile::new()),
            Err(e) => {
                return Err(StoreError::ShardIo {
                    barrel,
                    reason: e.to_string(),
                }
                .into());
            }
        };
        serde_json::from_slice(&bytes).map_err(|e| {
            StoreError::Parse {
                path,
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Merge an inverted delta into the store.
    ///
    /// For every posting: an existing posting with the same document id has
    /// its frequency increased and its position list replaced by the sorted
    /// deduplicated union; otherwise the posting is appended. Each affected
    /// barrel file is rewritten once, atomically.
    pub async fn update(&self, delta: &InvertedMap) -> Result<()> {
        if delta.is_empty() {
            return Ok(());
        }
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("creating barrel directory {}", self.dir.display()))?;

        // Group the delta by barrel so each file is loaded and written once.
        let mut by_barrel: BTreeMap<u32, Vec<(TermId, &Vec<Posting>)>> = BTreeMap::new();
        for (term_id, postings) in delta {
            by_barrel
                .entry(barrel_of(*term_id))
                .or_default()
                .push((*term_id, postings));
        }

        for (barrel, terms) in by_barrel {
            let mut file = self.load_barrel(barrel).await?;
            for (term_id, new_postings) in terms {
                let slot = file
                    .entry(bucket_of(term_id))
                    .or_default()
                    .entry(term_id)
                    .or_default();
                merge_postings(slot, new_postings);
            }

            let bytes = serde_json::to_vec(&file).context("serializing barrel")?;
            write_atomic(&self.barrel_path(barrel), &bytes)
                .await
                .map_err(|e| StoreError::ShardIo {
                    barrel,
                    reason: format!("{e:#}"),
                })?;
            tracing::debug!(barrel, "Updated barrel");
        }
        Ok(())
    }

    /// Point lookup of one term's postings: a single file open and two map
    /// gets. Absent barrel, bucket or term all mean "no postings".
    pub async fn lookup(&self, term_id: TermId) -> Result<Option<Vec<Posting>>> {
        let file = self.load_barrel(barrel_of(term_id)).await?;
        Ok(file
            .get(&bucket_of(term_id))
            .and_then(|bucket| bucket.get(&term_id))
            .cloned())
    }
}

/// Merge new postings into an existing list under the per-document rule.
fn merge_postings(existing: &mut Vec<Posting>, incoming: &[Posting]) {
    for new_posting in incoming {
        match existing.iter_mut().find(|p| p.doc_id == new_posting.doc_id) {
            Some(current) => current.absorb(new_posting),
            None => existing.push(new_posting.clone()),
        }
    }
}
