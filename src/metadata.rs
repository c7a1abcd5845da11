//! The job-posting CSV: batch input at ingest time, display metadata at
//! query time.
//!
//! Document ids are row indexes into this file, so ingest appends batch
//! rows in document-id order and the ranker reads titles and URLs back by
//! position. The file is append-only.

use crate::error::{Result, StoreError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// One row of the ingest CSV. Missing columns deserialize to empty
/// strings; extra columns are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobRecord {
    pub title: String,
    pub description: String,
    pub company_name: String,
    pub location: String,
    pub skills_desc: String,
    pub job_posting_url: String,
}

impl JobRecord {
    /// The five text columns consulted by the vocabulary phase, in the
    /// order they are processed.
    pub fn vocabulary_columns(&self) -> [&str; 5] {
        [
            &self.company_name,
            &self.description,
            &self.title,
            &self.location,
            &self.skills_desc,
        ]
    }
}

/// Read and parse a batch CSV. A missing file is fatal: the batch input is
/// not an artifact the engine can re-create.
pub async fn read_batch(path: &Path) -> Result<Vec<JobRecord>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(StoreError::InputMissing {
                path: path.to_path_buf(),
            }
            .into());
        }
        Err(e) => return Err(e.into()),
    };
    parse_rows(&bytes, path)
}

fn parse_rows(bytes: &[u8], path: &Path) -> Result<Vec<JobRecord>> {
    let mut reader = csv::Reader::from_reader(bytes);
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        let row: JobRecord = record.map_err(|e| StoreError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        rows.push(row);
    }
    Ok(rows)
}

/// Append a batch to the metadata CSV, writing the header only when the
/// file is new. Rows land in the same order document ids were assigned.
pub async fn append_batch(path: &Path, rows: &[JobRecord]) -> Result<()> {
    let is_new = !tokio::fs::try_exists(path).await.unwrap_or(false);

    let mut writer = csv::WriterBuilder::new()
        .has_headers(is_new)
        .from_writer(Vec::new());
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| StoreError::Parse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
    }
    let bytes = writer.into_inner().map_err(|e| StoreError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(&bytes).await?;
    file.flush().await?;
    Ok(())
}

/// Query-time view of the metadata file: title and URL per row index.
#[derive(Debug, Default)]
pub struct MetadataTable {
    rows: Vec<(String, String)>,
}

impl MetadataTable {
    /// Load the table. An absent file yields an empty table; the ranker
    /// then reports no results rather than failing.
    pub async fn load(path: &Path) -> Result<Self> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "Metadata file not found");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let headers = reader
            .headers()
            .map_err(|e| StoreError::Parse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
            .clone();
        let title_idx = headers.iter().position(|h| h == "title");
        let url_idx = headers.iter().position(|h| h == "job_posting_url");

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| StoreError::Parse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
            let field = |idx: Option<usize>| {
                idx.and_then(|i| record.get(i))
                    .unwrap_or("N/A")
                    .to_string()
            };
            rows.push((field(title_idx), field(url_idx)));
        }
        Ok(Self { rows })
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Title and URL for a document, if its row exists.
    pub fn get(&self, doc_id: u64) -> Option<(&str, &str)> {
        usize::try_from(doc_id)
            .ok()
            .and_then(|i| self.rows.get(i))
            .map(|(title, url)| (title.as_str(), url.as_str()))
    }
}
