//! Shared test fixtures for integration tests.
//!
//! Each test gets an isolated data directory inside a temp dir that is
//! cleaned up on drop, plus helpers for writing batch CSVs in the ingest
//! column layout.

use jobindex::store::Store;
use rstest::fixture;
use std::path::PathBuf;
use tempfile::TempDir;

/// One batch row: title, description, posting URL.
pub type BatchRow<'a> = (&'a str, &'a str, &'a str);

/// An isolated engine store rooted in a temp directory.
pub struct TestStore {
    temp: TempDir,
    pub store: Store,
}

impl TestStore {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("create temp dir");
        let store = Store::new(temp.path().join("data"));
        Self { temp, store }
    }

    /// Write a batch CSV with the full ingest column set and return its
    /// path.
    pub fn write_batch(&self, name: &str, rows: &[BatchRow<'_>]) -> PathBuf {
        let path = self.temp.path().join(name);
        let mut writer = csv::Writer::from_path(&path).expect("create batch csv");
        writer
            .write_record([
                "title",
                "description",
                "company_name",
                "location",
                "skills_desc",
                "job_posting_url",
            ])
            .expect("write header");
        for (title, description, url) in rows {
            writer
                .write_record([title, description, "", "", "", url])
                .expect("write row");
        }
        writer.flush().expect("flush batch csv");
        path
    }
}

/// The standard two-term corpus used by most scenarios: one document with
/// `java` twice, `engineer` and `analytics` once each.
pub fn first_batch<'a>() -> Vec<BatchRow<'a>> {
    vec![("Java Engineer", "java analytics", "https://jobs.example/0")]
}

#[fixture]
pub fn test_store() -> TestStore {
    jobindex::trace::init();
    TestStore::new()
}
