use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "jobindex")]
#[command(about = "Index and search job postings", long_about = None)]
pub struct Cli {
    /// Directory holding the lexicon, indexes and barrel files.
    #[arg(short, long, default_value = "data")]
    pub data_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ingest a batch CSV of job postings into the index.
    Ingest { csv: PathBuf },
    /// Run a query and print ranked results.
    Query { text: Vec<String> },
    /// Look up one term id's postings in the barrel store.
    Term { term_id: u32 },
    /// Re-run the inverted and barrel stages from the last delta.
    Reapply,
}
