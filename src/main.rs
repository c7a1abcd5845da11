use clap::Parser;
use jobindex::cli::{Cli, Commands};
use jobindex::error::Result;
use jobindex::store::{QueryOutcome, Store};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() {
    let default_level = if cfg!(debug_assertions) {
        "jobindex=trace,warn"
    } else {
        "jobindex=info,warn"
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let store = Store::new(&cli.data_dir);

    match cli.command {
        Commands::Ingest { csv } => {
            let report = store.ingest(&csv).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Query { text } => {
            let text = text.join(" ");
            match store.query(&text).await? {
                QueryOutcome::Hits { hits, .. } => {
                    let response = serde_json::json!({
                        "query": text,
                        "ranked_results": hits,
                    });
                    println!("{}", serde_json::to_string_pretty(&response)?);
                }
                QueryOutcome::NoResults { reason } => {
                    let response = serde_json::json!({
                        "query": text,
                        "message": reason,
                    });
                    println!("{}", serde_json::to_string_pretty(&response)?);
                }
            }
        }
        Commands::Term { term_id } => match store.term_postings(term_id).await? {
            Some(postings) => println!("{}", serde_json::to_string_pretty(&postings)?),
            None => println!("Term {term_id} not found in the barrel store"),
        },
        Commands::Reapply => {
            let report = store.reapply().await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}
