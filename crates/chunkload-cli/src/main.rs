mod args;

use std::io::{BufWriter, Write};
use std::process::ExitCode;

use chunkload_store::{LoadOutcome, Store, StoreError, selectors};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use args::{Args, ArgsError};

#[derive(Debug, thiserror::Error)]
enum Error {
    #[error(transparent)]
    Args(#[from] ArgsError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to write records: {0}")]
    Output(#[from] std::io::Error),

    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    // stdout carries the records
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        // records were printed, but some partitions never loaded
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            eprintln!("chunkload: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<bool, Error> {
    let query = args.query()?;
    let store = Store::new(args.store_config())?;
    info!(
        endpoint = %store.endpoint(),
        columns = store.columns().len(),
        partitions = args.partitions.len(),
        "starting load"
    );

    let mut in_flight = store.subscribe(selectors::loading);
    let progress = tokio::spawn(async move {
        while in_flight.changed().await {
            info!(loading = in_flight.get().len(), "partitions in flight");
        }
    });

    let outcomes = store.load_all(args.partitions.iter().cloned()).await;
    for (partition, outcome) in args.partitions.iter().zip(&outcomes) {
        report(partition, outcome);
    }

    if args.retry {
        for partition in store.errored() {
            let outcome = store.retry_load(partition.as_str()).await;
            report(&partition, &outcome);
        }
    }
    progress.abort();

    let state = store.snapshot();
    info!(
        loading = state.loading().len(),
        loaded = state.loaded().len(),
        errored = state.errored().len(),
        entities = state.entity_count(),
        "store status"
    );

    let records = store.select(&query)?;
    let mut out = BufWriter::new(std::io::stdout().lock());
    for record in &records {
        serde_json::to_writer(&mut out, record)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    info!(records = records.len(), "query complete");

    Ok(state.errored().is_empty())
}

fn report(partition: &str, outcome: &LoadOutcome) {
    match outcome {
        LoadOutcome::Loaded { rows, skipped } => {
            info!(partition, rows, skipped, "partition loaded");
            if *skipped > 0 {
                warn!(partition, skipped, "rows without a key were skipped");
            }
        }
        LoadOutcome::Skipped => info!(partition, "duplicate request skipped"),
        LoadOutcome::Failed { reason } => warn!(partition, %reason, "partition errored"),
        LoadOutcome::Cancelled => warn!(partition, "partition load cancelled"),
        LoadOutcome::TimedOut => warn!(partition, "partition load timed out"),
    }
}
