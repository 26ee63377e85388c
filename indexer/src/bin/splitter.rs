//! Stage 1 of the index build: reads `tf_data.jsonl` and partitions every `(term, doc_id, score)`
//! triple into one of `core::shard::NUM_SHARDS` append-only text files, keyed by a stable hash of
//! the term. Downstream shard indexers each own exactly one partition, so no two of them ever
//! need to see the same term.

use anyhow::{Context, Result};
use clap::Parser;
use core::jsonl::LenientJsonLines;
use core::persist::Paths;
use core::shard::{self, NUM_SHARDS};
use core::types::TfRecord;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Hash-partitions tf_data.jsonl into per-shard term files")]
struct Cli {
    /// Path to tf_data.jsonl
    #[arg(long, default_value = "tf_data.jsonl")]
    tf_data: PathBuf,

    /// Directory to write temp_<shard>.txt files into
    #[arg(long, default_value = ".")]
    shard_dir: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let paths = Paths { tf_data: cli.tf_data, shard_dir: cli.shard_dir, ..Default::default() };

    let file = File::open(&paths.tf_data)
        .with_context(|| format!("opening {}", paths.tf_data.display()))?;
    let mut records: LenientJsonLines<_, TfRecord> = LenientJsonLines::new(BufReader::new(file));

    let mut shard_writers: Vec<BufWriter<File>> = (0..NUM_SHARDS)
        .map(|i| {
            let path = paths.shard_input(i);
            File::create(&path)
                .with_context(|| format!("creating {}", path.display()))
                .map(BufWriter::new)
        })
        .collect::<Result<_>>()?;

    let mut docs_seen = 0usize;
    let mut terms_written = 0usize;
    let mut terms_dropped_short = 0usize;

    for record in &mut records {
        let record = record.context("reading tf_data.jsonl")?;
        docs_seen += 1;
        for (term, score) in &record.terms {
            if term.len() < shard::MIN_TERM_LEN {
                terms_dropped_short += 1;
                continue;
            }
            let shard_id = shard::shard_for(term);
            writeln!(shard_writers[shard_id], "{term} {} {score}", record.id)
                .context("writing shard line")?;
            terms_written += 1;
        }
    }

    for w in &mut shard_writers {
        w.flush().context("flushing shard file")?;
    }

    let malformed = records.malformed_count();
    if malformed > 0 {
        tracing::warn!(malformed, "skipped malformed tf_data.jsonl lines");
    }
    tracing::info!(docs_seen, terms_written, terms_dropped_short, "split complete");
    Ok(())
}
