//! Stage 2 of the index build: consumes one shard's `temp_<id>.txt` file, accumulates postings
//! per term in memory, and writes `chunk_<id>.bin` plus its local offset table. Runs
//! independently per shard id, so `core::shard::NUM_SHARDS` invocations can run in parallel.

use anyhow::{Context, Result};
use clap::Parser;
use core::persist::{read_shard_lines, write_shard_chunk, Paths};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Builds one shard's posting-list chunk from its partitioned term file")]
struct Cli {
    /// Shard id in [0, NUM_SHARDS)
    shard_id: usize,

    /// Directory holding temp_<id>.txt and to write chunk_<id>.bin / chunk_offsets_<id>.txt into
    #[arg(long, default_value = ".")]
    shard_dir: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let paths = Paths { shard_dir: cli.shard_dir, ..Default::default() };

    let input_path = paths.shard_input(cli.shard_id);
    let file = File::open(&input_path)
        .with_context(|| format!("opening {}", input_path.display()))?;
    let postings = read_shard_lines(BufReader::new(file));

    let term_count = postings.len();
    let posting_count: usize = postings.values().map(|v| v.len()).sum();

    write_shard_chunk(
        &postings,
        &paths.chunk_bin(cli.shard_id),
        &paths.chunk_offsets(cli.shard_id),
    )
    .context("writing shard chunk")?;

    tracing::info!(shard_id = cli.shard_id, term_count, posting_count, "shard indexed");
    Ok(())
}
