//! Stage 3 of the index build: stream-copies every shard's `chunk_<id>.bin` into a single
//! `index.bin`, rewriting each shard's local offsets into one global `offset.txt`. `total_docs`
//! is computed by counting valid records in `doc_info.jsonl` rather than carrying a
//! corpus-snapshot-specific constant.

use anyhow::{Context, Result};
use clap::Parser;
use core::pagerank::load_valid_pageids;
use core::persist::{merge_shards, Paths};
use core::shard::NUM_SHARDS;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Merges per-shard posting chunks into index.bin and offset.txt")]
struct Cli {
    #[arg(long, default_value = "doc_info.jsonl")]
    doc_info: PathBuf,

    #[arg(long, default_value = ".")]
    shard_dir: PathBuf,

    #[arg(long, default_value = "index.bin")]
    index_bin: PathBuf,

    #[arg(long, default_value = "offset.txt")]
    offset_txt: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let paths = Paths {
        doc_info: cli.doc_info,
        shard_dir: cli.shard_dir,
        index_bin: cli.index_bin,
        offset_txt: cli.offset_txt,
        ..Default::default()
    };

    let doc_info_file = File::open(&paths.doc_info)
        .with_context(|| format!("opening {}", paths.doc_info.display()))?;
    let total_docs = load_valid_pageids(BufReader::new(doc_info_file)).len() as i32;

    tracing::info!(total_docs, "counted valid documents");

    merge_shards(&paths, NUM_SHARDS, total_docs).context("merging shard chunks")?;

    tracing::info!(index_bin = %paths.index_bin.display(), "merge complete");
    Ok(())
}
