//! Prefix autocomplete over document titles. `build` constructs `trie.bin` from `doc_info.jsonl`
//! and `pagerank_scores.csv`; with no subcommand it loads `trie.bin` and runs an interactive
//! prefix REPL. No networked service endpoint.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use core::jsonl::LenientJsonLines;
use core::pagerank::load_scores;
use core::persist::Paths;
use core::trie::{build_from_entries, Trie};
use core::types::DocInfoRecord;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Builds or queries the title prefix-autocomplete trie")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[arg(long, default_value = "trie.bin")]
    trie_bin: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build trie.bin from doc_info.jsonl and pagerank_scores.csv
    Build {
        #[arg(long, default_value = "doc_info.jsonl")]
        doc_info: PathBuf,

        #[arg(long, default_value = "pagerank_scores.csv")]
        pagerank_scores: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let paths = Paths { trie_bin: cli.trie_bin, ..Default::default() };

    match cli.command {
        Some(Commands::Build { doc_info, pagerank_scores }) => build(&paths, &doc_info, &pagerank_scores),
        None => serve(&paths),
    }
}

fn build(paths: &Paths, doc_info: &PathBuf, pagerank_scores: &PathBuf) -> Result<()> {
    let scores_file = File::open(pagerank_scores)
        .with_context(|| format!("opening {}", pagerank_scores.display()))?;
    let scores = load_scores(BufReader::new(scores_file));

    let doc_info_file =
        File::open(doc_info).with_context(|| format!("opening {}", doc_info.display()))?;
    let mut records: LenientJsonLines<_, DocInfoRecord> =
        LenientJsonLines::new(BufReader::new(doc_info_file));

    let mut entries = Vec::new();
    for record in &mut records {
        let record = record.context("reading doc_info.jsonl")?;
        let score = scores.get(&record.id).copied().unwrap_or(0.0);
        entries.push((record.title, score, record.id));
    }
    let malformed = records.malformed_count();
    if malformed > 0 {
        tracing::warn!(malformed, "skipped malformed doc_info.jsonl lines");
    }
    let count = entries.len();
    let trie = build_from_entries(entries);

    let out =
        File::create(&paths.trie_bin).with_context(|| format!("creating {}", paths.trie_bin.display()))?;
    trie.serialize(std::io::BufWriter::new(out)).context("writing trie.bin")?;

    tracing::info!(titles = count, nodes = trie.len(), path = %paths.trie_bin.display(), "trie built");
    Ok(())
}

fn serve(paths: &Paths) -> Result<()> {
    let file = File::open(&paths.trie_bin)
        .with_context(|| format!("opening {}", paths.trie_bin.display()))?;
    let trie = Trie::deserialize(BufReader::new(file)).context("loading trie.bin")?;
    tracing::info!(nodes = trie.len(), "trie loaded");

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut prompt = || -> io::Result<()> {
        write!(out, "> ")?;
        out.flush()
    };

    prompt()?;
    for line in stdin.lock().lines() {
        let line = line.context("reading prefix from stdin")?;
        let prefix = line.trim();
        if prefix == "exit" {
            break;
        }
        if prefix.is_empty() {
            prompt()?;
            continue;
        }

        let suggestions = trie.get_suggestions(prefix, 10);
        if suggestions.is_empty() {
            println!("(no suggestions)");
        } else {
            for s in &suggestions {
                println!("{}  (page_id={} score={:.4})", s.title, s.page_id, s.score);
            }
        }
        prompt()?;
    }
    Ok(())
}
