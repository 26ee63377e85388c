//! Interactive query REPL: reads queries from stdin until EOF or a literal `exit`, and prints the
//! top 10 ranked results for each. No networked service endpoint.

use anyhow::{Context, Result};
use clap::Parser;
use core::persist::Paths;
use server::SearchContext;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Interactive BM25 + PageRank search REPL")]
struct Cli {
    #[arg(long, default_value = "doc_info.jsonl")]
    doc_info: PathBuf,

    #[arg(long, default_value = "stopwords.txt")]
    stopwords: PathBuf,

    #[arg(long, default_value = "pagerank_scores.csv")]
    pagerank_scores: PathBuf,

    #[arg(long, default_value = "offset.txt")]
    offset_txt: PathBuf,

    #[arg(long, default_value = "index.bin")]
    index_bin: PathBuf,

    #[arg(long, default_value_t = 10)]
    top_k: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let paths = Paths {
        doc_info: cli.doc_info,
        stopwords: cli.stopwords,
        pagerank_scores: cli.pagerank_scores,
        offset_txt: cli.offset_txt,
        index_bin: cli.index_bin,
        ..Default::default()
    };

    let mut ctx = SearchContext::load(&paths).context("loading search context")?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut prompt = || -> io::Result<()> {
        write!(out, "> ")?;
        out.flush()
    };

    prompt()?;
    for line in stdin.lock().lines() {
        let line = line.context("reading query from stdin")?;
        let query = line.trim();
        if query == "exit" {
            break;
        }
        if query.is_empty() {
            prompt()?;
            continue;
        }

        match ctx.search(query, cli.top_k) {
            Ok(hits) if hits.is_empty() => println!("(no results)"),
            Ok(hits) => {
                for (rank, hit) in hits.iter().enumerate() {
                    println!(
                        "{:>2}. {}  (doc_id={} score={:.4})",
                        rank + 1,
                        hit.title,
                        hit.doc_id,
                        hit.score
                    );
                }
            }
            Err(e) => tracing::error!(error = %e, "search failed"),
        }
        prompt()?;
    }
    Ok(())
}
