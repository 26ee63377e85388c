//! Stage 4 (independent of the index build): computes a PageRank score for every valid document
//! from `pagelinks.csv`, and writes `pagerank_scores.csv` for the query evaluator and the
//! autocomplete trie builder to load.

use anyhow::{Context, Result};
use clap::Parser;
use core::pagerank::{load_valid_pageids, run, Graph, PageRankConfig};
use core::persist::Paths;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Computes PageRank scores from pagelinks.csv")]
struct Cli {
    #[arg(long, default_value = "doc_info.jsonl")]
    doc_info: PathBuf,

    #[arg(long, default_value = "pagelinks.csv")]
    pagelinks: PathBuf,

    #[arg(long, default_value = "pagerank_scores.csv")]
    pagerank_scores: PathBuf,

    #[arg(long, default_value_t = 0.85)]
    damping: f64,

    #[arg(long, default_value_t = 20)]
    max_iterations: usize,

    #[arg(long, default_value_t = 1e-12)]
    tolerance: f64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let paths = Paths {
        doc_info: cli.doc_info,
        pagelinks: cli.pagelinks,
        pagerank_scores: cli.pagerank_scores,
        ..Default::default()
    };

    let doc_info_file = File::open(&paths.doc_info)
        .with_context(|| format!("opening {}", paths.doc_info.display()))?;
    let valid_pageids = load_valid_pageids(BufReader::new(doc_info_file));
    tracing::info!(valid_documents = valid_pageids.len(), "loaded document set");

    let graph = Graph::build(&paths.pagelinks, &valid_pageids).context("building link graph")?;
    tracing::info!(nodes = graph.num_nodes(), "built reverse link graph");

    let config = PageRankConfig {
        damping: cli.damping,
        max_iterations: cli.max_iterations,
        tolerance: cli.tolerance,
    };
    let scores = run(&graph, &config);

    let out = File::create(&paths.pagerank_scores)
        .with_context(|| format!("creating {}", paths.pagerank_scores.display()))?;
    core::pagerank::write_scores(BufWriter::new(out), &graph, &scores)
        .context("writing pagerank scores")?;

    tracing::info!(path = %paths.pagerank_scores.display(), "pagerank complete");
    Ok(())
}
