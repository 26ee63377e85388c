//! Query-time evaluator: blends BM25 relevance with a PageRank prior over the sharded inverted
//! index built by the `indexer` binaries. No networked entry point — callers drive
//! [`SearchContext::search`] directly, as the `search` binary's REPL does.

use anyhow::{Context, Result};
use core::bm25;
use core::jsonl::LenientJsonLines;
use core::persist::{load_offsets, read_posting_list_at, read_total_docs, Paths};
use core::types::{DocId, DocInfoRecord};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub title: String,
    pub score: f64,
}

struct DocEntry {
    title: String,
    length: i32,
}

/// Everything a query needs, loaded once and held for the lifetime of the REPL: title/length
/// table, stop words, PageRank scores, the offset directory, and a handle onto `index.bin`.
pub struct SearchContext {
    docs: HashMap<DocId, DocEntry>,
    avg_doc_length: f64,
    stopwords: std::collections::HashSet<String>,
    pagerank_scores: HashMap<DocId, f64>,
    offsets: HashMap<String, u64>,
    index_file: File,
    total_docs: i32,
}

impl SearchContext {
    pub fn load(paths: &Paths) -> Result<SearchContext> {
        let doc_info_file = File::open(&paths.doc_info)
            .with_context(|| format!("opening {}", paths.doc_info.display()))?;
        let mut records: LenientJsonLines<_, DocInfoRecord> =
            LenientJsonLines::new(BufReader::new(doc_info_file));

        let mut docs = HashMap::new();
        let mut total_length: i64 = 0;
        for record in &mut records {
            let record = record.context("reading doc_info.jsonl")?;
            total_length += record.len as i64;
            docs.insert(record.id, DocEntry { title: record.title, length: record.len });
        }
        let malformed = records.malformed_count();
        if malformed > 0 {
            tracing::warn!(malformed, "skipped malformed doc_info.jsonl lines");
        }
        let avg_doc_length = if docs.is_empty() { 1.0 } else { total_length as f64 / docs.len() as f64 };

        let stopwords = core::stopwords::load(&paths.stopwords).unwrap_or_default();

        let pagerank_file = File::open(&paths.pagerank_scores)
            .with_context(|| format!("opening {}", paths.pagerank_scores.display()))?;
        let pagerank_scores = core::pagerank::load_scores(BufReader::new(pagerank_file));

        let offset_file = File::open(&paths.offset_txt)
            .with_context(|| format!("opening {}", paths.offset_txt.display()))?;
        let offsets = load_offsets(BufReader::new(offset_file))?;

        let mut index_file = File::open(&paths.index_bin)
            .with_context(|| format!("opening {}", paths.index_bin.display()))?;
        let total_docs = read_total_docs(&mut index_file)?;

        Ok(SearchContext {
            docs,
            avg_doc_length,
            stopwords,
            pagerank_scores,
            offsets,
            index_file,
            total_docs,
        })
    }

    /// Tokenizes `query` (whitespace split, lowercase, stop-word drop, stem), scores every
    /// matching document by BM25 blended with a PageRank prior, filters out disambiguation
    /// pages, and returns the top `k` hits descending by score.
    pub fn search(&mut self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        let terms: Vec<String> = query
            .split_whitespace()
            .map(|w| w.to_lowercase())
            .filter(|w| !self.stopwords.contains(w))
            .map(|w| core::stemmer::stem(&w))
            .collect();

        let num_scored_docs = self.pagerank_scores.len().max(1);
        let mut doc_scores: HashMap<DocId, f64> = HashMap::new();

        for term in &terms {
            let Some(&offset) = self.offsets.get(term) else { continue };
            let postings = match read_posting_list_at(&mut self.index_file, offset, self.total_docs)
            {
                Ok(p) => p,
                Err(e) => {
                    tracing::warn!(term, error = %e, "skipping corrupt posting list");
                    continue;
                }
            };
            let doc_freq = postings.len() as i64;
            let idf = bm25::idf(self.total_docs as i64, doc_freq);

            for posting in &postings {
                let doc_len = self
                    .docs
                    .get(&posting.doc_id)
                    .map(|d| d.length as f64)
                    .unwrap_or_else(|| self.avg_doc_length.round());
                let raw_freq = posting.tf_score as f64 * doc_len;
                let bm25_score = bm25::score(idf, raw_freq, doc_len, self.avg_doc_length);

                let pagerank = self.pagerank_scores.get(&posting.doc_id).copied().unwrap_or(0.0);
                let pg_prior = bm25::pagerank_prior(pagerank, num_scored_docs);

                *doc_scores.entry(posting.doc_id).or_insert(0.0) +=
                    bm25_score + bm25::ALPHA * pg_prior;
            }
        }

        let mut scored: Vec<(DocId, f64)> = doc_scores.into_iter().collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let mut hits = Vec::with_capacity(k);
        for (doc_id, score) in scored {
            let title = match self.docs.get(&doc_id) {
                Some(entry) => entry.title.clone(),
                None => "Unknown Title".to_string(),
            };
            if title.to_lowercase().contains("disambiguation") {
                continue;
            }
            hits.push(SearchHit { doc_id, title, score });
            if hits.len() == k {
                break;
            }
        }
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(path: &std::path::Path, contents: &str) {
        std::fs::write(path, contents).unwrap();
    }

    #[test]
    fn scenario_e_disambiguation_pages_are_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths {
            doc_info: dir.path().join("doc_info.jsonl"),
            stopwords: dir.path().join("stopwords.txt"),
            pagerank_scores: dir.path().join("pagerank_scores.csv"),
            offset_txt: dir.path().join("offset.txt"),
            index_bin: dir.path().join("index.bin"),
            ..Default::default()
        };

        write_file(
            &paths.doc_info,
            "{\"id\":1,\"title\":\"Mercury (disambiguation)\",\"len\":50}\n{\"id\":2,\"title\":\"Mercury (planet)\",\"len\":80}\n",
        );
        write_file(&paths.stopwords, "the a of\n");
        write_file(&paths.pagerank_scores, "1,1e-4\n2,2e-4\n");

        let mut index_out = std::fs::File::create(&paths.index_bin).unwrap();
        core::persist::write_total_docs(&mut index_out, 2).unwrap();
        let postings = vec![
            core::types::Posting { doc_id: 1, tf_score: 0.05 },
            core::types::Posting { doc_id: 2, tf_score: 0.04 },
        ];
        core::persist::write_posting_list(&mut index_out, &postings).unwrap();
        index_out.flush().unwrap();
        write_file(&paths.offset_txt, "mercuri 4\n");

        let mut ctx = SearchContext::load(&paths).unwrap();
        let hits = ctx.search("mercury", 10).unwrap();

        assert!(hits.iter().all(|h| !h.title.to_lowercase().contains("disambiguation")));
        assert!(hits.iter().any(|h| h.doc_id == 2));
    }

    #[test]
    fn unknown_terms_yield_no_hits() {
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths {
            doc_info: dir.path().join("doc_info.jsonl"),
            stopwords: dir.path().join("stopwords.txt"),
            pagerank_scores: dir.path().join("pagerank_scores.csv"),
            offset_txt: dir.path().join("offset.txt"),
            index_bin: dir.path().join("index.bin"),
            ..Default::default()
        };
        write_file(&paths.doc_info, "{\"id\":1,\"title\":\"Example\",\"len\":10}\n");
        write_file(&paths.stopwords, "");
        write_file(&paths.pagerank_scores, "1,1e-5\n");
        write_file(&paths.offset_txt, "");
        let mut index_out = std::fs::File::create(&paths.index_bin).unwrap();
        core::persist::write_total_docs(&mut index_out, 1).unwrap();

        let mut ctx = SearchContext::load(&paths).unwrap();
        assert!(ctx.search("nonexistentword", 10).unwrap().is_empty());
    }
}
