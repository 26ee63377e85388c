//! Two-pass reverse link graph construction plus power-iteration PageRank, over a dense ID
//! space restricted to a valid-document set. Mirrors `examples/original_source/pageRank.cpp`.

use crate::types::DocId;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

pub const DEFAULT_DAMPING: f64 = 0.85;
pub const DEFAULT_MAX_ITERATIONS: usize = 20;
pub const DEFAULT_TOLERANCE: f64 = 1e-12;

/// Reverse link graph over a dense `[0, N)` id space. Built in two passes so `in_links` can be
/// reserved exactly by in-degree before being filled (the teacher's second pass releases the
/// `in_degree` scratch vector immediately after sizing, just as the original does).
pub struct Graph {
    pub dense_to_real: Vec<DocId>,
    pub in_links: Vec<Vec<u32>>,
    pub out_degree: Vec<u32>,
}

impl Graph {
    pub fn num_nodes(&self) -> usize {
        self.dense_to_real.len()
    }

    /// Pass 1 scans `pagelinks_path` to assign dense ids in first-seen order and count degrees;
    /// pass 2 re-opens and re-scans the same file to fill the reverse adjacency list, having
    /// sized each row by its exact in-degree first. The file is read twice rather than buffered
    /// in memory so peak memory stays bounded by the dense graph, not the raw edge list — the
    /// reason the original C++ tool makes two disk passes instead of one.
    pub fn build(pagelinks_path: &Path, valid_pageids: &HashSet<DocId>) -> anyhow::Result<Graph> {
        let mut real_to_dense: HashMap<DocId, u32> = HashMap::new();
        let mut dense_to_real: Vec<DocId> = Vec::new();
        let mut out_degree: Vec<u32> = Vec::new();
        let mut in_degree: Vec<u32> = Vec::new();

        let mut malformed = 0usize;
        for line in open_lines(pagelinks_path)? {
            let line = line?;
            let Some((u, v)) = parse_edge(&line) else {
                malformed += 1;
                continue;
            };
            if !valid_pageids.contains(&u) || !valid_pageids.contains(&v) {
                continue;
            }
            let u_dense = *real_to_dense.entry(u).or_insert_with(|| {
                let id = dense_to_real.len() as u32;
                dense_to_real.push(u);
                out_degree.push(0);
                in_degree.push(0);
                id
            });
            let v_dense = *real_to_dense.entry(v).or_insert_with(|| {
                let id = dense_to_real.len() as u32;
                dense_to_real.push(v);
                out_degree.push(0);
                in_degree.push(0);
                id
            });
            out_degree[u_dense as usize] += 1;
            in_degree[v_dense as usize] += 1;
        }
        if malformed > 0 {
            tracing::warn!(malformed, "skipped malformed pagelinks.csv lines in pass 1");
        }
        tracing::info!(nodes = dense_to_real.len(), "pagerank pass 1 complete");

        let n = dense_to_real.len();
        let mut in_links: Vec<Vec<u32>> = Vec::with_capacity(n);
        for &deg in &in_degree {
            in_links.push(Vec::with_capacity(deg as usize));
        }
        drop(in_degree);

        for line in open_lines(pagelinks_path)? {
            let line = line?;
            let Some((u, v)) = parse_edge(&line) else { continue };
            if !valid_pageids.contains(&u) || !valid_pageids.contains(&v) {
                continue;
            }
            let u_dense = real_to_dense[&u];
            let v_dense = real_to_dense[&v];
            in_links[v_dense as usize].push(u_dense);
        }
        drop(real_to_dense);
        tracing::info!("pagerank pass 2 complete");

        Ok(Graph { dense_to_real, in_links, out_degree })
    }

    /// Same two-pass algorithm as [`Graph::build`] but over an in-memory edge list, for tests
    /// and callers that already hold the CSV contents (the CLI binary uses the path-based
    /// overload against the real corpus file).
    pub fn build_from_str(edges: &str, valid_pageids: &HashSet<DocId>) -> Graph {
        let mut real_to_dense: HashMap<DocId, u32> = HashMap::new();
        let mut dense_to_real: Vec<DocId> = Vec::new();
        let mut out_degree: Vec<u32> = Vec::new();
        let mut in_degree: Vec<u32> = Vec::new();

        for line in edges.lines() {
            let Some((u, v)) = parse_edge(line) else { continue };
            if !valid_pageids.contains(&u) || !valid_pageids.contains(&v) {
                continue;
            }
            let u_dense = *real_to_dense.entry(u).or_insert_with(|| {
                let id = dense_to_real.len() as u32;
                dense_to_real.push(u);
                out_degree.push(0);
                in_degree.push(0);
                id
            });
            let v_dense = *real_to_dense.entry(v).or_insert_with(|| {
                let id = dense_to_real.len() as u32;
                dense_to_real.push(v);
                out_degree.push(0);
                in_degree.push(0);
                id
            });
            out_degree[u_dense as usize] += 1;
            in_degree[v_dense as usize] += 1;
        }

        let n = dense_to_real.len();
        let mut in_links: Vec<Vec<u32>> = Vec::with_capacity(n);
        for &deg in &in_degree {
            in_links.push(Vec::with_capacity(deg as usize));
        }

        for line in edges.lines() {
            let Some((u, v)) = parse_edge(line) else { continue };
            if !valid_pageids.contains(&u) || !valid_pageids.contains(&v) {
                continue;
            }
            let u_dense = real_to_dense[&u];
            let v_dense = real_to_dense[&v];
            in_links[v_dense as usize].push(u_dense);
        }

        Graph { dense_to_real, in_links, out_degree }
    }
}

fn open_lines(path: &Path) -> anyhow::Result<std::io::Lines<BufReader<File>>> {
    use anyhow::Context;
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    Ok(BufReader::new(file).lines())
}

fn parse_edge(line: &str) -> Option<(DocId, DocId)> {
    let (u, v) = line.split_once(',')?;
    let u = u.trim().parse::<DocId>().ok()?;
    let v = v.trim().parse::<DocId>().ok()?;
    Some((u, v))
}

/// Collects the set of valid document ids from `doc_info.jsonl`, skipping malformed lines.
pub fn load_valid_pageids<R: BufRead>(reader: R) -> HashSet<DocId> {
    let mut records = crate::jsonl::LenientJsonLines::<_, crate::types::DocInfoRecord>::new(reader);
    let mut ids = HashSet::new();
    for r in &mut records {
        if let Ok(record) = r {
            ids.insert(record.id);
        }
    }
    let malformed = records.malformed_count();
    if malformed > 0 {
        tracing::warn!(malformed, "skipped malformed doc_info.jsonl lines");
    }
    ids
}

pub struct PageRankConfig {
    pub damping: f64,
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        PageRankConfig {
            damping: DEFAULT_DAMPING,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

/// Runs power-iteration PageRank over `graph`, returning one score per dense id, summing to 1.
/// Empty graphs return an empty vector rather than erroring, per spec.md's failure semantics.
pub fn run(graph: &Graph, config: &PageRankConfig) -> Vec<f64> {
    let n = graph.num_nodes();
    if n == 0 {
        return Vec::new();
    }

    let mut scores = vec![1.0 / n as f64; n];
    let mut new_scores = vec![0.0; n];

    for iteration in 0..config.max_iterations {
        let sink_mass: f64 =
            (0..n).filter(|&j| graph.out_degree[j] == 0).map(|j| scores[j]).sum();
        let teleport = (1.0 - config.damping) / n as f64;
        let sink_contrib = config.damping * sink_mass / n as f64;

        let mut diff = 0.0f64;
        for i in 0..n {
            let mut sum = 0.0f64;
            for &j in &graph.in_links[i] {
                let od = graph.out_degree[j as usize];
                if od > 0 {
                    sum += scores[j as usize] / od as f64;
                }
            }
            new_scores[i] = teleport + config.damping * sum + sink_contrib;
            diff += (new_scores[i] - scores[i]).abs();
        }

        std::mem::swap(&mut scores, &mut new_scores);
        new_scores.iter_mut().for_each(|v| *v = 0.0);

        let avg_diff = diff / n as f64;
        tracing::debug!(iteration = iteration + 1, avg_diff, "pagerank iteration");
        if avg_diff < config.tolerance {
            tracing::info!(iterations = iteration + 1, "pagerank converged");
            break;
        }
    }

    let sum: f64 = scores.iter().sum();
    if sum > 0.0 {
        scores.iter_mut().for_each(|v| *v /= sum);
    }
    scores
}

/// Writes `dense_to_real[i],scores[i]` lines in scientific notation, one per dense node.
pub fn write_scores<W: std::io::Write>(
    mut out: W,
    graph: &Graph,
    scores: &[f64],
) -> std::io::Result<()> {
    for (i, &real_id) in graph.dense_to_real.iter().enumerate() {
        writeln!(out, "{},{:e}", real_id, scores[i])?;
    }
    Ok(())
}

/// Loads a `doc_id,score` CSV (scientific or plain notation both parse via `f64::from_str`).
pub fn load_scores<R: BufRead>(reader: R) -> HashMap<DocId, f64> {
    let mut scores = HashMap::new();
    let mut malformed = 0usize;
    for line in reader.lines() {
        let Ok(line) = line else { break };
        match parse_score_line(&line) {
            Some((id, score)) => {
                scores.insert(id, score);
            }
            None => malformed += 1,
        }
    }
    if malformed > 0 {
        tracing::warn!(malformed, "skipped malformed pagerank_scores.csv lines");
    }
    scores
}

fn parse_score_line(line: &str) -> Option<(DocId, f64)> {
    let (id, score) = line.split_once(',')?;
    let id = id.trim().parse::<DocId>().ok()?;
    let score = score.trim().parse::<f64>().ok()?;
    Some((id, score))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn graph_from(edges: &str, valid: &[DocId]) -> Graph {
        let valid_set: HashSet<DocId> = valid.iter().copied().collect();
        Graph::build_from_str(edges, &valid_set)
    }

    #[test]
    fn scenario_a_four_node_graph() {
        let edges = "1,2\n1,3\n2,3\n3,1\n4,3\n";
        let g = graph_from(edges, &[1, 2, 3, 4]);
        let scores = run(&g, &PageRankConfig { max_iterations: 50, tolerance: 1e-9, ..Default::default() });

        let sum: f64 = scores.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);

        let mut by_real: HashMap<DocId, f64> = HashMap::new();
        for (i, &real) in g.dense_to_real.iter().enumerate() {
            by_real.insert(real, scores[i]);
        }

        assert!((by_real[&1] - 0.372).abs() < 0.01);
        assert!((by_real[&2] - 0.196).abs() < 0.01);
        assert!((by_real[&3] - 0.394).abs() < 0.01);
        assert!((by_real[&4] - 0.0375).abs() < 0.01);
    }

    #[test]
    fn scenario_f_sink_mass_redistribution() {
        let edges = "1,2\n";
        let g = graph_from(edges, &[1, 2]);
        let scores = run(&g, &PageRankConfig::default());

        let sum: f64 = scores.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);

        let mut by_real: HashMap<DocId, f64> = HashMap::new();
        for (i, &real) in g.dense_to_real.iter().enumerate() {
            by_real.insert(real, scores[i]);
        }
        assert!(by_real[&2] > by_real[&1]);
    }

    #[test]
    fn empty_valid_set_yields_empty_graph() {
        let edges = "1,2\n2,3\n";
        let g = graph_from(edges, &[]);
        assert_eq!(g.num_nodes(), 0);
        let scores = run(&g, &PageRankConfig::default());
        assert!(scores.is_empty());
    }

    #[test]
    fn malformed_edge_lines_are_skipped() {
        let edges = "1,2\nnot-an-edge\n2,\n,3\n2,1\n";
        let g = graph_from(edges, &[1, 2, 3]);
        assert_eq!(g.num_nodes(), 2);
    }

    #[test]
    fn scores_round_trip_through_csv() {
        let edges = "1,2\n2,1\n";
        let g = graph_from(edges, &[1, 2]);
        let scores = run(&g, &PageRankConfig::default());
        let mut buf = Vec::new();
        write_scores(&mut buf, &g, &scores).unwrap();
        let loaded = load_scores(Cursor::new(buf));
        for (i, &real) in g.dense_to_real.iter().enumerate() {
            assert!((loaded[&real] - scores[i]).abs() < 1e-12);
        }
    }
}
