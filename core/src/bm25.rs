//! BM25 scoring, blended at the evaluator with a logarithmic PageRank prior (see
//! `server::evaluator`). Pure functions only — no I/O, easy to property-test.

pub const K1: f64 = 1.2;
pub const B: f64 = 0.75;

/// Blend weight applied to the PageRank prior alongside the BM25 score.
pub const ALPHA: f64 = 0.2;

/// Okapi BM25 inverse document frequency, floored at zero (a term present in more than half the
/// corpus would otherwise score negative).
pub fn idf(total_docs: i64, doc_freq: i64) -> f64 {
    let raw = ((total_docs - doc_freq) as f64 + 0.5) / (doc_freq as f64 + 0.5);
    raw.ln().max(0.0)
}

/// BM25 term-frequency component for one posting.
pub fn score(idf: f64, raw_freq: f64, doc_len: f64, avg_doc_len: f64) -> f64 {
    let numerator = raw_freq * (K1 + 1.0);
    let denominator = raw_freq + K1 * (1.0 - B + B * (doc_len / avg_doc_len));
    idf * (numerator / denominator)
}

/// Logarithmic PageRank prior: `ln(1 + pagerank * num_scored_docs)`.
pub fn pagerank_prior(pagerank: f64, num_scored_docs: usize) -> f64 {
    (1.0 + pagerank * num_scored_docs as f64).ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idf_is_nonnegative() {
        assert!(idf(1000, 999) >= 0.0);
        assert!(idf(1000, 10) > 0.0);
    }

    #[test]
    fn bm25_monotone_in_raw_freq() {
        let i = idf(1000, 10);
        let mut prev = score(i, 0.0, 100.0, 100.0);
        for rf in [1.0, 2.0, 5.0, 10.0, 50.0, 200.0] {
            let cur = score(i, rf, 100.0, 100.0);
            assert!(cur >= prev, "bm25 should be non-decreasing in raw_freq: {prev} -> {cur}");
            prev = cur;
        }
    }

    #[test]
    fn scenario_c_bm25_and_pagerank_blend() {
        // spec.md Scenario C
        let total_docs = 1000i64;
        let avg_doc_length = 100.0f64;
        let doc_freq = 10i64;
        let tf_norm = 0.02f64;
        let doc_len = 200.0f64;
        let pagerank = 1e-4f64;
        let num_scored_docs = 1000usize;

        let raw_freq = tf_norm * doc_len;
        assert!((raw_freq - 4.0).abs() < 1e-9);

        let i = idf(total_docs, doc_freq);
        assert!((i - 4.547).abs() < 1e-2);

        let bm25 = score(i, raw_freq, doc_len, avg_doc_length);
        assert!((bm25 - 7.08).abs() < 0.05, "bm25 = {bm25}");

        let pg_norm = pagerank_prior(pagerank, num_scored_docs);
        assert!((pg_norm - 0.0953).abs() < 1e-3);

        let total = bm25 + super::ALPHA * pg_norm;
        assert!((total - 7.175).abs() < 0.05, "total = {total}");
    }
}
