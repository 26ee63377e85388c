//! In-process Porter stemmer, standing in for an external stemming oracle process. A single
//! `Stemmer` instance is stateless and thread-safe, so it is kept as a lazily-initialized
//! singleton rather than threaded through every call site.

use lazy_static::lazy_static;
use rust_stemmers::{Algorithm, Stemmer};

lazy_static! {
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
}

/// Stems a single lowercase token. Deterministic and idempotent: `stem(stem(w)) == stem(w)`.
pub fn stem(term: &str) -> String {
    STEMMER.stem(term).to_string()
}
