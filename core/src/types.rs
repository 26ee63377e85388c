use serde::{Deserialize, Serialize};

/// Document identifier, globally unique and assigned externally by the upstream corpus.
pub type DocId = i32;

/// A document's metadata, as loaded from `doc_info.jsonl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocMeta {
    pub doc_id: DocId,
    pub title: String,
    /// Document length in terms, used for BM25 normalization.
    pub length: i32,
}

/// One document's contribution to a term's posting list: a normalized term-frequency score
/// (`raw_freq / doc_length`), not a raw count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub tf_score: f32,
}

/// Raw record shape of a `doc_info.jsonl` line.
#[derive(Debug, Clone, Deserialize)]
pub struct DocInfoRecord {
    pub id: DocId,
    pub title: String,
    pub len: i32,
}

impl From<DocInfoRecord> for DocMeta {
    fn from(r: DocInfoRecord) -> Self {
        DocMeta { doc_id: r.id, title: r.title, length: r.len }
    }
}

/// Raw record shape of a `tf_data.jsonl` line: one document's term → normalized-frequency map.
#[derive(Debug, Clone, Deserialize)]
pub struct TfRecord {
    pub id: DocId,
    pub terms: std::collections::HashMap<String, f32>,
}
