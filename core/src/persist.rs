//! On-disk formats for the inverted index (`index.bin` / `offset.txt`) and the shard-indexer's
//! intermediate chunk files. Every integer and float field is written little-endian at a fixed
//! width via `byteorder`, independent of host pointer width or struct padding.

use crate::types::{DocId, Posting};
use anyhow::{Context, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Writes one term's posting list as `[doc_freq: i32][postings: doc_freq * (doc_id: i32, tf_score: f32)]`
/// and returns the number of bytes written.
pub fn write_posting_list<W: Write>(mut out: W, postings: &[Posting]) -> std::io::Result<u64> {
    out.write_i32::<LittleEndian>(postings.len() as i32)?;
    for p in postings {
        out.write_i32::<LittleEndian>(p.doc_id)?;
        out.write_f32::<LittleEndian>(p.tf_score)?;
    }
    Ok(4 + postings.len() as u64 * 8)
}

/// Reads one term's posting list starting at the current stream position. Returns an error if
/// `doc_freq` is outside `(0, total_docs]` — a corruption guard against a mis-seeked offset.
pub fn read_posting_list<R: Read>(mut input: R, total_docs: i32) -> Result<Vec<Posting>> {
    let doc_freq = input.read_i32::<LittleEndian>().context("reading doc_freq")?;
    if doc_freq <= 0 || doc_freq > total_docs {
        anyhow::bail!("corrupt posting header: doc_freq={doc_freq} out of (0, {total_docs}]");
    }
    let mut postings = Vec::with_capacity(doc_freq as usize);
    for _ in 0..doc_freq {
        let doc_id = input.read_i32::<LittleEndian>().context("reading posting doc_id")?;
        let tf_score = input.read_f32::<LittleEndian>().context("reading posting tf_score")?;
        postings.push(Posting { doc_id, tf_score });
    }
    Ok(postings)
}

/// Writes `index.bin`'s leading `total_docs` header.
pub fn write_total_docs<W: Write>(mut out: W, total_docs: i32) -> std::io::Result<()> {
    out.write_i32::<LittleEndian>(total_docs)
}

/// Reads `index.bin`'s leading `total_docs` header.
pub fn read_total_docs<R: Read>(mut input: R) -> Result<i32> {
    input.read_i32::<LittleEndian>().context("reading total_docs header")
}

/// A shard's term → chunk-relative byte offset directory, as written by the shard indexer and
/// rewritten to global offsets by the merger. Whitespace-separated `term offset\n` text.
pub fn write_offsets<W: Write>(mut out: W, offsets: &[(String, u64)]) -> std::io::Result<()> {
    for (term, offset) in offsets {
        writeln!(out, "{term} {offset}")?;
    }
    Ok(())
}

pub fn load_offsets<R: BufRead>(reader: R) -> Result<HashMap<String, u64>> {
    let mut map = HashMap::new();
    for line in reader.lines() {
        let line = line?;
        let mut parts = line.split_whitespace();
        let (Some(term), Some(offset_str)) = (parts.next(), parts.next()) else { continue };
        let Ok(offset) = offset_str.parse::<u64>() else { continue };
        map.insert(term.to_string(), offset);
    }
    Ok(map)
}

/// Seeks `index_file` to `offset` and reads one posting list, guarding against corruption.
pub fn read_posting_list_at<F: Read + Seek>(
    index_file: &mut F,
    offset: u64,
    total_docs: i32,
) -> Result<Vec<Posting>> {
    index_file.seek(SeekFrom::Start(offset)).context("seeking to posting list offset")?;
    read_posting_list(index_file, total_docs)
}

/// Path layout for the pipeline's intermediate and output files, passed by reference through
/// every stage instead of held as process-global state.
#[derive(Debug, Clone)]
pub struct Paths {
    pub doc_info: std::path::PathBuf,
    pub tf_data: std::path::PathBuf,
    pub pagelinks: std::path::PathBuf,
    pub stopwords: std::path::PathBuf,
    pub shard_dir: std::path::PathBuf,
    pub pagerank_scores: std::path::PathBuf,
    pub index_bin: std::path::PathBuf,
    pub offset_txt: std::path::PathBuf,
    pub trie_bin: std::path::PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Paths {
            doc_info: "doc_info.jsonl".into(),
            tf_data: "tf_data.jsonl".into(),
            pagelinks: "pagelinks.csv".into(),
            stopwords: "stopwords.txt".into(),
            shard_dir: ".".into(),
            pagerank_scores: "pagerank_scores.csv".into(),
            index_bin: "index.bin".into(),
            offset_txt: "offset.txt".into(),
            trie_bin: "trie.bin".into(),
        }
    }
}

impl Paths {
    pub fn shard_input(&self, shard_id: usize) -> std::path::PathBuf {
        self.shard_dir.join(format!("temp_{shard_id}.txt"))
    }
    pub fn chunk_bin(&self, shard_id: usize) -> std::path::PathBuf {
        self.shard_dir.join(format!("chunk_{shard_id}.bin"))
    }
    pub fn chunk_offsets(&self, shard_id: usize) -> std::path::PathBuf {
        self.shard_dir.join(format!("chunk_offsets_{shard_id}.txt"))
    }
}

/// Merges `num_shards` chunk files into a single `index.bin` + global `offset.txt`, rewriting
/// each shard's local offsets by adding the shard's base position in the merged file.
pub fn merge_shards(paths: &Paths, num_shards: usize, total_docs: i32) -> Result<()> {
    let mut index_out =
        BufWriter::new(File::create(&paths.index_bin).context("creating index.bin")?);
    let mut global_offsets: Vec<(String, u64)> = Vec::new();

    write_total_docs(&mut index_out, total_docs)?;
    let mut base: u64 = 4;

    for shard_id in 0..num_shards {
        let chunk_path = paths.chunk_bin(shard_id);
        let mut chunk_in =
            File::open(&chunk_path).with_context(|| format!("opening {}", chunk_path.display()))?;
        let bytes_copied = std::io::copy(&mut chunk_in, &mut index_out)
            .with_context(|| format!("copying {}", chunk_path.display()))?;

        let offsets_path = paths.chunk_offsets(shard_id);
        let offsets_file = File::open(&offsets_path)
            .with_context(|| format!("opening {}", offsets_path.display()))?;
        for line in BufReader::new(offsets_file).lines() {
            let line = line?;
            let mut parts = line.split_whitespace();
            let (Some(term), Some(local_str)) = (parts.next(), parts.next()) else { continue };
            let Ok(local_offset) = local_str.parse::<u64>() else { continue };
            global_offsets.push((term.to_string(), base + local_offset));
        }

        base += bytes_copied;
    }

    index_out.flush().context("flushing index.bin")?;
    let offset_out = File::create(&paths.offset_txt).context("creating offset.txt")?;
    write_offsets(BufWriter::new(offset_out), &global_offsets)?;
    Ok(())
}

/// Builds one shard's in-memory postings map from its `temp_<i>.txt` lines
/// (`term doc_id score`, whitespace-separated), preserving each term's insertion order.
pub fn read_shard_lines<R: BufRead>(reader: R) -> HashMap<String, Vec<Posting>> {
    let mut index: HashMap<String, Vec<Posting>> = HashMap::new();
    for line in reader.lines() {
        let Ok(line) = line else { break };
        let mut parts = line.split_whitespace();
        let (Some(term), Some(doc_id_str), Some(score_str)) =
            (parts.next(), parts.next(), parts.next())
        else {
            continue;
        };
        let (Ok(doc_id), Ok(tf_score)) = (doc_id_str.parse::<DocId>(), score_str.parse::<f32>())
        else {
            continue;
        };
        index.entry(term.to_string()).or_default().push(Posting { doc_id, tf_score });
    }
    index
}

/// Writes one shard's chunk binary + local offset file from its in-memory postings map.
pub fn write_shard_chunk(
    postings: &HashMap<String, Vec<Posting>>,
    chunk_bin_path: &Path,
    chunk_offsets_path: &Path,
) -> Result<()> {
    let mut bin_out = BufWriter::new(File::create(chunk_bin_path).context("creating chunk bin")?);
    let mut offsets: Vec<(String, u64)> = Vec::with_capacity(postings.len());
    let mut pos: u64 = 0;

    for (term, plist) in postings {
        offsets.push((term.clone(), pos));
        pos += write_posting_list(&mut bin_out, plist)?;
    }
    bin_out.flush().context("flushing chunk bin")?;

    let offsets_out = File::create(chunk_offsets_path).context("creating chunk offsets")?;
    write_offsets(BufWriter::new(offsets_out), &offsets)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn posting_list_round_trips() {
        let postings =
            vec![Posting { doc_id: 1, tf_score: 0.1 }, Posting { doc_id: 2, tf_score: 0.05 }];
        let mut buf = Vec::new();
        write_posting_list(&mut buf, &postings).unwrap();
        let read = read_posting_list(Cursor::new(buf), 1000).unwrap();
        assert_eq!(read, postings);
    }

    #[test]
    fn corrupt_doc_freq_is_rejected() {
        let mut buf = Vec::new();
        buf.write_i32::<LittleEndian>(-1).unwrap();
        assert!(read_posting_list(Cursor::new(buf), 1000).is_err());

        let mut buf2 = Vec::new();
        buf2.write_i32::<LittleEndian>(2000).unwrap();
        assert!(read_posting_list(Cursor::new(buf2), 1000).is_err());
    }

    #[test]
    fn offsets_round_trip_through_text() {
        let offsets = vec![("alpha".to_string(), 0u64), ("beta".to_string(), 12u64)];
        let mut buf = Vec::new();
        write_offsets(&mut buf, &offsets).unwrap();
        let loaded = load_offsets(Cursor::new(buf)).unwrap();
        assert_eq!(loaded["alpha"], 0);
        assert_eq!(loaded["beta"], 12);
    }

    #[test]
    fn scenario_b_two_shard_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths { shard_dir: dir.path().to_path_buf(), ..Default::default() };

        // doc 1: {alpha: 0.1, beta: 0.2}, doc 2: {alpha: 0.05}, split across 2 shards.
        let shard0 = read_shard_lines(Cursor::new("alpha 1 0.1\nalpha 2 0.05\n"));
        let shard1 = read_shard_lines(Cursor::new("beta 1 0.2\n"));

        write_shard_chunk(&shard0, &paths.chunk_bin(0), &paths.chunk_offsets(0)).unwrap();
        write_shard_chunk(&shard1, &paths.chunk_bin(1), &paths.chunk_offsets(1)).unwrap();

        merge_shards(&paths, 2, 2).unwrap();

        let offsets = load_offsets(BufReader::new(File::open(&paths.offset_txt).unwrap())).unwrap();
        let mut index_file = File::open(&paths.index_bin).unwrap();
        let total_docs = read_total_docs(&mut index_file).unwrap();
        assert_eq!(total_docs, 2);

        let alpha = read_posting_list_at(&mut index_file, offsets["alpha"], total_docs).unwrap();
        assert_eq!(
            alpha,
            vec![Posting { doc_id: 1, tf_score: 0.1 }, Posting { doc_id: 2, tf_score: 0.05 }]
        );

        let beta = read_posting_list_at(&mut index_file, offsets["beta"], total_docs).unwrap();
        assert_eq!(beta, vec![Posting { doc_id: 1, tf_score: 0.2 }]);
    }
}
