//! Character-trie prefix autocomplete index, arena-allocated (`Vec<TrieNode>`) rather than
//! pointer-based so the whole structure can be memory-mapped or bulk (de)serialized without
//! chasing pointers.
//!
//! (De)serialization walks the tree in pre-order using an explicit stack rather than native
//! recursion: a trie built over the full title corpus can nest as deep as the longest title, and
//! letting recursion depth track that is one stack frame away from a crash on pathological input.

use anyhow::{Context, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::collections::BTreeMap;
use std::io::{Read, Write};

/// Index into the arena. `0` is always the root.
type NodeId = u32;

#[derive(Debug, Clone)]
struct TrieNode {
    /// Children keyed by lowercased byte, in ascending order — matches the on-disk child order.
    children: BTreeMap<u8, NodeId>,
    is_end: bool,
    full_title: String,
    score: f64,
    page_id: i32,
}

impl TrieNode {
    fn empty() -> Self {
        TrieNode { children: BTreeMap::new(), is_end: false, full_title: String::new(), score: 0.0, page_id: 0 }
    }
}

/// A completion candidate returned by [`Trie::get_suggestions`].
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub title: String,
    pub score: f64,
    pub page_id: i32,
}

/// Arena-backed prefix trie over lowercased title bytes.
pub struct Trie {
    nodes: Vec<TrieNode>,
}

impl Trie {
    pub fn new() -> Self {
        Trie { nodes: vec![TrieNode::empty()] }
    }

    const ROOT: NodeId = 0;

    /// Inserts `title` with its autocomplete `score` and `page_id`. Matching is case-insensitive
    /// (ASCII-lowercased byte path); the original-case `title` is kept as the suggestion payload.
    pub fn insert(&mut self, title: &str, score: f64, page_id: i32) {
        let mut node = Self::ROOT;
        for &byte in title.as_bytes() {
            let key = byte.to_ascii_lowercase();
            node = match self.nodes[node as usize].children.get(&key) {
                Some(&child) => child,
                None => {
                    let new_id = self.nodes.len() as NodeId;
                    self.nodes.push(TrieNode::empty());
                    self.nodes[node as usize].children.insert(key, new_id);
                    new_id
                }
            };
        }
        let leaf = &mut self.nodes[node as usize];
        leaf.is_end = true;
        leaf.full_title = title.to_string();
        leaf.score = score;
        leaf.page_id = page_id;
    }

    /// Returns up to `limit` completions for `prefix`, ranked by descending score. Fewer than
    /// `limit` matches yields a shorter vector — truncation is shrink-only, never padded.
    pub fn get_suggestions(&self, prefix: &str, limit: usize) -> Vec<Suggestion> {
        let mut node = Self::ROOT;
        for &byte in prefix.as_bytes() {
            let key = byte.to_ascii_lowercase();
            match self.nodes[node as usize].children.get(&key) {
                Some(&child) => node = child,
                None => return Vec::new(),
            }
        }

        let mut candidates = Vec::new();
        let mut stack = vec![node];
        while let Some(n) = stack.pop() {
            let cur = &self.nodes[n as usize];
            if cur.is_end {
                candidates.push(Suggestion {
                    title: cur.full_title.clone(),
                    score: cur.score,
                    page_id: cur.page_id,
                });
            }
            stack.extend(cur.children.values().copied());
        }

        candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        candidates.truncate(limit);
        candidates
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Serializes the trie in pre-order: for each node, `is_end` then (if set) its payload, then
    /// its child count, then for each child its key byte followed by the child's own encoding.
    pub fn serialize<W: Write>(&self, mut out: W) -> Result<()> {
        // Explicit-stack pre-order walk. A frame tracks the node being emitted and the sorted
        // keys of children not yet visited; popping a frame with no keys left means that node
        // (and its whole subtree) is fully written.
        struct Frame {
            node: NodeId,
            keys: Vec<u8>,
            idx: usize,
        }

        self.write_node_header(&mut out, Self::ROOT)?;
        let root_keys: Vec<u8> = self.nodes[Self::ROOT as usize].children.keys().copied().collect();
        let mut stack = vec![Frame { node: Self::ROOT, keys: root_keys, idx: 0 }];

        while let Some(frame) = stack.last_mut() {
            if frame.idx >= frame.keys.len() {
                stack.pop();
                continue;
            }
            let key = frame.keys[frame.idx];
            frame.idx += 1;
            let child = self.nodes[frame.node as usize].children[&key];
            out.write_u8(key).context("writing child key")?;
            self.write_node_header(&mut out, child)?;
            let child_keys: Vec<u8> = self.nodes[child as usize].children.keys().copied().collect();
            stack.push(Frame { node: child, keys: child_keys, idx: 0 });
        }
        Ok(())
    }

    fn write_node_header<W: Write>(&self, out: &mut W, id: NodeId) -> Result<()> {
        let node = &self.nodes[id as usize];
        out.write_u8(node.is_end as u8).context("writing is_end")?;
        if node.is_end {
            out.write_f64::<LittleEndian>(node.score).context("writing score")?;
            out.write_i32::<LittleEndian>(node.page_id).context("writing page_id")?;
            let title_bytes = node.full_title.as_bytes();
            out.write_u64::<LittleEndian>(title_bytes.len() as u64).context("writing title_len")?;
            out.write_all(title_bytes).context("writing title bytes")?;
        }
        out.write_u64::<LittleEndian>(node.children.len() as u64).context("writing num_children")?;
        Ok(())
    }

    /// Deserializes a trie written by [`Trie::serialize`], again via an explicit stack rather
    /// than recursion so reading depth is bounded only by available heap, not call-stack size.
    pub fn deserialize<R: Read>(mut input: R) -> Result<Trie> {
        struct Frame {
            node: NodeId,
            remaining: u64,
        }

        let root = read_node_header(&mut input)?;
        let mut trie = Trie { nodes: vec![root.node] };
        let mut stack = vec![Frame { node: Self::ROOT, remaining: root.children_to_read }];

        while let Some(frame) = stack.last_mut() {
            if frame.remaining == 0 {
                stack.pop();
                continue;
            }
            frame.remaining -= 1;
            let parent = frame.node;

            let key = input.read_u8().context("reading child key")?;
            let raw = read_node_header(&mut input)?;
            let child_id = trie.nodes.len() as NodeId;
            let child_remaining = raw.children_to_read;
            trie.nodes.push(raw.node);
            trie.nodes[parent as usize].children.insert(key, child_id);

            stack.push(Frame { node: child_id, remaining: child_remaining });
        }

        Ok(trie)
    }
}

struct RawNode {
    node: TrieNode,
    children_to_read: u64,
}

fn read_node_header<R: Read>(input: &mut R) -> Result<RawNode> {
    let is_end = input.read_u8().context("reading is_end")? != 0;
    let (score, page_id, full_title) = if is_end {
        let score = input.read_f64::<LittleEndian>().context("reading score")?;
        let page_id = input.read_i32::<LittleEndian>().context("reading page_id")?;
        let title_len = input.read_u64::<LittleEndian>().context("reading title_len")?;
        let mut buf = vec![0u8; title_len as usize];
        input.read_exact(&mut buf).context("reading title bytes")?;
        let title = String::from_utf8(buf).context("title is not valid utf-8")?;
        (score, page_id, title)
    } else {
        (0.0, 0, String::new())
    };
    let children_to_read = input.read_u64::<LittleEndian>().context("reading num_children")?;
    let node = TrieNode { children: BTreeMap::new(), is_end, full_title, score, page_id };
    Ok(RawNode { node, children_to_read })
}

impl Default for Trie {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds a trie from document titles, autocomplete scores and page ids — the shape produced by
/// joining `doc_info.jsonl` with `pagerank_scores.csv`.
pub fn build_from_entries<I: IntoIterator<Item = (String, f64, i32)>>(entries: I) -> Trie {
    let mut trie = Trie::new();
    for (title, score, page_id) in entries {
        trie.insert(&title, score, page_id);
    }
    trie
}
