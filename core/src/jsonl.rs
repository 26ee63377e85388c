//! Lenient line-delimited JSON reader, shared by every stage that reads `doc_info.jsonl` or
//! `tf_data.jsonl`: a corpus of ~7M lines must not abort on one malformed record.

use serde::de::DeserializeOwned;
use std::io::BufRead;
use std::marker::PhantomData;

/// Streams `T` out of a `BufRead`, skipping blank lines silently and malformed lines with a
/// logged warning. Never returns `Err` for a bad line; only a genuine I/O error on the
/// underlying reader surfaces as `Err`.
pub struct LenientJsonLines<R, T> {
    lines: std::io::Lines<R>,
    line_no: usize,
    malformed: usize,
    _marker: PhantomData<T>,
}

impl<R: BufRead, T: DeserializeOwned> LenientJsonLines<R, T> {
    pub fn new(reader: R) -> Self {
        Self { lines: reader.lines(), line_no: 0, malformed: 0, _marker: PhantomData }
    }

    /// Number of lines skipped so far because they failed to parse as `T`.
    pub fn malformed_count(&self) -> usize {
        self.malformed
    }
}

impl<R: BufRead, T: DeserializeOwned> Iterator for LenientJsonLines<R, T> {
    type Item = std::io::Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(l) => l,
                Err(e) => return Some(Err(e)),
            };
            self.line_no += 1;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<T>(&line) {
                Ok(v) => return Some(Ok(v)),
                Err(e) => {
                    self.malformed += 1;
                    tracing::warn!(line = self.line_no, error = %e, "skipping malformed json line");
                    continue;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DocInfoRecord;
    use std::io::Cursor;

    #[test]
    fn skips_blank_and_malformed_lines() {
        let data = "{\"id\":1,\"title\":\"A\",\"len\":10}\n\nnot json\n{\"id\":2,\"title\":\"B\",\"len\":5}\n";
        let reader = Cursor::new(data);
        let mut it: LenientJsonLines<_, DocInfoRecord> = LenientJsonLines::new(reader);
        let first = it.next().unwrap().unwrap();
        assert_eq!(first.id, 1);
        let second = it.next().unwrap().unwrap();
        assert_eq!(second.id, 2);
        assert!(it.next().is_none());
        assert_eq!(it.malformed_count(), 1);
    }
}
