//! Stop-word loading. Kept as an explicit, caller-owned `HashSet` rather than a process-global
//! table so the evaluator and the trie builder can each load (or mock) their own copy.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::io::BufRead;
use std::path::Path;

/// Loads whitespace-separated stop words from `path`, lowercased.
pub fn load(path: &Path) -> Result<HashSet<String>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening stopwords file {}", path.display()))?;
    Ok(load_from_reader(std::io::BufReader::new(file)))
}

pub fn load_from_reader<R: BufRead>(reader: R) -> HashSet<String> {
    let mut set = HashSet::new();
    for line in reader.lines() {
        let Ok(line) = line else { break };
        for word in line.split_whitespace() {
            set.insert(word.to_lowercase());
        }
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn loads_whitespace_separated_words() {
        let set = load_from_reader(Cursor::new("The a AN\nand or"));
        assert!(set.contains("the"));
        assert!(set.contains("an"));
        assert!(set.contains("and"));
        assert_eq!(set.len(), 5);
    }
}
