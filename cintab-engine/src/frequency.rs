//! Character frequency table
//!
//! A ranked character list used to order candidates: one character per
//! line, most frequent first. Characters absent from the table sort
//! last.

use std::collections::HashMap;

/// Frequency ranking for candidate ordering. Immutable after parsing.
#[derive(Debug, Clone, Default)]
pub struct FrequencyTable {
    rank: HashMap<char, usize>,
}

impl FrequencyTable {
    /// Parse a frequency list: first character of each line, `#` and
    /// blank lines ignored, first occurrence determines rank.
    pub fn parse(content: &str) -> Self {
        let mut rank = HashMap::new();
        let mut next = 0;
        for line in content.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let Some(ch) = trimmed.chars().next() else {
                continue;
            };
            if !rank.contains_key(&ch) {
                rank.insert(ch, next);
                next += 1;
            }
        }
        Self { rank }
    }

    pub fn len(&self) -> usize {
        self.rank.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rank.is_empty()
    }

    /// Rank of a character; unranked characters sort last.
    pub fn rank(&self, ch: char) -> usize {
        self.rank.get(&ch).copied().unwrap_or(usize::MAX)
    }

    /// Stable-sort candidates by rank, preserving file order among
    /// equally ranked (typically unranked) characters.
    pub fn sort_candidates(&self, candidates: &mut [char]) {
        candidates.sort_by_key(|ch| self.rank(*ch));
    }
}
