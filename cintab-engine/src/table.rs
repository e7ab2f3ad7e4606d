//! Parsed CIN table data model
//!
//! A `CinTable` is the immutable result of parsing a CIN table file:
//! the code↔character mappings, key labels, and table metadata.

use std::collections::HashMap;

/// Selection keys used when the table declares no `%selkey`.
pub const DEFAULT_SELECTION_KEYS: &str = "1234567890";

/// A parsed CIN table, immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CinTable {
    /// First-seen code per character
    char_to_code: HashMap<char, String>,
    /// Candidates per code, in file order
    code_to_candidates: HashMap<String, Vec<char>>,
    /// Root labels from the `%keyname` section
    key_labels: HashMap<char, String>,
    /// Recognized `%`-directives (ename, cname, tname, sname, encoding, selkey, space_style)
    metadata: HashMap<String, String>,
}

impl CinTable {
    pub(crate) fn new(
        char_to_code: HashMap<char, String>,
        code_to_candidates: HashMap<String, Vec<char>>,
        key_labels: HashMap<char, String>,
        metadata: HashMap<String, String>,
    ) -> Self {
        Self {
            char_to_code,
            code_to_candidates,
            key_labels,
            metadata,
        }
    }

    /// Candidates for a code, in file order. Empty if the code is undefined.
    pub fn candidates(&self, code: &str) -> &[char] {
        self.code_to_candidates
            .get(code)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The first code that was defined for a character.
    pub fn code(&self, ch: char) -> Option<&str> {
        self.char_to_code.get(&ch).map(String::as_str)
    }

    /// Root label for a key, for rendering on the on-screen keyboard.
    pub fn key_label(&self, key: char) -> Option<&str> {
        self.key_labels
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// The full key → root-label map from the `%keyname` section.
    /// Empty when the table has no keyname section.
    pub fn key_labels(&self) -> &HashMap<char, String> {
        &self.key_labels
    }

    /// A recognized metadata directive, stored verbatim (trimmed).
    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Number of distinct characters defined by the table.
    pub fn total_chars(&self) -> usize {
        self.char_to_code.len()
    }

    /// English name (`%ename`).
    pub fn english_name(&self) -> &str {
        self.metadata("ename").unwrap_or("Unknown")
    }

    /// Chinese name (`%cname`, falling back to `%tname`).
    pub fn chinese_name(&self) -> &str {
        self.metadata("cname")
            .or_else(|| self.metadata("tname"))
            .unwrap_or("未知")
    }

    /// Display name, priority: sname > cname > tname > ename.
    pub fn display_name(&self) -> &str {
        self.metadata("sname")
            .or_else(|| self.metadata("cname"))
            .or_else(|| self.metadata("tname"))
            .or_else(|| self.metadata("ename"))
            .unwrap_or("未知")
    }

    /// Selection keys (`%selkey`), defaulting to "1234567890".
    pub fn selection_keys(&self) -> &str {
        self.metadata("selkey").unwrap_or(DEFAULT_SELECTION_KEYS)
    }

    /// Number of distinct codes defined by the table.
    pub fn total_codes(&self) -> usize {
        self.code_to_candidates.len()
    }

    /// Iterate over all codes and their candidate lists.
    pub fn codes(&self) -> impl Iterator<Item = (&str, &[char])> {
        self.code_to_candidates
            .iter()
            .map(|(code, chars)| (code.as_str(), chars.as_slice()))
    }

    /// Iterate over all characters and their first-seen codes.
    pub fn char_codes(&self) -> impl Iterator<Item = (char, &str)> {
        self.char_to_code
            .iter()
            .map(|(ch, code)| (*ch, code.as_str()))
    }
}
