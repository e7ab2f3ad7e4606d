//! CIN table parser
//!
//! Parses the line-oriented CIN table format into a [`CinTable`]. The
//! format is a sequence of `%`-directives, comments, and two-field
//! definition lines:
//!
//! ```text
//! %ename Cangjie
//! %cname 倉頡
//! %keyname begin
//! a 日
//! %keyname end
//! %chardef begin
//! a 日
//! mgll 再
//! %chardef end
//! ```
//!
//! Parsing is a pure, single-pass function over the input text; it
//! performs no I/O.

use std::collections::HashMap;

use tracing::debug;

use crate::table::CinTable;

/// Metadata directives recognized anywhere in the file.
const METADATA_KEYS: &[&str] = &[
    "ename",
    "cname",
    "tname",
    "sname",
    "encoding",
    "selkey",
    "space_style",
];

/// Errors produced while parsing a CIN table.
#[derive(Debug, thiserror::Error)]
pub enum CinError {
    #[error("empty table content")]
    EmptyContent,

    #[error("malformed definition on line {line}: '{text}' (expected 'code character')")]
    MalformedLine { line: usize, text: String },

    #[error("empty code field on line {line}")]
    EmptyCode { line: usize },

    #[error("empty character field on line {line}")]
    EmptyChar { line: usize },

    #[error("no character definitions found (missing %chardef section)")]
    NoCharDefs,
}

/// One `code character` pair from the chardef section, in file order.
struct CharDef {
    code: String,
    ch: char,
}

/// Split a definition line into its two fields.
///
/// Fields are separated by one or more whitespace/tab characters; the
/// second field is the remainder of the line, so `mgll 再 x` yields
/// `("mgll", "再 x")`.
fn split_fields(line: &str) -> Option<(&str, &str)> {
    let (first, rest) = line.split_once(char::is_whitespace)?;
    Some((first, rest.trim_start()))
}

/// Parse CIN table text into a [`CinTable`].
pub fn parse(content: &str) -> Result<CinTable, CinError> {
    if content.trim().is_empty() {
        return Err(CinError::EmptyContent);
    }

    let mut char_defs: Vec<CharDef> = Vec::new();
    let mut metadata: HashMap<String, String> = HashMap::new();
    let mut key_labels: HashMap<char, String> = HashMap::new();
    let mut in_chardef = false;
    let mut in_keyname = false;

    'lines: for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();

        // Blank lines and comments are skipped even inside sections
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with("%keyname") {
            in_chardef = false;
            in_keyname = line.contains("begin");
            continue;
        }
        if line.starts_with("%chardef") {
            in_chardef = line.contains("begin");
            in_keyname = false;
            continue;
        }

        // Metadata directives are stored wherever they appear
        for key in METADATA_KEYS {
            if let Some(rest) = line.strip_prefix('%').and_then(|l| l.strip_prefix(key)) {
                metadata.insert((*key).to_string(), rest.trim().to_string());
                continue 'lines;
            }
        }

        if line.starts_with('%') {
            // Unrecognized directive. An "end" token anywhere in it
            // terminates both sections (defensive against truncated or
            // hand-edited tables).
            if line.starts_with("%endkey") || line.contains("end") {
                in_chardef = false;
                in_keyname = false;
            }
            continue;
        }

        if in_chardef {
            let Some((code, char_field)) = split_fields(line) else {
                return Err(CinError::MalformedLine {
                    line: idx + 1,
                    text: line.to_string(),
                });
            };
            if code.is_empty() {
                return Err(CinError::EmptyCode { line: idx + 1 });
            }
            // Only the first character of the field counts; the rest is
            // dropped. Historical behavior — some tables put phrases or
            // annotations here and readers have always ignored them.
            let Some(ch) = char_field.chars().next() else {
                return Err(CinError::EmptyChar { line: idx + 1 });
            };
            char_defs.push(CharDef {
                code: code.to_string(),
                ch,
            });
        } else if in_keyname {
            // Malformed keyname lines are skipped, not errors
            if let Some((key_field, label)) = split_fields(line)
                && let Some(key) = key_field.chars().next()
                && !label.is_empty()
            {
                key_labels.insert(key, label.to_string());
            }
        }
    }

    if char_defs.is_empty() {
        return Err(CinError::NoCharDefs);
    }

    debug!(
        defs = char_defs.len(),
        key_labels = key_labels.len(),
        "parsed CIN table"
    );

    Ok(build_mappings(char_defs, metadata, key_labels))
}

fn build_mappings(
    char_defs: Vec<CharDef>,
    metadata: HashMap<String, String>,
    key_labels: HashMap<char, String>,
) -> CinTable {
    let mut char_to_code: HashMap<char, String> = HashMap::new();
    let mut code_to_candidates: HashMap<String, Vec<char>> = HashMap::new();

    for def in char_defs {
        // A character may have several codes; the first one wins
        char_to_code
            .entry(def.ch)
            .or_insert_with(|| def.code.clone());

        // A code may map to several candidates; keep them all in order
        code_to_candidates.entry(def.code).or_default().push(def.ch);
    }

    CinTable::new(char_to_code, code_to_candidates, key_labels, metadata)
}
