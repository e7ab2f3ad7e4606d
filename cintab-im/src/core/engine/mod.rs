//! Composition engine - the per-scheme input state machine
//!
//! A `CompositionEngine` is bound to one parsed table and owns the
//! transient input state: the code buffer being typed and the candidate
//! list derived from it. Keystrokes accumulate a code, candidates are
//! recomputed on every mutation, and selection or commit clears the
//! state.
//!
//! The engine never fails: invalid input (an unknown key, an
//! out-of-range candidate index) degrades to a `false`/`None` result
//! with no state change. It is not thread-safe; callers serialize
//! access to one instance, normally on the keystroke-handling thread.

#[cfg(test)]
mod tests;

use std::sync::Arc;

use cintab_engine::CinTable;
use tracing::trace;

/// Map a selection key to a candidate index: '1'..'9' select positions
/// 0..8 and '0' selects position 9.
fn selection_index(key: char) -> Option<usize> {
    match key {
        '1'..='9' => Some(key as usize - '1' as usize),
        '0' => Some(9),
        _ => None,
    }
}

/// Input composition state machine over one parsed table.
pub struct CompositionEngine {
    /// The bound table; shared with the cache
    table: Arc<CinTable>,
    /// The in-progress code
    code_buffer: String,
    /// Candidates for the current code, recomputed on every mutation
    candidates: Vec<char>,
}

impl CompositionEngine {
    /// Create an engine bound to a table, with empty input state.
    pub fn new(table: Arc<CinTable>) -> Self {
        Self {
            table,
            code_buffer: String::new(),
            candidates: Vec::new(),
        }
    }

    /// The table this engine is bound to.
    pub fn table(&self) -> &Arc<CinTable> {
        &self.table
    }

    /// Process a keystroke. Returns false without state change when the
    /// key is not valid for this table; otherwise the lowercased key is
    /// appended to the code buffer and candidates are recomputed.
    pub fn process_key(&mut self, key: char) -> bool {
        if !self.is_valid_key(key) {
            return false;
        }

        self.code_buffer.push(key.to_ascii_lowercase());
        self.refresh_candidates();
        trace!(
            code = %self.code_buffer,
            candidates = self.candidates.len(),
            "key processed"
        );
        true
    }

    /// Remove the last code character. Returns false when the buffer is
    /// already empty.
    pub fn backspace(&mut self) -> bool {
        if self.code_buffer.pop().is_none() {
            return false;
        }
        self.refresh_candidates();
        true
    }

    /// Select a candidate by index, clearing the input state. `None`
    /// without side effect when the index is out of range.
    pub fn select_candidate(&mut self, index: usize) -> Option<char> {
        let selected = *self.candidates.get(index)?;
        self.clear();
        Some(selected)
    }

    /// Select a candidate by selection key ('1'..'9', '0'). Any other
    /// key yields `None` without side effect.
    pub fn select_candidate_by_key(&mut self, key: char) -> Option<char> {
        self.select_candidate(selection_index(key)?)
    }

    /// Commit the current input: the first candidate when one exists,
    /// otherwise the raw code buffer, so an unmatched code degrades to
    /// literal text instead of losing keystrokes. `None` when nothing
    /// has been typed. Always clears the state.
    pub fn commit(&mut self) -> Option<String> {
        if self.code_buffer.is_empty() {
            return None;
        }

        let text = match self.candidates.first() {
            Some(&ch) => ch.to_string(),
            None => self.code_buffer.clone(),
        };
        self.clear();
        Some(text)
    }

    /// Reset buffer and candidates. Idempotent.
    pub fn clear(&mut self) {
        self.code_buffer.clear();
        self.candidates.clear();
    }

    /// Whether a code is being composed.
    pub fn has_input(&self) -> bool {
        !self.code_buffer.is_empty()
    }

    /// Whether the current code has candidates.
    pub fn has_candidates(&self) -> bool {
        !self.candidates.is_empty()
    }

    /// The first candidate, for direct commit.
    pub fn first_candidate(&self) -> Option<char> {
        self.candidates.first().copied()
    }

    /// The code typed so far.
    pub fn current_code(&self) -> &str {
        &self.code_buffer
    }

    /// Candidates for the code typed so far, in table order.
    pub fn current_candidates(&self) -> &[char] {
        &self.candidates
    }

    fn refresh_candidates(&mut self) {
        self.candidates = if self.code_buffer.is_empty() {
            Vec::new()
        } else {
            self.table.candidates(&self.code_buffer).to_vec()
        };
    }

    /// A key is valid when the table's keyname section lists it; tables
    /// without a keyname section accept any ASCII letter.
    fn is_valid_key(&self, key: char) -> bool {
        if self.table.key_labels().is_empty() {
            key.is_ascii_alphabetic()
        } else {
            self.table.key_labels().contains_key(&key)
        }
    }
}
