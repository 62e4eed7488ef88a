//! Token stream data model.
//!
//! A [`TokenList`] is the unit the core operates on: an opaque, already
//! tokenized submission. Building one from source code is entirely the job
//! of an external scanner/parser; this module only models the shape the
//! core requires (FILE_END pivot, SEPARATOR between files, per-token
//! semantics) and the mutable per-token state (`hash`, `marked`,
//! `basecode`) a comparison needs.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashSet;

/// Reserved token kind marking the end of a submission's token stream.
///
/// Acts as a pivot: the matcher's inner loops rely on its presence to
/// terminate forward-extension without extra bounds checks.
pub const FILE_END: u32 = u32::MAX;

/// Reserved token kind inserted between files concatenated into one
/// submission.
pub const SEPARATOR: u32 = u32::MAX - 1;

/// Opaque identity of a variable read or written by a token.
///
/// Two reads/writes of the same source-level variable must carry the same
/// `VariableId`; the core never inspects the value beyond equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableId(pub u32);

/// Per-token dataflow and positional-significance annotation.
///
/// When the source-language frontend has no semantic analyzer, it must
/// populate this with `Semantics::default()` (empty reads/writes, zero
/// depth change, both significance flags false); the normalization graph
/// then degenerates to a strict chain and [`crate::normalize::normalize`]
/// becomes a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Semantics {
    pub reads: SmallVec<[VariableId; 2]>,
    pub writes: SmallVec<[VariableId; 2]>,
    /// Positive on entry to a loop-like block, negative on exit.
    pub bidirectional_block_depth_change: i32,
    /// No token may cross this one in either direction.
    pub has_full_position_significance: bool,
    /// Preserve relative order with other partial-significance tokens only.
    pub has_partial_position_significance: bool,
}

/// A single lexical unit in a token stream.
///
/// The `type` field (named `kind` here; `type` is a reserved word) is drawn
/// from a small alphabet private to the producing scanner, plus the two
/// reserved values [`FILE_END`] and [`SEPARATOR`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub kind: u32,
    pub line: u32,
    pub column: u32,
    pub length: u32,
    #[serde(default)]
    pub semantics: Semantics,
}

impl Token {
    pub fn new(kind: u32, line: u32, column: u32, length: u32) -> Self {
        Token {
            kind,
            line,
            column,
            length,
            semantics: Semantics::default(),
        }
    }

    pub fn with_semantics(mut self, semantics: Semantics) -> Self {
        self.semantics = semantics;
        self
    }

    pub fn file_end(line: u32) -> Self {
        Token::new(FILE_END, line, 0, 0)
    }

    pub fn separator(line: u32) -> Self {
        Token::new(SEPARATOR, line, 0, 0)
    }

    #[inline]
    pub fn is_pivot_or_separator(&self) -> bool {
        self.kind == FILE_END || self.kind == SEPARATOR
    }
}

/// Error produced when a [`TokenList`] fails to satisfy its invariants.
#[derive(Debug, thiserror::Error)]
pub enum TokenListError {
    #[error("token list must end with a FILE_END pivot, got {0} tokens with no such terminator")]
    MissingFileEndPivot(usize),
}

/// An ordered token sequence plus per-comparison mutable side-tables.
///
/// Invariants (enforced at construction): the last token has kind
/// [`FILE_END`]; `FILE_END` and `SEPARATOR` tokens are never part of any
/// match.
///
/// `hash`/`marked`/`basecode` are conceptually mutable companions of each
/// token; they live in side-tables here (indexed by position) rather than
/// on `Token` itself, so a `TokenList` can be reused read-only across many
/// pairwise comparisons by resetting only these vectors.
#[derive(Debug, Clone)]
pub struct TokenList {
    tokens: Vec<Token>,
    hash: Vec<Option<u32>>,
    marked: Vec<bool>,
    basecode: Vec<bool>,
    hashed_window: Option<usize>,
}

impl TokenList {
    /// Build a `TokenList`, validating the `FILE_END` pivot invariant.
    pub fn new(tokens: Vec<Token>) -> Result<Self, TokenListError> {
        match tokens.last() {
            Some(t) if t.kind == FILE_END => {}
            _ => return Err(TokenListError::MissingFileEndPivot(tokens.len())),
        }
        let len = tokens.len();
        Ok(TokenList {
            tokens,
            hash: vec![None; len],
            marked: vec![false; len],
            basecode: vec![false; len],
            hashed_window: None,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    #[inline]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    #[inline]
    pub fn kind_at(&self, i: usize) -> u32 {
        self.tokens[i].kind
    }

    #[inline]
    pub fn hash_at(&self, i: usize) -> Option<u32> {
        self.hash[i]
    }

    #[inline]
    pub fn set_hash_at(&mut self, i: usize, hash: Option<u32>) {
        self.hash[i] = hash;
    }

    #[inline]
    pub fn is_marked(&self, i: usize) -> bool {
        self.marked[i]
    }

    #[inline]
    pub fn set_marked(&mut self, i: usize, marked: bool) {
        self.marked[i] = marked;
    }

    #[inline]
    pub fn is_basecode(&self, i: usize) -> bool {
        self.basecode[i]
    }

    #[inline]
    pub fn set_basecode(&mut self, i: usize, basecode: bool) {
        self.basecode[i] = basecode;
    }

    /// The window width this list's hashes were last computed for, if any.
    pub fn hashed_window(&self) -> Option<usize> {
        self.hashed_window
    }

    pub fn set_hashed_window(&mut self, window: Option<usize>) {
        self.hashed_window = window;
    }

    /// Reset `hash` and `marked` for a fresh comparison; `basecode` flags
    /// persist (they reflect a one-shot pass run once per submission).
    pub fn reset_for_comparison(&mut self) {
        self.hash.iter_mut().for_each(|h| *h = None);
        self.marked.iter_mut().for_each(|m| *m = false);
        self.hashed_window = None;
    }

    /// Clear `marked` only, leaving `hash`/`hashed_window` intact.
    ///
    /// Lets a list whose hash was built once (the shared base-code list in
    /// [`crate::basecode`]) be re-seeded for a new comparison without
    /// rebuilding its [`crate::hash::HashIndex`].
    pub fn clear_marks(&mut self) {
        self.marked.iter_mut().for_each(|m| *m = false);
    }

    /// Mark every `FILE_END`/`SEPARATOR` token, plus, when `include_basecode`
    /// is set, every token already flagged `basecode`. Clears any marks
    /// left over from a previous comparison first.
    pub fn seed_marked_set(&mut self, include_basecode: bool) -> HashSet<usize> {
        self.clear_marks();
        let mut marked_positions = HashSet::new();
        for i in 0..self.tokens.len() {
            let is_pivot = self.tokens[i].is_pivot_or_separator();
            let is_basecode = include_basecode && self.basecode[i];
            if is_pivot || is_basecode {
                self.marked[i] = true;
                marked_positions.insert(i);
            }
        }
        marked_positions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_list_without_file_end() {
        let tokens = vec![Token::new(1, 1, 0, 1)];
        let err = TokenList::new(tokens).unwrap_err();
        assert!(matches!(err, TokenListError::MissingFileEndPivot(1)));
    }

    #[test]
    fn accepts_list_ending_in_file_end() {
        let tokens = vec![Token::new(1, 1, 0, 1), Token::file_end(2)];
        let list = TokenList::new(tokens).unwrap();
        assert_eq!(list.len(), 2);
        assert!(!list.is_marked(0));
    }

    #[test]
    fn seed_marked_set_flags_pivots_and_separators() {
        let tokens = vec![
            Token::new(1, 1, 0, 1),
            Token::separator(1),
            Token::new(2, 2, 0, 1),
            Token::file_end(3),
        ];
        let mut list = TokenList::new(tokens).unwrap();
        let marked = list.seed_marked_set(false);
        assert_eq!(marked, HashSet::from([1, 3]));
        assert!(list.is_marked(1));
        assert!(!list.is_marked(0));
    }

    #[test]
    fn seed_marked_set_includes_basecode_when_requested() {
        let tokens = vec![Token::new(1, 1, 0, 1), Token::file_end(2)];
        let mut list = TokenList::new(tokens).unwrap();
        list.set_basecode(0, true);
        let marked = list.seed_marked_set(true);
        assert!(marked.contains(&0));
        assert!(marked.contains(&1));
    }

    #[test]
    fn reset_for_comparison_clears_hash_and_marked_but_not_basecode() {
        let tokens = vec![Token::new(1, 1, 0, 1), Token::file_end(2)];
        let mut list = TokenList::new(tokens).unwrap();
        list.set_hash_at(0, Some(42));
        list.set_marked(0, true);
        list.set_basecode(0, true);
        list.reset_for_comparison();
        assert_eq!(list.hash_at(0), None);
        assert!(!list.is_marked(0));
        assert!(list.is_basecode(0));
    }
}
