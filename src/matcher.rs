//! Greedy String Tiling: the core pairwise comparison algorithm.
//!
//! [`Matcher::compare`] is the only entry point most callers need.
//! [`Matcher::run`] is exposed at crate-visibility so [`crate::basecode`]
//! can pin a shared base submission to one side of the comparison and reuse
//! its [`HashIndex`] across many submissions instead of rebuilding it.

use crate::hash::{build_index, compute_hashes, HashIndex};
use crate::token::TokenList;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One tile: `length` equal, contiguous, unmarked tokens starting at
/// `start_in_first` in the first submission and `start_in_second` in the
/// second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub start_in_first: u32,
    pub start_in_second: u32,
    pub length: u32,
}

/// The full result of comparing two submissions: every tile found, in the
/// order they were committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub first_id: String,
    pub second_id: String,
    pub matches: Vec<Match>,
}

impl Comparison {
    /// Sum of match lengths, the usual numerator for a similarity ratio.
    pub fn matched_token_count(&self) -> u64 {
        self.matches.iter().map(|m| m.length as u64).sum()
    }
}

/// Stateless entry point for Greedy String Tiling comparisons.
pub struct Matcher;

impl Matcher {
    /// Compare two submissions, reporting every tile of at least
    /// `minimum_token_match` tokens.
    ///
    /// Internally normalizes so the shorter list drives the outer scan (the
    /// longer list gets the [`HashIndex`]); the returned [`Match`] positions
    /// are always relative to `a` and `b` as passed, regardless of which one
    /// that turned out to be.
    pub fn compare(
        a_id: impl Into<String>,
        a: &mut TokenList,
        b_id: impl Into<String>,
        b: &mut TokenList,
        minimum_token_match: usize,
    ) -> Comparison {
        let a_id = a_id.into();
        let b_id = b_id.into();
        let matches = if a.len() <= b.len() {
            Self::run(a, b, minimum_token_match, false, None)
        } else {
            Self::run(b, a, minimum_token_match, false, None)
                .into_iter()
                .map(|m| Match {
                    start_in_first: m.start_in_second,
                    start_in_second: m.start_in_first,
                    length: m.length,
                })
                .collect()
        };
        Comparison {
            first_id: a_id,
            second_id: b_id,
            matches,
        }
    }

    /// The unordered core: `first`/`second` are taken exactly as given, with
    /// no shorter-first normalization - callers that care about that
    /// (`compare`) do it themselves. `second_index`, when supplied, is used
    /// in place of rebuilding a [`HashIndex`] for `second`; the caller is
    /// responsible for keeping it in sync with `second`'s hashes.
    pub(crate) fn run(
        first: &mut TokenList,
        second: &mut TokenList,
        minimum_token_match: usize,
        is_base_code: bool,
        second_index: Option<&HashIndex>,
    ) -> Vec<Match> {
        let mut matches = Vec::new();
        if first.len() <= minimum_token_match || second.len() <= minimum_token_match {
            return matches;
        }

        let include_basecode = !is_base_code;
        let first_marked = first.seed_marked_set(include_basecode);
        compute_hashes(first, &first_marked, minimum_token_match);

        let built_index;
        let index: &HashIndex = match second_index {
            Some(idx) => idx,
            None => {
                let second_marked = second.seed_marked_set(include_basecode);
                compute_hashes(second, &second_marked, minimum_token_match);
                built_index = build_index(second, minimum_token_match);
                &built_index
            }
        };

        loop {
            let mut max_match = minimum_token_match;
            let mut candidates: Vec<(usize, usize, usize)> = Vec::new();

            for x in 0..first.len() {
                if first.is_marked(x) {
                    continue;
                }
                let Some(h) = first.hash_at(x) else {
                    continue;
                };
                for &y in index.lookup(h) {
                    let y = y as usize;
                    if second.is_marked(y) {
                        continue;
                    }
                    let (sx, sy, len) = extend_match(first, second, x, y);
                    if len < minimum_token_match {
                        continue;
                    }
                    if is_base_code {
                        // Base code extraction is maximal, not greedy: every
                        // qualifying tile this round is kept, not just the
                        // ones tied with the round's longest.
                        if len > max_match {
                            max_match = len;
                        }
                        candidates.push((sx, sy, len));
                    } else {
                        match len.cmp(&max_match) {
                            Ordering::Greater => {
                                max_match = len;
                                candidates.clear();
                                candidates.push((sx, sy, len));
                            }
                            Ordering::Equal => candidates.push((sx, sy, len)),
                            Ordering::Less => {}
                        }
                    }
                }
            }

            // Every tile found this round is committed, win or tie - the
            // floor check below only decides whether another round runs.
            for (sx, sy, len) in candidates {
                if commit(first, second, sx, sy, len, is_base_code) && !is_base_code {
                    matches.push(Match {
                        start_in_first: sx as u32,
                        start_in_second: sy as u32,
                        length: len as u32,
                    });
                }
            }

            if max_match == minimum_token_match {
                break;
            }
        }

        matches
    }
}

/// Walk outward from a hash-confirmed window `(x, y)` to the full extent of
/// the matching, unmarked run: backward first (the window hash only proves
/// the tokens *at* `x..x+w` agree; tokens immediately before `x` may also
/// agree but never got their own hash if their window touched a mark), then
/// forward. Returns `(start_in_first, start_in_second, length)`.
fn extend_match(first: &TokenList, second: &TokenList, x: usize, y: usize) -> (usize, usize, usize) {
    let mut start_first = x;
    let mut start_second = y;
    while start_first > 0
        && start_second > 0
        && !first.is_marked(start_first - 1)
        && !second.is_marked(start_second - 1)
        && first.kind_at(start_first - 1) == second.kind_at(start_second - 1)
    {
        start_first -= 1;
        start_second -= 1;
    }

    let mut end_first = x;
    let mut end_second = y;
    while end_first < first.len()
        && end_second < second.len()
        && !first.is_marked(end_first)
        && !second.is_marked(end_second)
        && first.kind_at(end_first) == second.kind_at(end_second)
    {
        end_first += 1;
        end_second += 1;
    }

    (start_first, start_second, end_first - start_first)
}

/// Mark `[sx, sx+len)` in `first` and `[sy, sy+len)` in `second`, unless one
/// of those ranges is already (partly) marked - by an earlier, overlapping
/// tie committed this same round. Returns whether the commit happened.
fn commit(
    first: &mut TokenList,
    second: &mut TokenList,
    sx: usize,
    sy: usize,
    len: usize,
    is_base_code: bool,
) -> bool {
    let clear = (sx..sx + len).all(|i| !first.is_marked(i)) && (sy..sy + len).all(|i| !second.is_marked(i));
    if !clear {
        return false;
    }
    for i in 0..len {
        first.set_marked(sx + i, true);
        second.set_marked(sy + i, true);
        if is_base_code {
            first.set_basecode(sx + i, true);
            second.set_basecode(sy + i, true);
        }
    }
    true
}
