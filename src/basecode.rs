//! Base-code subtraction: a one-shot pass that flags tokens a submission
//! shares with supplied starter/template code, so the real pairwise
//! comparisons that follow can ignore them.
//!
//! The base submission is typically compared against every other
//! submission in a batch, so its [`HashIndex`] is built once in
//! [`preprocess_base_code`] and reused by every [`mark_base_code_on`] call
//! instead of being rebuilt per submission.

use crate::hash::{build_index, compute_hashes, HashIndex};
use crate::matcher::Matcher;
use crate::token::TokenList;

/// The base submission's hashes and index, built once and reused across
/// every submission it's subtracted from.
pub struct BaseCodeIndex {
    window: usize,
    index: HashIndex,
}

/// Hash `base` with window `minimum_token_match` and build its
/// [`HashIndex`]. Call once before any [`mark_base_code_on`] calls that
/// share this base.
pub fn preprocess_base_code(base: &mut TokenList, minimum_token_match: usize) -> BaseCodeIndex {
    let marked = base.seed_marked_set(false);
    compute_hashes(base, &marked, minimum_token_match);
    let index = build_index(base, minimum_token_match);
    BaseCodeIndex {
        window: minimum_token_match,
        index,
    }
}

/// Run a base-code pass of `submission` against `base`, flagging every
/// token `submission` shares with it as `basecode`. Reports no matches;
/// `base`'s own `marked` state is re-seeded here so it can be reused for
/// the next submission without rebuilding its index.
pub fn mark_base_code_on(
    submission: &mut TokenList,
    base: &mut TokenList,
    base_index: &BaseCodeIndex,
) {
    base.seed_marked_set(false);
    Matcher::run(
        submission,
        base,
        base_index.window,
        true,
        Some(&base_index.index),
    );
}
