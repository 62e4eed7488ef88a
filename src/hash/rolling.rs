//! Karp–Rabin style rolling hash over a token list's `kind` stream.
//!
//! Implements the exact update recurrence rather than the closed form, so
//! that rolling-update and closed-form hashes are guaranteed identical by
//! construction (the closed form is only used to seed the very first
//! window).

use super::index::HashIndex;
use crate::token::TokenList;
use std::collections::HashSet;

/// Low 6 bits kept from each token kind before folding into the hash.
const MOD_MASK: u32 = 63;

/// Upper bound on window width enforced by the hasher.
pub const MAX_WINDOW: usize = 25;

#[inline]
fn masked(kind: u32) -> u32 {
    kind & MOD_MASK
}

/// `H(i) = sum_{k=0..w-1} 2^(w-1-k) * masked(T[i+k].kind)`, the closed
/// form, used only to seed the first window before rolling.
fn closed_form(tokens: &[u32], start: usize, window: usize) -> u32 {
    let mut acc: u64 = 0;
    for k in 0..window {
        let weight = 1u64 << (window - 1 - k);
        acc += weight * masked(tokens[start + k]) as u64;
    }
    acc as u32
}

/// Assign `hash` on every token in `tokens` for which a full window
/// `[i, i+window)` exists and contains no marked token, per the rolling
/// recurrence
/// `H(i+1) = 2*(H(i) - factor*masked(T[i].kind)) + masked(T[i+window].kind)`.
///
/// No-op (fails silently, no side effects) when `tokens.len() < window`.
/// `window` must be in `1..=MAX_WINDOW` - callers are expected to clamp via
/// [`crate::config::SimilarityConfig`] before calling.
pub fn compute_hashes(tokens: &mut TokenList, marked: &HashSet<usize>, window: usize) {
    let n = tokens.len();
    if n < window || window == 0 {
        return;
    }
    let kinds: Vec<u32> = tokens.tokens().iter().map(|t| t.kind).collect();
    let last_start = n - window;
    let factor = 1u64 << (window - 1);

    let window_has_marked = |start: usize| (start..start + window).any(|p| marked.contains(&p));

    let mut h = closed_form(&kinds, 0, window) as u64;
    for i in 0..=last_start {
        if i > 0 {
            let outgoing = masked(kinds[i - 1]) as u64;
            let incoming = masked(kinds[i + window - 1]) as u64;
            h = 2 * (h - factor * outgoing) + incoming;
        }
        let value = if window_has_marked(i) { None } else { Some(h as u32) };
        tokens.set_hash_at(i, value);
    }
    tokens.set_hashed_window(Some(window));
}

/// Build a [`HashIndex`] from hashes already computed by [`compute_hashes`],
/// inserting positions in ascending order.
pub fn build_index(tokens: &TokenList, window: usize) -> HashIndex {
    let n = tokens.len();
    let mut index = HashIndex::with_expected_entries(n.saturating_sub(window));
    if n < window {
        return index;
    }
    for i in 0..=(n - window) {
        if let Some(h) = tokens.hash_at(i) {
            index.insert(h, i as u32);
        }
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Token;

    fn list_of_kinds(kinds: &[u32]) -> TokenList {
        let mut tokens: Vec<Token> = kinds
            .iter()
            .enumerate()
            .map(|(i, &k)| Token::new(k, i as u32 + 1, 0, 1))
            .collect();
        tokens.push(Token::file_end(kinds.len() as u32 + 1));
        TokenList::new(tokens).unwrap()
    }

    #[test]
    fn closed_form_matches_rolling_update_for_every_window() {
        let kinds = [1u32, 2, 3, 4, 5, 6, 7];
        let mut list = list_of_kinds(&kinds);
        let window = 3;
        compute_hashes(&mut list, &HashSet::new(), window);

        let all_kinds: Vec<u32> = list.tokens().iter().map(|t| t.kind).collect();
        for i in 0..=(all_kinds.len() - window) {
            let expected = closed_form(&all_kinds, i, window);
            assert_eq!(
                list.hash_at(i),
                Some(expected),
                "mismatch at start {i}"
            );
        }
    }

    #[test]
    fn marked_token_in_window_yields_sentinel() {
        let kinds = [1u32, 2, 3, 4];
        let mut list = list_of_kinds(&kinds);
        let marked: HashSet<usize> = HashSet::from([2]);
        compute_hashes(&mut list, &marked, 2);
        // Window [1,3) and [2,4) both touch position 2.
        assert_eq!(list.hash_at(1), None);
        assert_eq!(list.hash_at(2), None);
        // Window [0,2) doesn't.
        assert!(list.hash_at(0).is_some());
    }

    #[test]
    fn too_short_list_is_a_silent_no_op() {
        let kinds = [1u32];
        let mut list = list_of_kinds(&kinds);
        compute_hashes(&mut list, &HashSet::new(), 5);
        for i in 0..list.len() {
            assert_eq!(list.hash_at(i), None);
        }
        assert_eq!(list.hashed_window(), None);
    }

    #[test]
    fn build_index_collects_ascending_positions_per_hash() {
        // Repeating pattern so several starts share one hash.
        let kinds = [1u32, 2, 1, 2, 1, 2];
        let mut list = list_of_kinds(&kinds);
        compute_hashes(&mut list, &HashSet::new(), 2);
        let index = build_index(&list, 2);
        let h0 = list.hash_at(0).unwrap();
        let positions = index.lookup(h0);
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(positions.contains(&0));
    }
}
