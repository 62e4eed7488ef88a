//! Similarity-kernel configuration.

use crate::hash::MAX_WINDOW;

/// Hard lower bound on `minimum_token_match`.
pub const MIN_TOKEN_MATCH_FLOOR: usize = 1;

/// `minimumTokenMatch`, the one knob the core exposes.
///
/// Invalid configuration is never an error: values below the floor or
/// above [`MAX_WINDOW`] are silently clamped, with a `log::warn!` when a
/// correction actually happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimilarityConfig {
    pub minimum_token_match: usize,
}

impl SimilarityConfig {
    /// Construct a config, clamping `minimum_token_match` into
    /// `[MIN_TOKEN_MATCH_FLOOR, MAX_WINDOW]`.
    pub fn new(minimum_token_match: usize) -> Self {
        let clamped = minimum_token_match.clamp(MIN_TOKEN_MATCH_FLOOR, MAX_WINDOW);
        if clamped != minimum_token_match {
            log::warn!(
                "minimum_token_match {minimum_token_match} out of range [{MIN_TOKEN_MATCH_FLOOR}, {MAX_WINDOW}], clamped to {clamped}"
            );
        }
        SimilarityConfig {
            minimum_token_match: clamped,
        }
    }
}

impl Default for SimilarityConfig {
    /// Default recommendation for a typical source corpus.
    fn default() -> Self {
        SimilarityConfig::new(9)
    }
}
