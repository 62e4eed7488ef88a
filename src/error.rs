//! Library-facing error types.
//!
//! `Matcher::compare` itself never fails: too-short inputs just yield an
//! empty comparison. These errors cover the two places the core does refuse
//! to proceed: a malformed token list handed in by the caller, and a cycle
//! in the normalization graph's hard-edge subgraph, a contract violation by
//! whatever produced the semantics annotation.

pub use crate::token::TokenListError;

#[derive(Debug, thiserror::Error)]
pub enum SimilarityError {
    #[error(transparent)]
    TokenList(#[from] TokenListError),

    #[error("normalization graph has a cycle in its hard-edge subgraph: {0}")]
    NormalizationCycle(String),
}
