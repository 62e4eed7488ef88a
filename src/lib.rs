//! Core similarity kernel: Greedy String Tiling over pre-tokenized source,
//! with optional base-code subtraction and dependency-aware normalization.
//!
//! Building a [`token::TokenList`] from source text is out of scope here -
//! that's a scanner/parser's job. This crate starts from tokens already
//! carrying [`token::Semantics`] and produces [`matcher::Match`]es.

pub mod basecode;
pub mod cli;
pub mod config;
pub mod error;
pub mod hash;
pub mod matcher;
pub mod normalize;
pub mod token;

pub use basecode::{mark_base_code_on, preprocess_base_code, BaseCodeIndex};
pub use config::SimilarityConfig;
pub use error::SimilarityError;
pub use matcher::{Comparison, Match, Matcher};
pub use normalize::normalize;
pub use token::{Semantics, Token, TokenList, VariableId};

/// Compare two submissions using `config`'s `minimum_token_match`.
///
/// Convenience wrapper over [`Matcher::compare`] - the one call most
/// callers need once their token streams are built and (optionally)
/// normalized and base-code-marked.
pub fn compare(
    a_id: impl Into<String>,
    a: &mut TokenList,
    b_id: impl Into<String>,
    b: &mut TokenList,
    config: &SimilarityConfig,
) -> Comparison {
    Matcher::compare(a_id, a, b_id, b, config.minimum_token_match)
}
