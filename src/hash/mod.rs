//! Rolling hash and hash-index support for the matcher.

pub mod index;
pub mod rolling;

pub use index::HashIndex;
pub use rolling::{build_index, compute_hashes, MAX_WINDOW};
