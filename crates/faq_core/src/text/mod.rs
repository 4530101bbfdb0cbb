//! Text handling shared by querying, indexing and ranking.

pub mod expand;
pub mod normalize;
pub mod sentences;

pub use expand::SynonymTable;
pub use normalize::{is_stopword, normalize, suffix_variants};
pub use sentences::split_sentences;

use std::collections::BTreeSet;

/// Distinct tokens of `text`, as produced by [`normalize`].
pub fn token_set(text: &str) -> BTreeSet<String> {
    normalize(text).into_iter().collect()
}

/// Jaccard overlap of two token sets. Two empty sets count as identical.
pub fn token_overlap(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f32 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let shared = a.intersection(b).count();
    let union = a.len() + b.len() - shared;
    shared as f32 / union as f32
}
