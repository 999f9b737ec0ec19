pub mod collaborative;
pub mod content_based;
pub mod hybrid;
pub mod similarity;
pub mod trending;

pub use collaborative::CollaborativeScorer;
pub use content_based::ContentBasedScorer;
pub use hybrid::{HybridCombiner, HybridScorer};
pub use similarity::SimilarityFinder;
pub use trending::TrendingScorer;

use crate::models::*;
use crate::utils::validation::validate_product;
use std::collections::HashSet;
use tracing::warn;

/// Everything a scorer reads during one pass. Borrowed, never mutated.
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a> {
    pub catalog: &'a [Product],
    pub behavior: &'a BehaviorProfile,
    pub similar_profiles: &'a [SimilarProfile],
}

impl<'a> ScoringContext<'a> {
    pub fn new(catalog: &'a [Product], behavior: &'a BehaviorProfile, similar_profiles: &'a [SimilarProfile]) -> Self {
        Self {
            catalog,
            behavior,
            similar_profiles,
        }
    }

    /// Well-formed products the visitor has not viewed or bought, first occurrence of each id.
    pub fn candidates(&self) -> Vec<&'a Product> {
        let mut seen = HashSet::new();
        self.catalog
            .iter()
            .filter(|product| {
                if let Err(e) = validate_product(product) {
                    warn!(product_id = %product.id, "Skipping malformed product: {}", e);
                    return false;
                }
                !self.behavior.has_acted_on(&product.id) && seen.insert(product.id.as_str())
            })
            .collect()
    }
}

pub trait Scorer: Send + Sync {
    fn algorithm(&self) -> Algorithm;

    /// Ranked, deduplicated recommendations for the given context.
    fn score(&self, ctx: &ScoringContext<'_>) -> Vec<Recommendation>;
}
