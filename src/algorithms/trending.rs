use super::{ScoringContext, Scorer};
use crate::config::TrendingConfig;
use crate::models::*;
use std::cmp::Ordering;
use tracing::debug;

/// Behavior-independent popularity ranking by rating x review count.
#[derive(Debug, Clone)]
pub struct TrendingScorer {
    config: TrendingConfig,
}

impl TrendingScorer {
    pub fn new(config: TrendingConfig) -> Self {
        Self { config }
    }

    /// Score for rank `index` of `total`, decaying linearly from 1.0.
    pub fn rank_score(&self, index: usize, total: usize) -> f64 {
        if total == 0 {
            return 0.0;
        }
        1.0 - (index as f64 / total as f64) * self.config.decay_span
    }
}

impl Scorer for TrendingScorer {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Trending
    }

    fn score(&self, ctx: &ScoringContext<'_>) -> Vec<Recommendation> {
        let mut candidates = ctx.candidates();
        candidates.sort_by(|a, b| {
            b.popularity()
                .partial_cmp(&a.popularity())
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });

        let total = candidates.len();
        let recommendations: Vec<Recommendation> = candidates
            .into_iter()
            .enumerate()
            .map(|(index, product)| {
                let score = self.rank_score(index, total);
                let confidence = (score * 100.0).min(self.config.max_confidence);
                let reason = format!(
                    "Trending now: rated {:.1} stars across {} reviews",
                    product.rating, product.review_count
                );
                Recommendation::new(product, score, confidence, reason, Algorithm::Trending)
            })
            .collect();

        debug!(count = recommendations.len(), "Trending scoring complete");
        recommendations
    }
}
