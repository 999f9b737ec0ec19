use super::{ScoringContext, Scorer};
use crate::config::CollaborativeConfig;
use crate::models::*;
use crate::utils::sort_ranked;
use tracing::debug;

pub const COLLABORATIVE_REASON: &str = "Customers with similar taste also liked this";

/// Scores products by what behaviorally similar shoppers did with them.
#[derive(Debug, Clone)]
pub struct CollaborativeScorer {
    config: CollaborativeConfig,
}

impl CollaborativeScorer {
    pub fn new(config: CollaborativeConfig) -> Self {
        Self { config }
    }

    /// Strongest interaction a similar profile had with the product.
    fn interaction_weight(&self, profile: &SimilarProfile, product_id: &str) -> f64 {
        let peer = &profile.profile;
        if peer.purchased_product_ids.contains(product_id) {
            self.config.purchase_weight
        } else if peer.wishlisted_product_ids.contains(product_id) {
            self.config.wishlist_weight
        } else if peer.viewed_product_ids.contains(product_id) {
            self.config.view_weight
        } else {
            0.0
        }
    }

    pub fn accumulate(&self, similar_profiles: &[SimilarProfile], product_id: &str) -> f64 {
        similar_profiles
            .iter()
            .map(|profile| {
                let similarity = if profile.similarity.is_finite() {
                    profile.similarity.clamp(0.0, 1.0)
                } else {
                    0.0
                };
                similarity * self.interaction_weight(profile, product_id)
            })
            .sum()
    }
}

impl Scorer for CollaborativeScorer {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Collaborative
    }

    fn score(&self, ctx: &ScoringContext<'_>) -> Vec<Recommendation> {
        if ctx.similar_profiles.is_empty() {
            debug!("No similar profiles, collaborative scoring yields nothing");
            return Vec::new();
        }

        let mut recommendations: Vec<Recommendation> = ctx
            .candidates()
            .into_iter()
            .filter_map(|product| {
                let score = self.accumulate(ctx.similar_profiles, &product.id);
                if score <= 0.0 || score < self.config.min_score {
                    return None;
                }
                let confidence = (score * 100.0).min(self.config.max_confidence);
                Some(Recommendation::new(
                    product,
                    score,
                    confidence,
                    COLLABORATIVE_REASON,
                    Algorithm::Collaborative,
                ))
            })
            .collect();

        sort_ranked(&mut recommendations);
        debug!(count = recommendations.len(), "Collaborative scoring complete");
        recommendations
    }
}
