use crate::config::SimilarityConfig;
use crate::models::*;
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::debug;

/// Scores externally supplied peer profiles against the requesting visitor.
///
/// Overlap is weighted per interaction type and mapped through
/// `raw / (raw + saturation)`, so the result stays in [0, 1) and grows
/// strictly with every additional shared purchase, wishlist entry or view.
#[derive(Debug, Clone)]
pub struct SimilarityFinder {
    config: SimilarityConfig,
}

impl SimilarityFinder {
    pub fn new(config: SimilarityConfig) -> Self {
        Self { config }
    }

    pub fn similarity(&self, behavior: &BehaviorProfile, peer: &PeerProfile) -> f64 {
        let purchased = overlap(&behavior.purchased_product_ids, &peer.purchased_product_ids);
        let wishlisted = overlap(&behavior.wishlisted_product_ids, &peer.wishlisted_product_ids);
        let viewed = overlap(&behavior.viewed_product_ids, &peer.viewed_product_ids);

        let raw = self.config.purchase_overlap_weight * purchased as f64
            + self.config.wishlist_overlap_weight * wishlisted as f64
            + self.config.view_overlap_weight * viewed as f64;

        if raw <= 0.0 {
            0.0
        } else {
            raw / (raw + self.config.saturation)
        }
    }

    pub fn find_similar(&self, behavior: Option<&BehaviorProfile>, pool: &[PeerProfile]) -> Vec<SimilarProfile> {
        let Some(behavior) = behavior else {
            debug!("No behavior profile, similarity lookup skipped");
            return Vec::new();
        };

        let mut similar: Vec<SimilarProfile> = pool
            .iter()
            .map(|peer| SimilarProfile::new(peer.clone(), self.similarity(behavior, peer)))
            .filter(|candidate| candidate.similarity > 0.0 && candidate.similarity >= self.config.min_similarity)
            .collect();

        similar.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.id().cmp(b.id()))
        });
        similar.truncate(self.config.max_profiles);

        debug!(pool = pool.len(), similar = similar.len(), "Similar profiles found");
        similar
    }
}

fn overlap(a: &HashSet<ProductId>, b: &HashSet<ProductId>) -> usize {
    a.intersection(b).count()
}
