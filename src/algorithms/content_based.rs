use super::{ScoringContext, Scorer};
use crate::config::ContentBasedConfig;
use crate::models::*;
use crate::utils::validation::normalize_search_term;
use crate::utils::{sort_ranked, terms_overlap};
use tracing::debug;

pub const FEATURE_REASON: &str = "Has features you searched for";
pub const INTEREST_REASON: &str = "Based on your shopping preferences";

/// Per-product signals derived from the visitor's own preferences.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentSignals {
    pub category_affinity: f64,
    pub price_fit: f64,
    pub tag_overlap: f64,
}

impl ContentSignals {
    pub fn has_tag_match(&self) -> bool {
        self.tag_overlap > 0.0
    }
}

#[derive(Debug, Clone)]
pub struct ContentBasedScorer {
    config: ContentBasedConfig,
}

impl ContentBasedScorer {
    pub fn new(config: ContentBasedConfig) -> Self {
        Self { config }
    }

    pub fn signals(&self, behavior: &BehaviorProfile, search_terms: &[String], product: &Product) -> ContentSignals {
        let category_affinity = behavior.category_affinity(&product.category).clamp(0.0, 1.0);
        let price_fit = if behavior.price_range.contains(product.price) { 1.0 } else { 0.0 };

        let matched = search_terms
            .iter()
            .filter(|term| product.tags.iter().any(|tag| terms_overlap(term, tag)))
            .count();
        let tag_overlap = matched as f64 / search_terms.len().max(1) as f64;

        ContentSignals {
            category_affinity,
            price_fit,
            tag_overlap,
        }
    }

    pub fn combine(&self, signals: &ContentSignals) -> f64 {
        self.config.category_weight * signals.category_affinity
            + self.config.price_weight * signals.price_fit
            + self.config.tag_weight * signals.tag_overlap
    }

    fn reason(&self, signals: &ContentSignals, product: &Product) -> String {
        if signals.category_affinity > self.config.category_reason_threshold {
            format!("Matches your interest in {}", product.category)
        } else if signals.has_tag_match() {
            FEATURE_REASON.to_string()
        } else {
            INTEREST_REASON.to_string()
        }
    }
}

impl Scorer for ContentBasedScorer {
    fn algorithm(&self) -> Algorithm {
        Algorithm::ContentBased
    }

    fn score(&self, ctx: &ScoringContext<'_>) -> Vec<Recommendation> {
        let search_terms: Vec<String> = ctx
            .behavior
            .search_history
            .iter()
            .filter_map(|term| normalize_search_term(term))
            .collect();

        let mut recommendations: Vec<Recommendation> = ctx
            .candidates()
            .into_iter()
            .filter_map(|product| {
                let signals = self.signals(ctx.behavior, &search_terms, product);
                let score = self.combine(&signals);
                if score <= 0.0 || score < self.config.min_score {
                    return None;
                }
                let confidence = (score * 100.0).min(self.config.max_confidence);
                Some(Recommendation::new(
                    product,
                    score,
                    confidence,
                    self.reason(&signals, product),
                    Algorithm::ContentBased,
                ))
            })
            .collect();

        sort_ranked(&mut recommendations);
        debug!(
            count = recommendations.len(),
            search_terms = search_terms.len(),
            "Content-based scoring complete"
        );
        recommendations
    }
}
