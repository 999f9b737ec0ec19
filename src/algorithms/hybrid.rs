use super::{CollaborativeScorer, ContentBasedScorer, ScoringContext, Scorer, TrendingScorer};
use crate::config::HybridConfig;
use crate::models::*;
use crate::utils::{mean, sort_ranked, weighted_mean};
use std::collections::BTreeMap;
use tracing::debug;

/// Fuses several ranked lists into one by product id.
///
/// Each contribution is weighted by the role of the algorithm that produced it,
/// so the blend does not depend on the order sources are merged in.
#[derive(Debug, Clone)]
pub struct HybridCombiner {
    config: HybridConfig,
}

struct Blend {
    product: Product,
    scores: Vec<(f64, f64)>,
    confidences: Vec<f64>,
    reasons: Vec<String>,
}

impl HybridCombiner {
    pub fn new(config: HybridConfig) -> Self {
        Self { config }
    }

    pub fn combine(&self, sources: Vec<Vec<Recommendation>>) -> Vec<Recommendation> {
        let mut blends: BTreeMap<ProductId, Blend> = BTreeMap::new();

        for recommendation in sources.into_iter().flatten() {
            let weight = self.config.weight_for(recommendation.algorithm);
            let Recommendation {
                product,
                score,
                confidence,
                reason,
                ..
            } = recommendation;

            let blend = blends.entry(product.id.clone()).or_insert_with(|| Blend {
                product,
                scores: Vec::new(),
                confidences: Vec::new(),
                reasons: Vec::new(),
            });
            blend.scores.push((score, weight));
            blend.confidences.push(confidence);
            if !reason.is_empty() && !blend.reasons.contains(&reason) {
                blend.reasons.push(reason);
            }
        }

        let mut combined: Vec<Recommendation> = blends
            .into_values()
            .map(|blend| {
                let score = weighted_mean(&blend.scores)
                    .unwrap_or_else(|| blend.scores.iter().map(|(score, _)| score).sum());
                let confidence = mean(&blend.confidences)
                    .unwrap_or(0.0)
                    .min(self.config.max_confidence);
                Recommendation::new(
                    &blend.product,
                    score,
                    confidence,
                    blend.reasons.join(" and "),
                    Algorithm::Hybrid,
                )
            })
            .collect();

        sort_ranked(&mut combined);
        combined
    }
}

/// Collaborative plus content-based, optionally with trending folded in.
#[derive(Debug, Clone)]
pub struct HybridScorer {
    collaborative: CollaborativeScorer,
    content_based: ContentBasedScorer,
    trending: TrendingScorer,
    combiner: HybridCombiner,
    include_trending: bool,
}

impl HybridScorer {
    pub fn new(
        collaborative: CollaborativeScorer,
        content_based: ContentBasedScorer,
        trending: TrendingScorer,
        config: HybridConfig,
    ) -> Self {
        let include_trending = config.include_trending;
        Self {
            collaborative,
            content_based,
            trending,
            combiner: HybridCombiner::new(config),
            include_trending,
        }
    }
}

impl Scorer for HybridScorer {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Hybrid
    }

    fn score(&self, ctx: &ScoringContext<'_>) -> Vec<Recommendation> {
        let mut sources = vec![self.collaborative.score(ctx)];
        // A bare default profile matches every product on price alone.
        if ctx.behavior.has_content_signals() {
            sources.push(self.content_based.score(ctx));
        }
        if self.include_trending {
            sources.push(self.trending.score(ctx));
        }

        let source_sizes: Vec<usize> = sources.iter().map(Vec::len).collect();
        let combined = self.combiner.combine(sources);
        debug!(?source_sizes, count = combined.len(), "Hybrid blend complete");
        combined
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::fixtures::sample_catalog;

    fn rec(id: &str, score: f64, confidence: f64, reason: &str, algorithm: Algorithm) -> Recommendation {
        let product = Product::new(id, format!("Product {}", id), 10.0, "misc");
        Recommendation::new(&product, score, confidence, reason, algorithm)
    }

    fn sources() -> (Vec<Recommendation>, Vec<Recommendation>) {
        let collaborative = vec![
            rec("2", 0.92, 92.0, "similar users", Algorithm::Collaborative),
            rec("4", 0.54, 54.0, "similar users", Algorithm::Collaborative),
            rec("5", 0.40, 40.0, "similar users", Algorithm::Collaborative),
        ];
        let content = vec![
            rec("2", 0.81, 81.0, "category match", Algorithm::ContentBased),
            rec("1", 0.66, 66.0, "category match", Algorithm::ContentBased),
            rec("5", 0.57, 57.0, "feature match", Algorithm::ContentBased),
            rec("3", 0.36, 36.0, "category match", Algorithm::ContentBased),
        ];
        (collaborative, content)
    }

    #[test]
    fn test_combine_blends_shared_products() {
        let (collaborative, content) = sources();
        let combined = HybridCombiner::new(HybridConfig::default()).combine(vec![collaborative, content]);

        let ids: Vec<&str> = combined.iter().map(|r| r.product_id()).collect();
        assert_eq!(ids, vec!["2", "1", "4", "5", "3"]);
        assert!(combined.iter().all(|r| r.algorithm == Algorithm::Hybrid));

        let headphones = &combined[0];
        assert!((headphones.score - 0.876).abs() < 1e-9);
        assert!((headphones.confidence - 86.5).abs() < 1e-9);
        assert_eq!(headphones.reason, "similar users and category match");
        assert!(headphones.score > 0.81 && headphones.score < 0.92);

        // Single-source entries keep their score and confidence.
        let coffee = combined.iter().find(|r| r.product_id() == "4").unwrap();
        assert!((coffee.score - 0.54).abs() < 1e-12);
        assert_eq!(coffee.confidence, 54.0);
        assert_eq!(coffee.reason, "similar users");
    }

    #[test]
    fn test_combine_is_order_independent() {
        let (collaborative, content) = sources();
        let combiner = HybridCombiner::new(HybridConfig::default());
        let forward = combiner.combine(vec![collaborative.clone(), content.clone()]);
        let backward = combiner.combine(vec![content, collaborative]);

        for (a, b) in forward.iter().zip(backward.iter()) {
            assert_eq!(a.product_id(), b.product_id());
            assert!((a.score - b.score).abs() < 1e-12);
            assert_eq!(a.confidence, b.confidence);
        }
    }

    #[test]
    fn test_confidence_capped() {
        let combined = HybridCombiner::new(HybridConfig::default()).combine(vec![
            vec![rec("1", 1.2, 100.0, "a", Algorithm::Collaborative)],
            vec![rec("1", 0.9, 98.0, "b", Algorithm::ContentBased)],
        ]);
        assert_eq!(combined[0].confidence, 95.0);
    }

    #[test]
    fn test_hybrid_scorer_with_trending() {
        let catalog = sample_catalog();
        let behavior = BehaviorProfile::default();
        let ctx = ScoringContext::new(&catalog, &behavior, &[]);
        let config = Config::default();

        let build = |include_trending: bool| {
            let mut hybrid = config.hybrid.clone();
            hybrid.include_trending = include_trending;
            HybridScorer::new(
                CollaborativeScorer::new(config.collaborative.clone()),
                ContentBasedScorer::new(config.content_based.clone()),
                TrendingScorer::new(config.trending.clone()),
                hybrid,
            )
        };

        // Without peers or preferences there is nothing to blend.
        assert!(build(false).score(&ctx).is_empty());

        let with_trending = build(true).score(&ctx);
        let ids: Vec<&str> = with_trending.iter().map(|r| r.product_id()).collect();
        assert_eq!(ids, vec!["2", "1", "3", "5", "4"]);
    }

    #[test]
    fn test_hybrid_scorer_uses_content_with_preferences() {
        let catalog = sample_catalog();
        let behavior = BehaviorProfile::default().with_price_range(0.0, 100.0);
        let ctx = ScoringContext::new(&catalog, &behavior, &[]);
        let config = Config::default();

        let recs = HybridScorer::new(
            CollaborativeScorer::new(config.collaborative.clone()),
            ContentBasedScorer::new(config.content_based.clone()),
            TrendingScorer::new(config.trending.clone()),
            config.hybrid.clone(),
        )
        .score(&ctx);
        let ids: Vec<&str> = recs.iter().map(|r| r.product_id()).collect();
        assert_eq!(ids, vec!["4"]);
        assert_eq!(recs[0].algorithm, Algorithm::Hybrid);
    }

    #[test]
    fn test_combine_accepts_blended_entries() {
        let combined = HybridCombiner::new(HybridConfig::default()).combine(vec![
            vec![rec("1", 0.5, 50.0, "earlier blend", Algorithm::Hybrid)],
            vec![rec("1", 0.8, 80.0, "similar users", Algorithm::Collaborative)],
        ]);
        // Weights 1.0 and 0.6: (0.5 + 0.48) / 1.6
        assert!((combined[0].score - 0.6125).abs() < 1e-9);
        assert_eq!(combined[0].reason, "earlier blend and similar users");
    }
}
