use crate::algorithms::*;
use crate::config::Config;
use crate::error::{RecommendationError, Result};
use crate::models::*;
use crate::services::insights;
use crate::services::providers::{BehaviorProvider, CatalogProvider};
use crate::utils::validation::{sanitize_behavior_profile, validate_behavior_profile};
use crate::utils::with_timeout;
use chrono::Utc;
use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Selects a strategy, filters, truncates and summarizes. Holds no per-request state.
pub struct RecommendationService {
    config: Arc<Config>,
    similarity: SimilarityFinder,
    collaborative: CollaborativeScorer,
    content_based: ContentBasedScorer,
    trending: TrendingScorer,
    hybrid: HybridScorer,
}

impl RecommendationService {
    pub fn new(config: Arc<Config>) -> Result<Self> {
        config.validate()?;

        let collaborative = CollaborativeScorer::new(config.collaborative.clone());
        let content_based = ContentBasedScorer::new(config.content_based.clone());
        let trending = TrendingScorer::new(config.trending.clone());
        let hybrid = HybridScorer::new(
            collaborative.clone(),
            content_based.clone(),
            trending.clone(),
            config.hybrid.clone(),
        );

        Ok(Self {
            similarity: SimilarityFinder::new(config.similarity.clone()),
            collaborative,
            content_based,
            trending,
            hybrid,
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn scorer(&self, algorithm: Algorithm) -> &dyn Scorer {
        match algorithm {
            Algorithm::Collaborative => &self.collaborative,
            Algorithm::ContentBased => &self.content_based,
            Algorithm::Trending => &self.trending,
            Algorithm::Hybrid => &self.hybrid,
        }
    }

    /// Pure scoring pass over already-fetched inputs.
    pub fn recommend(
        &self,
        catalog: &[Product],
        behavior: Option<&BehaviorProfile>,
        peers: &[PeerProfile],
        options: &RecommendationOptions,
    ) -> Result<RecommendationResult> {
        options.validate()?;

        let behavior: Cow<'_, BehaviorProfile> = match behavior {
            Some(profile) => match validate_behavior_profile(profile) {
                Ok(()) => Cow::Borrowed(profile),
                Err(e) => {
                    warn!("Repairing invalid behavior profile: {}", e);
                    Cow::Owned(sanitize_behavior_profile(profile))
                }
            },
            None => {
                debug!("No behavior profile, using the default profile");
                Cow::Owned(BehaviorProfile::default())
            }
        };
        let behavior: &BehaviorProfile = &behavior;

        let similar_profiles = self.similarity.find_similar(Some(behavior), peers);
        let ctx = ScoringContext::new(catalog, behavior, &similar_profiles);

        let algorithm = options.algorithm.resolve();
        let mut recommendations = self.scorer(algorithm).score(&ctx);

        if let Some(category) = &options.category {
            recommendations.retain(|r| &r.product.category == category);
        }

        if algorithm == Algorithm::Hybrid
            && self.config.recommendation.backfill_with_trending
            && recommendations.len() < options.limit
        {
            self.backfill_with_trending(&ctx, options, &mut recommendations);
        }

        recommendations.truncate(options.limit);
        let insights = insights::summarize(&recommendations);

        info!(
            algorithm = %algorithm,
            catalog = catalog.len(),
            similar_profiles = similar_profiles.len(),
            returned = recommendations.len(),
            "Recommendations generated"
        );

        Ok(RecommendationResult {
            algorithm,
            recommendations,
            insights,
            generated_at: Utc::now(),
        })
    }

    fn backfill_with_trending(
        &self,
        ctx: &ScoringContext<'_>,
        options: &RecommendationOptions,
        recommendations: &mut Vec<Recommendation>,
    ) {
        let mut present: HashSet<ProductId> = recommendations.iter().map(|r| r.product.id.clone()).collect();
        let before = recommendations.len();

        for candidate in self.trending.score(ctx) {
            if recommendations.len() >= options.limit {
                break;
            }
            if let Some(category) = &options.category {
                if &candidate.product.category != category {
                    continue;
                }
            }
            if present.insert(candidate.product.id.clone()) {
                recommendations.push(candidate);
            }
        }

        debug!(added = recommendations.len() - before, "Backfilled with trending products");
    }

    /// Fetches catalog, behavior and peers concurrently, then scores.
    ///
    /// Behavior and peer failures degrade to the default profile and an empty
    /// pool; a catalog failure is reported as `CatalogUnavailable`.
    pub async fn recommend_for<C, B>(
        &self,
        catalog_provider: &C,
        behavior_provider: &B,
        visitor_id: Option<&str>,
        options: &RecommendationOptions,
    ) -> Result<RecommendationResult>
    where
        C: CatalogProvider + ?Sized,
        B: BehaviorProvider + ?Sized,
    {
        options.validate()?;
        let timeout = self.config.providers.fetch_timeout();

        let catalog_fetch = with_timeout(catalog_provider.fetch_catalog(options.context), timeout, "catalog fetch");
        let behavior_fetch = async {
            match visitor_id {
                Some(id) => with_timeout(behavior_provider.fetch_behavior(id), timeout, "behavior fetch").await,
                None => Ok(None),
            }
        };
        let peers_fetch = async {
            match visitor_id {
                Some(id) => with_timeout(behavior_provider.fetch_peers(id), timeout, "peer fetch").await,
                None => Ok(Vec::new()),
            }
        };

        let (catalog, behavior, peers) = tokio::join!(catalog_fetch, behavior_fetch, peers_fetch);

        let catalog = catalog.map_err(|e| RecommendationError::CatalogUnavailable(e.to_string()))?;
        let behavior = behavior.unwrap_or_else(|e| {
            warn!("Behavior unavailable, falling back to the default profile: {}", e);
            None
        });
        let peers = peers.unwrap_or_else(|e| {
            warn!("Peer profiles unavailable, collaborative signals disabled: {}", e);
            Vec::new()
        });

        self.recommend(&catalog, behavior.as_ref(), &peers, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::{sample_behavior, sample_catalog, sample_peers};
    use crate::services::providers::{StaticBehaviorStore, StaticCatalog};
    use async_trait::async_trait;

    fn service() -> RecommendationService {
        RecommendationService::new(Arc::new(Config::default())).unwrap()
    }

    fn ids(result: &RecommendationResult) -> Vec<&str> {
        result.recommendations.iter().map(|r| r.product_id()).collect()
    }

    #[test]
    fn test_rejects_zero_limit() {
        let options = RecommendationOptions::new(AlgorithmChoice::Trending, 0);
        let err = service().recommend(&sample_catalog(), None, &[], &options).unwrap_err();
        assert!(matches!(err, RecommendationError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_rejects_invalid_engine_config() {
        let mut config = Config::default();
        config.content_based.min_score = -0.1;
        assert!(RecommendationService::new(Arc::new(config)).is_err());
    }

    #[test]
    fn test_category_filter_applies_after_scoring() {
        let options = RecommendationOptions::new(AlgorithmChoice::Trending, 10).with_category("electronics");
        let result = service().recommend(&sample_catalog(), None, &[], &options).unwrap();
        assert_eq!(ids(&result), vec!["2", "1", "3"]);
        // Ranks were assigned over the whole catalog, not the filtered slice.
        assert!((result.recommendations[2].score - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_hybrid_backfills_with_trending() {
        // A narrow budget leaves content-based with a single product.
        let behavior = BehaviorProfile::default()
            .with_price_range(0.0, 100.0)
            .with_category_preference("home", 0.2);
        let options = RecommendationOptions::new(AlgorithmChoice::Auto, 3);
        let result = service().recommend(&sample_catalog(), Some(&behavior), &[], &options).unwrap();

        assert_eq!(ids(&result), vec!["4", "2", "1"]);
        assert_eq!(result.recommendations[0].algorithm, Algorithm::Hybrid);
        assert_eq!(result.recommendations[1].algorithm, Algorithm::Trending);
        assert_eq!(result.insights.algorithm_distribution[&Algorithm::Trending], 2);
    }

    #[test]
    fn test_backfill_disabled() {
        let mut config = Config::default();
        config.recommendation.backfill_with_trending = false;
        let service = RecommendationService::new(Arc::new(config)).unwrap();

        let behavior = BehaviorProfile::default().with_price_range(0.0, 100.0).with_category_preference("home", 0.2);
        let options = RecommendationOptions::new(AlgorithmChoice::Hybrid, 3);
        let result = service.recommend(&sample_catalog(), Some(&behavior), &[], &options).unwrap();
        assert_eq!(ids(&result), vec!["4"]);
    }

    #[test]
    fn test_invalid_behavior_keeps_exclusions() {
        let behavior = BehaviorProfile::default()
            .with_viewed(["2"])
            .with_purchased(["1"])
            .with_price_range(900.0, 10.0)
            .with_brand_preference("Acme", 1.5);
        let options = RecommendationOptions::new(AlgorithmChoice::Trending, 5);
        let result = service().recommend(&sample_catalog(), Some(&behavior), &[], &options).unwrap();
        assert_eq!(ids(&result), vec!["3", "5", "4"]);
    }

    #[test]
    fn test_invalid_behavior_keeps_valid_preferences() {
        // The out-of-range sports affinity is dropped; electronics still drives content matching.
        let behavior = BehaviorProfile::default()
            .with_viewed(["1"])
            .with_category_preference("electronics", 0.9)
            .with_category_preference("sports", 3.0);
        let options = RecommendationOptions::new(AlgorithmChoice::ContentBased, 2);
        let result = service().recommend(&sample_catalog(), Some(&behavior), &[], &options).unwrap();
        assert_eq!(ids(&result), vec!["2", "3"]);
        assert!((result.recommendations[0].score - 0.66).abs() < 1e-9);
    }

    #[test]
    fn test_anonymous_auto_degrades_to_trending() {
        let options = RecommendationOptions::new(AlgorithmChoice::Auto, 3);
        let result = service().recommend(&sample_catalog(), None, &sample_peers(), &options).unwrap();
        assert_eq!(result.algorithm, Algorithm::Hybrid);
        assert_eq!(ids(&result), vec!["2", "1", "3"]);
        assert_eq!(result.insights.algorithm_distribution[&Algorithm::Trending], 3);
    }

    #[test]
    fn test_collaborative_with_peers() {
        let options = RecommendationOptions::new(AlgorithmChoice::Collaborative, 5);
        let result = service()
            .recommend(&sample_catalog(), Some(&sample_behavior()), &sample_peers(), &options)
            .unwrap();
        // peer-audio (0.6) bought 2 and wishlisted 3; peer-runner (1/3) buying 5 stays under the floor.
        assert_eq!(ids(&result), vec!["2", "3"]);
        assert!((result.recommendations[0].score - 0.48).abs() < 1e-9);
        assert!((result.recommendations[1].score - 0.36).abs() < 1e-9);
    }

    struct FailingBehavior;

    #[async_trait]
    impl BehaviorProvider for FailingBehavior {
        async fn fetch_behavior(&self, _visitor_id: &str) -> anyhow::Result<Option<BehaviorProfile>> {
            Err(anyhow::anyhow!("profile service down"))
        }

        async fn fetch_peers(&self, _visitor_id: &str) -> anyhow::Result<Vec<PeerProfile>> {
            Err(anyhow::anyhow!("profile service down"))
        }
    }

    struct FailingCatalog;

    #[async_trait]
    impl CatalogProvider for FailingCatalog {
        async fn fetch_catalog(&self, _context: Option<RecommendationContext>) -> anyhow::Result<Vec<Product>> {
            Err(anyhow::anyhow!("catalog service down"))
        }
    }

    #[tokio::test]
    async fn test_recommend_for_degrades_when_behavior_fails() {
        let catalog = StaticCatalog::new(sample_catalog());
        let options = RecommendationOptions::new(AlgorithmChoice::Trending, 3);
        let result = service()
            .recommend_for(&catalog, &FailingBehavior, Some("visitor-1"), &options)
            .await
            .unwrap();
        assert_eq!(ids(&result), vec!["2", "1", "3"]);
    }

    #[tokio::test]
    async fn test_recommend_for_reports_catalog_failure() {
        let options = RecommendationOptions::default();
        let err = service()
            .recommend_for(&FailingCatalog, &StaticBehaviorStore::new(), None, &options)
            .await
            .unwrap_err();
        assert!(matches!(err, RecommendationError::CatalogUnavailable(_)));
    }

    #[tokio::test]
    async fn test_recommend_for_uses_visitor_behavior() {
        let catalog = StaticCatalog::new(sample_catalog());
        let store = StaticBehaviorStore::new()
            .with_profile("visitor-1", sample_behavior())
            .with_peers(sample_peers());
        let options = RecommendationOptions::new(AlgorithmChoice::Auto, 10);

        let result = service()
            .recommend_for(&catalog, &store, Some("visitor-1"), &options)
            .await
            .unwrap();
        assert!(result.recommendations.iter().all(|r| r.product_id() != "1"));
        assert_eq!(result.recommendations[0].product_id(), "2");
    }
}
