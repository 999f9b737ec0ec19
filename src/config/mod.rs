use crate::error::{RecommendationError, Result};
use crate::models::Algorithm;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub recommendation: RecommendationConfig,
    pub similarity: SimilarityConfig,
    pub collaborative: CollaborativeConfig,
    pub content_based: ContentBasedConfig,
    pub trending: TrendingConfig,
    pub hybrid: HybridConfig,
    pub providers: ProvidersConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationConfig {
    pub default_limit: usize,
    /// Fill a short hybrid list with trending products.
    pub backfill_with_trending: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    pub purchase_overlap_weight: f64,
    pub wishlist_overlap_weight: f64,
    pub view_overlap_weight: f64,
    /// Raw overlap at which similarity reaches 0.5.
    pub saturation: f64,
    pub min_similarity: f64,
    pub max_profiles: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollaborativeConfig {
    pub purchase_weight: f64,
    pub wishlist_weight: f64,
    pub view_weight: f64,
    pub min_score: f64,
    pub max_confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentBasedConfig {
    pub category_weight: f64,
    pub price_weight: f64,
    pub tag_weight: f64,
    pub min_score: f64,
    pub max_confidence: f64,
    pub category_reason_threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendingConfig {
    /// Score drop from the first to the (virtual) N-th rank.
    pub decay_span: f64,
    pub max_confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HybridConfig {
    pub collaborative_weight: f64,
    pub content_based_weight: f64,
    pub trending_weight: f64,
    pub include_trending: bool,
    pub max_confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub fetch_timeout_ms: u64,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            backfill_with_trending: true,
        }
    }
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            purchase_overlap_weight: 3.0,
            wishlist_overlap_weight: 2.0,
            view_overlap_weight: 1.0,
            saturation: 2.0,
            min_similarity: 0.0,
            max_profiles: 10,
        }
    }
}

impl Default for CollaborativeConfig {
    fn default() -> Self {
        Self {
            purchase_weight: 0.8,
            wishlist_weight: 0.6,
            view_weight: 0.4,
            min_score: 0.3,
            max_confidence: 95.0,
        }
    }
}

impl Default for ContentBasedConfig {
    fn default() -> Self {
        Self {
            category_weight: 0.4,
            price_weight: 0.3,
            tag_weight: 0.3,
            min_score: 0.2,
            max_confidence: 90.0,
            category_reason_threshold: 0.5,
        }
    }
}

impl Default for TrendingConfig {
    fn default() -> Self {
        Self {
            decay_span: 0.5,
            max_confidence: 85.0,
        }
    }
}

impl Default for HybridConfig {
    fn default() -> Self {
        Self {
            collaborative_weight: 0.6,
            content_based_weight: 0.4,
            trending_weight: 0.2,
            include_trending: false,
            max_confidence: 95.0,
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self { fetch_timeout_ms: 2_000 }
    }
}

impl HybridConfig {
    pub fn weight_for(&self, algorithm: Algorithm) -> f64 {
        match algorithm {
            Algorithm::Collaborative => self.collaborative_weight,
            Algorithm::ContentBased => self.content_based_weight,
            Algorithm::Trending => self.trending_weight,
            Algorithm::Hybrid => 1.0,
        }
    }
}

impl ProvidersConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(
                config::Environment::with_prefix("SHOPREC")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let weights = [
            ("similarity.purchase_overlap_weight", self.similarity.purchase_overlap_weight),
            ("similarity.wishlist_overlap_weight", self.similarity.wishlist_overlap_weight),
            ("similarity.view_overlap_weight", self.similarity.view_overlap_weight),
            ("collaborative.purchase_weight", self.collaborative.purchase_weight),
            ("collaborative.wishlist_weight", self.collaborative.wishlist_weight),
            ("collaborative.view_weight", self.collaborative.view_weight),
            ("content_based.category_weight", self.content_based.category_weight),
            ("content_based.price_weight", self.content_based.price_weight),
            ("content_based.tag_weight", self.content_based.tag_weight),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(RecommendationError::invalid(format!("{} must be a non-negative number", name)));
            }
        }

        let fractions = [
            ("similarity.min_similarity", self.similarity.min_similarity),
            ("collaborative.min_score", self.collaborative.min_score),
            ("content_based.min_score", self.content_based.min_score),
            ("content_based.category_reason_threshold", self.content_based.category_reason_threshold),
            ("trending.decay_span", self.trending.decay_span),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(RecommendationError::invalid(format!("{} must be within [0, 1]", name)));
            }
        }

        let caps = [
            ("collaborative.max_confidence", self.collaborative.max_confidence),
            ("content_based.max_confidence", self.content_based.max_confidence),
            ("trending.max_confidence", self.trending.max_confidence),
            ("hybrid.max_confidence", self.hybrid.max_confidence),
        ];
        for (name, value) in caps {
            if !(0.0..=100.0).contains(&value) {
                return Err(RecommendationError::invalid(format!("{} must be within [0, 100]", name)));
            }
        }

        let blend = [
            ("hybrid.collaborative_weight", self.hybrid.collaborative_weight),
            ("hybrid.content_based_weight", self.hybrid.content_based_weight),
            ("hybrid.trending_weight", self.hybrid.trending_weight),
        ];
        for (name, value) in blend {
            if !value.is_finite() || value <= 0.0 {
                return Err(RecommendationError::invalid(format!("{} must be positive", name)));
            }
        }

        if !self.similarity.saturation.is_finite() || self.similarity.saturation <= 0.0 {
            return Err(RecommendationError::invalid("similarity.saturation must be positive"));
        }
        if self.recommendation.default_limit == 0 {
            return Err(RecommendationError::invalid("recommendation.default_limit must be positive"));
        }

        Ok(())
    }
}
