use crate::error::RecommendationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

pub mod fixtures;

pub type ProductId = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: f64,
    pub category: String,
    pub rating: f64,
    pub review_count: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
}

fn default_in_stock() -> bool {
    true
}

impl Product {
    pub fn new(id: impl Into<String>, title: impl Into<String>, price: f64, category: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            price,
            category: category.into(),
            rating: 0.0,
            review_count: 0,
            tags: Vec::new(),
            in_stock: true,
            discount: None,
            brand: None,
        }
    }

    pub fn with_rating(mut self, rating: f64, review_count: u32) -> Self {
        self.rating = rating;
        self.review_count = review_count;
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_discount(mut self, discount: f64) -> Self {
        self.discount = Some(discount);
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn out_of_stock(mut self) -> Self {
        self.in_stock = false;
        self
    }

    /// Catalog-intrinsic popularity: rating weighted by review volume.
    pub fn popularity(&self) -> f64 {
        self.rating * f64::from(self.review_count)
    }
}

/// Inclusive price window. `max = None` means unbounded above.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl Default for PriceRange {
    fn default() -> Self {
        Self { min: 0.0, max: None }
    }
}

impl PriceRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max: Some(max) }
    }

    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && self.max.map_or(true, |max| price <= max)
    }

    /// False for the default `[0, +inf)` window, which every product fits.
    pub fn is_bounded(&self) -> bool {
        self.min > 0.0 || self.max.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorProfile {
    pub viewed_product_ids: HashSet<ProductId>,
    pub purchased_product_ids: HashSet<ProductId>,
    pub wishlisted_product_ids: HashSet<ProductId>,
    pub carted_product_ids: HashSet<ProductId>,
    /// Free-text search terms, most recent last.
    pub search_history: Vec<String>,
    pub category_preferences: HashMap<String, f64>,
    pub price_range: PriceRange,
    pub brand_preferences: HashMap<String, f64>,
}

impl BehaviorProfile {
    pub fn with_viewed<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.viewed_product_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn with_purchased<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.purchased_product_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn with_wishlisted<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.wishlisted_product_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn with_carted<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.carted_product_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn with_searches<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_history.extend(terms.into_iter().map(Into::into));
        self
    }

    pub fn with_category_preference(mut self, category: impl Into<String>, affinity: f64) -> Self {
        self.category_preferences.insert(category.into(), affinity);
        self
    }

    pub fn with_brand_preference(mut self, brand: impl Into<String>, affinity: f64) -> Self {
        self.brand_preferences.insert(brand.into(), affinity);
        self
    }

    pub fn with_price_range(mut self, min: f64, max: f64) -> Self {
        self.price_range = PriceRange::new(min, max);
        self
    }

    /// Products the visitor already viewed or bought are never recommended back.
    pub fn has_acted_on(&self, product_id: &str) -> bool {
        self.viewed_product_ids.contains(product_id) || self.purchased_product_ids.contains(product_id)
    }

    /// Whether anything beyond the default profile can drive content matching.
    pub fn has_content_signals(&self) -> bool {
        !self.category_preferences.is_empty()
            || self.price_range.is_bounded()
            || self.search_history.iter().any(|term| !term.trim().is_empty())
    }

    pub fn category_affinity(&self, category: &str) -> f64 {
        self.category_preferences.get(category).copied().unwrap_or(0.0)
    }
}

/// A candidate peer supplied by the calling layer for similarity scoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeerProfile {
    pub id: String,
    pub viewed_product_ids: HashSet<ProductId>,
    pub purchased_product_ids: HashSet<ProductId>,
    pub wishlisted_product_ids: HashSet<ProductId>,
}

impl PeerProfile {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_viewed<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.viewed_product_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn with_purchased<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.purchased_product_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn with_wishlisted<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.wishlisted_product_ids.extend(ids.into_iter().map(Into::into));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarProfile {
    #[serde(flatten)]
    pub profile: PeerProfile,
    /// Independent weight in [0, 1]; weights across profiles need not sum to 1.
    pub similarity: f64,
}

impl SimilarProfile {
    pub fn new(profile: PeerProfile, similarity: f64) -> Self {
        Self { profile, similarity }
    }

    pub fn id(&self) -> &str {
        &self.profile.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    Collaborative,
    ContentBased,
    Hybrid,
    Trending,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Collaborative => "collaborative",
            Algorithm::ContentBased => "content-based",
            Algorithm::Hybrid => "hybrid",
            Algorithm::Trending => "trending",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strategy requested by the caller. `Auto` resolves to the hybrid path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlgorithmChoice {
    #[default]
    Auto,
    Collaborative,
    ContentBased,
    Hybrid,
    Trending,
}

impl AlgorithmChoice {
    pub fn resolve(self) -> Algorithm {
        match self {
            AlgorithmChoice::Auto | AlgorithmChoice::Hybrid => Algorithm::Hybrid,
            AlgorithmChoice::Collaborative => Algorithm::Collaborative,
            AlgorithmChoice::ContentBased => Algorithm::ContentBased,
            AlgorithmChoice::Trending => Algorithm::Trending,
        }
    }
}

impl FromStr for AlgorithmChoice {
    type Err = RecommendationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(AlgorithmChoice::Auto),
            "collaborative" => Ok(AlgorithmChoice::Collaborative),
            "content-based" => Ok(AlgorithmChoice::ContentBased),
            "hybrid" => Ok(AlgorithmChoice::Hybrid),
            "trending" => Ok(AlgorithmChoice::Trending),
            other => Err(RecommendationError::invalid(format!("unknown algorithm '{}'", other))),
        }
    }
}

/// Page the request originates from. Only the calling layer acts on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationContext {
    Cart,
    Wishlist,
    Search,
    Checkout,
}

impl RecommendationContext {
    /// Pre-filter applied by catalog providers before the pool reaches the engine.
    pub fn admits(&self, product: &Product) -> bool {
        match self {
            RecommendationContext::Cart | RecommendationContext::Checkout => product.in_stock,
            RecommendationContext::Wishlist | RecommendationContext::Search => true,
        }
    }
}

impl FromStr for RecommendationContext {
    type Err = RecommendationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cart" => Ok(RecommendationContext::Cart),
            "wishlist" => Ok(RecommendationContext::Wishlist),
            "search" => Ok(RecommendationContext::Search),
            "checkout" => Ok(RecommendationContext::Checkout),
            other => Err(RecommendationError::invalid(format!("unknown context '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationOptions {
    #[serde(default)]
    pub algorithm: AlgorithmChoice,
    #[serde(default)]
    pub category: Option<String>,
    pub limit: usize,
    #[serde(default)]
    pub context: Option<RecommendationContext>,
}

impl Default for RecommendationOptions {
    fn default() -> Self {
        Self {
            algorithm: AlgorithmChoice::Auto,
            category: None,
            limit: 10,
            context: None,
        }
    }
}

impl RecommendationOptions {
    pub fn new(algorithm: AlgorithmChoice, limit: usize) -> Self {
        Self {
            algorithm,
            limit,
            ..Default::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_context(mut self, context: RecommendationContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn validate(&self) -> crate::error::Result<()> {
        if self.limit == 0 {
            return Err(RecommendationError::invalid("limit must be a positive integer"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub product: Product,
    /// Ranking score, internal to the producing algorithm.
    #[serde(skip)]
    pub score: f64,
    pub confidence: f64,
    pub reason: String,
    pub algorithm: Algorithm,
}

impl Recommendation {
    pub fn new(product: &Product, score: f64, confidence: f64, reason: impl Into<String>, algorithm: Algorithm) -> Self {
        Self {
            product: product.clone(),
            score,
            confidence: crate::utils::clamp_confidence(confidence),
            reason: reason.into(),
            algorithm,
        }
    }

    pub fn product_id(&self) -> &str {
        &self.product.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSummary {
    pub min: f64,
    pub max: f64,
    pub average: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsightsSummary {
    pub total_recommendations: usize,
    /// `None` for an empty list.
    pub average_confidence: Option<f64>,
    pub algorithm_distribution: BTreeMap<Algorithm, usize>,
    pub top_categories: BTreeMap<String, usize>,
    pub price_range: Option<PriceSummary>,
}

impl InsightsSummary {
    /// Most frequent categories first, ties alphabetical.
    pub fn leading_categories(&self, n: usize) -> Vec<(&str, usize)> {
        let mut categories: Vec<(&str, usize)> = self
            .top_categories
            .iter()
            .map(|(category, count)| (category.as_str(), *count))
            .collect();
        categories.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        categories.truncate(n);
        categories
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub algorithm: Algorithm,
    pub recommendations: Vec<Recommendation>,
    pub insights: InsightsSummary,
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algorithm_choice_parsing() {
        assert_eq!("auto".parse::<AlgorithmChoice>().unwrap(), AlgorithmChoice::Auto);
        assert_eq!(" Content-Based ".parse::<AlgorithmChoice>().unwrap(), AlgorithmChoice::ContentBased);
        assert_eq!(AlgorithmChoice::Auto.resolve(), Algorithm::Hybrid);

        let err = "popular".parse::<AlgorithmChoice>().unwrap_err();
        assert!(matches!(err, RecommendationError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_algorithm_serde_names() {
        assert_eq!(serde_json::to_string(&Algorithm::ContentBased).unwrap(), "\"content-based\"");
        let choice: AlgorithmChoice = serde_json::from_str("\"trending\"").unwrap();
        assert_eq!(choice, AlgorithmChoice::Trending);
    }

    #[test]
    fn test_price_range_contains() {
        let unbounded = PriceRange::default();
        assert!(unbounded.contains(0.0));
        assert!(unbounded.contains(1_000_000.0));

        let range = PriceRange::new(100.0, 200.0);
        assert!(range.contains(100.0));
        assert!(range.contains(200.0));
        assert!(!range.contains(99.99));
        assert!(!range.contains(200.01));
    }

    #[test]
    fn test_behavior_exclusions() {
        let behavior = BehaviorProfile::default()
            .with_viewed(["1"])
            .with_purchased(["2"])
            .with_wishlisted(["3"]);
        assert!(behavior.has_acted_on("1"));
        assert!(behavior.has_acted_on("2"));
        assert!(!behavior.has_acted_on("3"));
    }

    #[test]
    fn test_content_signals() {
        assert!(!BehaviorProfile::default().has_content_signals());
        assert!(!BehaviorProfile::default().with_viewed(["1"]).with_searches(["  "]).has_content_signals());
        assert!(BehaviorProfile::default().with_searches(["lamp"]).has_content_signals());
        assert!(BehaviorProfile::default().with_price_range(0.0, 50.0).has_content_signals());
        assert!(BehaviorProfile::default().with_category_preference("home", 0.1).has_content_signals());
    }

    #[test]
    fn test_options_validation() {
        assert!(RecommendationOptions::default().validate().is_ok());
        let err = RecommendationOptions::new(AlgorithmChoice::Trending, 0).validate().unwrap_err();
        assert!(matches!(err, RecommendationError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_context_admits() {
        let sold_out = Product::new("9", "Sold out", 10.0, "misc").out_of_stock();
        assert!(!RecommendationContext::Checkout.admits(&sold_out));
        assert!(!RecommendationContext::Cart.admits(&sold_out));
        assert!(RecommendationContext::Search.admits(&sold_out));
        assert!("wishlist".parse::<RecommendationContext>().is_ok());
        assert!("homepage".parse::<RecommendationContext>().is_err());
    }

    #[test]
    fn test_score_not_serialized() {
        let product = Product::new("1", "Widget", 5.0, "misc");
        let rec = Recommendation::new(&product, 0.42, 42.0, "because", Algorithm::Trending);
        let json = serde_json::to_value(&rec).unwrap();
        assert!(json.get("score").is_none());
        assert_eq!(json["algorithm"], "trending");
    }
}
