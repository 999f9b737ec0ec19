//! Deterministic sample data for tests, benchmarks and the demo binary.

use super::{BehaviorProfile, PeerProfile, Product};

/// The five-product reference catalog.
///
/// Popularity (rating x reviews): 2 = 1100.8, 1 = 576.0, 3 = 427.2, 5 = 308.2, 4 = 184.5.
pub fn sample_catalog() -> Vec<Product> {
    vec![
        Product::new("1", "Smartphone X", 699.0, "electronics")
            .with_rating(4.5, 128)
            .with_tags(["smartphone", "5g", "camera"])
            .with_brand("Acme"),
        Product::new("2", "Wireless Headphones", 199.99, "electronics")
            .with_rating(4.3, 256)
            .with_tags(["audio", "wireless", "noise-cancelling"])
            .with_brand("Sonic"),
        Product::new("3", "Ultrabook Laptop", 1299.0, "electronics")
            .with_rating(4.8, 89)
            .with_tags(["laptop", "portable", "work"])
            .with_brand("Acme"),
        Product::new("4", "Coffee Maker", 89.5, "home")
            .with_rating(4.1, 45)
            .with_tags(["kitchen", "coffee"])
            .with_discount(15.0),
        Product::new("5", "Running Shoes", 129.0, "sports")
            .with_rating(4.6, 67)
            .with_tags(["running", "fitness", "shoes"])
            .with_brand("Stride"),
    ]
}

/// A shopper who browses electronics within a mid-range budget.
pub fn sample_behavior() -> BehaviorProfile {
    BehaviorProfile::default()
        .with_viewed(["1"])
        .with_wishlisted(["3"])
        .with_searches(["wireless", "running"])
        .with_category_preference("electronics", 0.9)
        .with_category_preference("sports", 0.3)
        .with_brand_preference("Acme", 0.7)
        .with_price_range(100.0, 800.0)
}

pub fn sample_peers() -> Vec<PeerProfile> {
    vec![
        PeerProfile::new("peer-audio")
            .with_viewed(["1", "2"])
            .with_wishlisted(["3"])
            .with_purchased(["2"]),
        PeerProfile::new("peer-runner")
            .with_viewed(["1", "5"])
            .with_purchased(["5"]),
        PeerProfile::new("peer-kitchen").with_purchased(["4"]),
    ]
}
