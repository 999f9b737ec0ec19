use shoprec::models::fixtures::{sample_behavior, sample_catalog, sample_peers};
use shoprec::services::providers::{StaticBehaviorStore, StaticCatalog};
use shoprec::*;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    println!("Shoprec basic usage");

    // 1. Engine with reference defaults
    let service = RecommendationService::new(Arc::new(Config::default()))?;

    // 2. Calling-layer providers backed by the sample data
    let catalog = StaticCatalog::new(sample_catalog());
    let behavior = StaticBehaviorStore::new()
        .with_profile("visitor-1", sample_behavior())
        .with_peers(sample_peers());

    // 3. One request per strategy
    for algorithm in ["auto", "collaborative", "content-based", "trending"] {
        let options = RecommendationOptions::new(algorithm.parse()?, 3);
        let result = service
            .recommend_for(&catalog, &behavior, Some("visitor-1"), &options)
            .await?;

        println!("\n[{}] resolved to {}", algorithm, result.algorithm);
        for rec in &result.recommendations {
            println!(
                "  {:<22} confidence {:>5.1}  ({})",
                rec.product.title, rec.confidence, rec.reason
            );
        }
        if let Some(average) = result.insights.average_confidence {
            println!("  average confidence {:.1}", average);
        }
    }

    // 4. An anonymous visitor falls back to the default profile
    let options = RecommendationOptions::new(AlgorithmChoice::Trending, 3).with_category("electronics");
    let result = service.recommend_for(&catalog, &behavior, None, &options).await?;
    println!("\nAnonymous electronics picks:");
    for rec in &result.recommendations {
        println!("  {} ({})", rec.product.title, rec.reason);
    }

    Ok(())
}
