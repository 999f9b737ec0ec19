use crate::models::*;
use crate::utils::mean;

/// Aggregate statistics over a finished recommendation list.
pub fn summarize(recommendations: &[Recommendation]) -> InsightsSummary {
    let mut summary = InsightsSummary {
        total_recommendations: recommendations.len(),
        ..Default::default()
    };

    for recommendation in recommendations {
        *summary
            .algorithm_distribution
            .entry(recommendation.algorithm)
            .or_insert(0) += 1;
        *summary
            .top_categories
            .entry(recommendation.product.category.clone())
            .or_insert(0) += 1;
    }

    let confidences: Vec<f64> = recommendations.iter().map(|r| r.confidence).collect();
    summary.average_confidence = mean(&confidences);

    let prices: Vec<f64> = recommendations.iter().map(|r| r.product.price).collect();
    summary.price_range = mean(&prices).map(|average| PriceSummary {
        min: prices.iter().copied().fold(f64::INFINITY, f64::min),
        max: prices.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        average,
    });

    summary
}
