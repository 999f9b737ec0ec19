use crate::models::Recommendation;
use anyhow::{anyhow, Result};
use std::cmp::Ordering;
use std::future::Future;
use std::time::Duration;

pub mod validation;

/// Confidence is always a finite value in [0, 100].
pub fn clamp_confidence(confidence: f64) -> f64 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 100.0)
    }
}

/// Descending by score, ties broken by product id.
pub fn compare_ranked(a: &Recommendation, b: &Recommendation) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.product.id.cmp(&b.product.id))
}

pub fn sort_ranked(recommendations: &mut [Recommendation]) {
    recommendations.sort_by(compare_ranked);
}

/// Weighted mean of `(value, weight)` pairs; `None` when no weight is present.
pub fn weighted_mean(pairs: &[(f64, f64)]) -> Option<f64> {
    let total_weight: f64 = pairs.iter().map(|(_, weight)| weight).sum();
    if total_weight <= 0.0 {
        return None;
    }

    let weighted_sum: f64 = pairs.iter().map(|(value, weight)| value * weight).sum();
    Some(weighted_sum / total_weight)
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Case-insensitive substring match in either direction.
pub fn terms_overlap(term: &str, tag: &str) -> bool {
    let term = term.to_lowercase();
    let tag = tag.to_lowercase();
    !term.is_empty() && !tag.is_empty() && (term.contains(&tag) || tag.contains(&term))
}

pub async fn with_timeout<F, T>(operation: F, timeout: Duration, what: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, operation).await {
        Ok(result) => result,
        Err(_) => Err(anyhow!("{} timed out after {:?}", what, timeout)),
    }
}
