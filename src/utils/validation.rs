use crate::models::*;
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use tracing::warn;

pub fn validate_product(product: &Product) -> Result<()> {
    if product.id.trim().is_empty() {
        return Err(anyhow!("Product ID cannot be empty"));
    }

    if !product.price.is_finite() || product.price < 0.0 {
        return Err(anyhow!("Product price must be a non-negative number"));
    }

    if !product.rating.is_finite() || !(0.0..=5.0).contains(&product.rating) {
        return Err(anyhow!("Product rating must be between 0 and 5"));
    }

    if let Some(discount) = product.discount {
        if !(0.0..=100.0).contains(&discount) {
            return Err(anyhow!("Product discount must be between 0 and 100"));
        }
    }

    Ok(())
}

pub fn validate_behavior_profile(profile: &BehaviorProfile) -> Result<()> {
    validate_price_range(&profile.price_range)?;
    validate_affinities("category", profile.category_preferences.iter())?;
    validate_affinities("brand", profile.brand_preferences.iter())?;

    Ok(())
}

fn validate_price_range(range: &PriceRange) -> Result<()> {
    if !range.min.is_finite() || range.min < 0.0 {
        return Err(anyhow!("Price range minimum must be a non-negative number"));
    }

    if let Some(max) = range.max {
        if max.is_nan() || max < range.min {
            return Err(anyhow!("Price range maximum cannot be below its minimum"));
        }
    }

    Ok(())
}

fn validate_affinities<'a>(kind: &str, affinities: impl Iterator<Item = (&'a String, &'a f64)>) -> Result<()> {
    for (name, &weight) in affinities {
        if !(0.0..=1.0).contains(&weight) {
            return Err(anyhow!("{} affinity for '{}' must be within [0, 1]", kind, name));
        }
    }
    Ok(())
}

/// Copy of `profile` with unusable preference fields dropped or reset.
///
/// Interaction sets and search history are kept as-is, so products the
/// visitor already acted on stay excluded.
pub fn sanitize_behavior_profile(profile: &BehaviorProfile) -> BehaviorProfile {
    let mut sanitized = profile.clone();

    if let Err(e) = validate_price_range(&sanitized.price_range) {
        warn!("Resetting price range: {}", e);
        sanitized.price_range = PriceRange::default();
    }

    drop_invalid_affinities("category", &mut sanitized.category_preferences);
    drop_invalid_affinities("brand", &mut sanitized.brand_preferences);

    sanitized
}

fn drop_invalid_affinities(kind: &str, affinities: &mut HashMap<String, f64>) {
    affinities.retain(|name, weight| {
        let valid = (0.0..=1.0).contains(weight);
        if !valid {
            warn!("Dropping {} affinity for '{}': {} is outside [0, 1]", kind, name, weight);
        }
        valid
    });
}

/// Trimmed, lower-cased search term; `None` for blank input.
pub fn normalize_search_term(term: &str) -> Option<String> {
    let trimmed = term.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}
