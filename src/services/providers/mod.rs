//! Calling-layer sources for the catalog and visitor behavior.
//!
//! The engine itself never performs I/O; these providers are what the service's
//! async entry point fetches from before scoring begins.

use crate::models::*;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::warn;

#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Products eligible for the given page context.
    async fn fetch_catalog(&self, context: Option<RecommendationContext>) -> Result<Vec<Product>>;
}

#[async_trait]
pub trait BehaviorProvider: Send + Sync {
    /// `Ok(None)` for visitors without recorded behavior.
    async fn fetch_behavior(&self, visitor_id: &str) -> Result<Option<BehaviorProfile>>;

    async fn fetch_peers(&self, visitor_id: &str) -> Result<Vec<PeerProfile>>;
}

fn admit_for_context(products: Vec<Product>, context: Option<RecommendationContext>) -> Vec<Product> {
    match context {
        Some(context) => products.into_iter().filter(|p| context.admits(p)).collect(),
        None => products,
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    products: Vec<Product>,
}

impl StaticCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }
}

#[async_trait]
impl CatalogProvider for StaticCatalog {
    async fn fetch_catalog(&self, context: Option<RecommendationContext>) -> Result<Vec<Product>> {
        Ok(admit_for_context(self.products.clone(), context))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StaticBehaviorStore {
    profiles: HashMap<String, BehaviorProfile>,
    peers: Vec<PeerProfile>,
}

impl StaticBehaviorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(mut self, visitor_id: impl Into<String>, profile: BehaviorProfile) -> Self {
        self.profiles.insert(visitor_id.into(), profile);
        self
    }

    pub fn with_peers(mut self, peers: Vec<PeerProfile>) -> Self {
        self.peers = peers;
        self
    }
}

#[async_trait]
impl BehaviorProvider for StaticBehaviorStore {
    async fn fetch_behavior(&self, visitor_id: &str) -> Result<Option<BehaviorProfile>> {
        Ok(self.profiles.get(visitor_id).cloned())
    }

    async fn fetch_peers(&self, visitor_id: &str) -> Result<Vec<PeerProfile>> {
        Ok(self
            .peers
            .iter()
            .filter(|peer| peer.id != visitor_id)
            .cloned()
            .collect())
    }
}

/// A JSON array of products. Entries that fail to decode are skipped.
#[derive(Debug, Clone)]
pub struct JsonFileCatalog {
    path: PathBuf,
}

impl JsonFileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogProvider for JsonFileCatalog {
    async fn fetch_catalog(&self, context: Option<RecommendationContext>) -> Result<Vec<Product>> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read catalog {}", self.path.display()))?;
        let entries: Vec<serde_json::Value> = serde_json::from_str(&raw)
            .with_context(|| format!("Catalog {} is not a JSON array", self.path.display()))?;

        let products = entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value::<Product>(entry) {
                Ok(product) => Some(product),
                Err(e) => {
                    warn!(index, "Skipping undecodable catalog entry: {}", e);
                    None
                }
            })
            .collect();

        Ok(admit_for_context(products, context))
    }
}

/// A JSON document `{ "profiles": { "<visitor>": {...} }, "peers": [...] }`.
#[derive(Debug, Clone)]
pub struct JsonFileBehavior {
    path: PathBuf,
}

impl JsonFileBehavior {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn load(&self) -> Result<StaticBehaviorStore> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read behavior file {}", self.path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("Invalid behavior file {}", self.path.display()))
    }
}

#[async_trait]
impl BehaviorProvider for JsonFileBehavior {
    async fn fetch_behavior(&self, visitor_id: &str) -> Result<Option<BehaviorProfile>> {
        let store = self.load().await?;
        store.fetch_behavior(visitor_id).await
    }

    async fn fetch_peers(&self, visitor_id: &str) -> Result<Vec<PeerProfile>> {
        let store = self.load().await?;
        store.fetch_peers(visitor_id).await
    }
}
