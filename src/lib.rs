pub mod algorithms;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use error::{RecommendationError, Result};
pub use models::*;
pub use services::recommendation::RecommendationService;

pub fn init_tracing() {
    // A second call (tests, embedding callers) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
