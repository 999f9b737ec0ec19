use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecommendationError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),
}

pub type Result<T> = std::result::Result<T, RecommendationError>;

impl RecommendationError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }
}
