//! Error types for the rating tool
//!
//! Library functions return `anyhow::Result` and raise the typed
//! [`RaterError`] kinds below, so callers can `downcast_ref` to tell a
//! recoverable failure (bad import file, unreachable catalog) from a broken
//! weight table.

use crate::types::Category;

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific rating scenarios
#[derive(Debug, thiserror::Error)]
pub enum RaterError {
    #[error("Catalog lookup failed: {message}")]
    UnreachableCatalog { message: String },

    #[error("Game not found in catalog: {game_id}")]
    UnknownGame { game_id: String },

    #[error("Ratings are missing weighted category: {category}")]
    MissingCategory { category: Category },

    #[error("Ratings contain category without a weight: {category}")]
    UnknownCategory { category: Category },

    #[error("Cannot normalize weights: no weighted category remains")]
    DivisionByZero,

    #[error("Malformed import: {reason}")]
    MalformedImport { reason: String },

    #[error("Invalid rating for {category}: {value} (expected 1.0..=10.0 in steps of 0.5)")]
    InvalidRating { category: Category, value: f64 },

    #[error("Invalid overall score: {value} (expected 1.0..=10.0 in steps of 0.5)")]
    InvalidScore { value: f64 },

    #[error("Category {category} is not rated for this game")]
    InactiveCategory { category: Category },

    #[error("Game name cannot be empty")]
    EmptyGameName,

    #[error("Flat file error: {message}")]
    FlatFile { message: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },
}

impl RaterError {
    /// Whether the failure points at a broken weight table rather than bad input
    pub fn is_configuration_fault(&self) -> bool {
        matches!(
            self,
            RaterError::MissingCategory { .. }
                | RaterError::UnknownCategory { .. }
                | RaterError::DivisionByZero
                | RaterError::ConfigurationError { .. }
        )
    }
}
