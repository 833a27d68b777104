//! Board Game Rater - weighted multi-category board game ratings
//!
//! This crate scores board games across thirteen weighted categories,
//! keeps a session history with JSON export/import and accumulates every
//! rating in a CSV file across runs.

pub mod catalog;
pub mod config;
pub mod error;
pub mod history;
pub mod scoring;
pub mod session;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{RaterError, Result};
pub use types::*;

// Re-export key components
pub use catalog::{GameCatalog, StaticCatalog};
pub use history::{FlatFileLog, RatingHistory};
pub use scoring::{CategoryWeights, WeightedScoreCalculator};
pub use session::{RatingForm, RatingSession, SessionRequest, SessionResponse};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
