//! Weighted multi-category scoring
//!
//! This module normalizes the category weight table against the active
//! category set and turns per-category ratings into a rounded overall score.

pub mod calculator;
pub mod weights;

// Re-export commonly used types
pub use calculator::{round_to_half, score, BreakdownLine, ScoreCard, WeightedScoreCalculator};
pub use weights::{
    active_categories, normalize, solo_exclusions, CategoryWeights, NormalizedWeights,
    SOLO_EXCLUDED_CATEGORY,
};
