//! Weighted score calculation
//!
//! This module computes the weighted sum of per-category ratings against a
//! normalized weight table and rounds it onto the 0.5 grid.

use crate::error::{RaterError, Result};
use crate::scoring::weights::{normalize, solo_exclusions, CategoryWeights, NormalizedWeights};
use crate::types::{Category, Ratings};
use serde::Serialize;
use tracing::debug;

/// Weighted sum of the ratings over the weights' key set.
///
/// Rejects mismatched input instead of ignoring it: a weighted category
/// without a rating is [`RaterError::MissingCategory`], a rating without a
/// weight is [`RaterError::UnknownCategory`].
pub fn score(ratings: &Ratings, weights: &NormalizedWeights) -> Result<f64> {
    if let Some(category) = ratings.keys().find(|category| !weights.contains(**category)) {
        return Err(RaterError::UnknownCategory {
            category: *category,
        }
        .into());
    }

    let mut total = 0.0;
    for (category, weight) in weights.iter() {
        let rating = ratings
            .get(&category)
            .ok_or(RaterError::MissingCategory { category })?;
        total += rating * weight;
    }
    Ok(total)
}

/// Nearest multiple of 0.5, ties going to the even multiple.
///
/// 7.25 rounds down to 7.0 and 7.75 rounds up to 8.0 (banker's rounding on
/// the doubled value).
pub fn round_to_half(x: f64) -> f64 {
    (x * 2.0).round_ties_even() / 2.0
}

/// One line of a score breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownLine {
    pub category: Category,
    pub label: String,
    pub rating: f64,
    pub weight: f64,
}

/// Result of scoring one submission
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreCard {
    /// Weighted sum before rounding
    pub weighted_total: f64,
    /// Rounded overall score
    pub overall: f64,
    /// Per-category contribution in weight-table order
    pub breakdown: Vec<BreakdownLine>,
}

/// Scores submissions against a fixed weight table
#[derive(Debug, Clone, Default)]
pub struct WeightedScoreCalculator {
    weights: CategoryWeights,
}

impl WeightedScoreCalculator {
    pub fn new(weights: CategoryWeights) -> Self {
        Self { weights }
    }

    /// The canonical weight table
    pub fn weights(&self) -> &CategoryWeights {
        &self.weights
    }

    /// Normalized weights for a session with the given solo flag
    pub fn normalized(&self, solo_only: bool) -> Result<NormalizedWeights> {
        normalize(&self.weights, &solo_exclusions(solo_only))
    }

    /// Score a full set of active-category ratings
    pub fn evaluate(&self, ratings: &Ratings, solo_only: bool) -> Result<ScoreCard> {
        let weights = self.normalized(solo_only)?;
        let weighted_total = score(ratings, &weights)?;
        let overall = round_to_half(weighted_total);

        debug!(
            "Scored {} categories (solo: {}): total {:.4} -> {}",
            weights.len(),
            solo_only,
            weighted_total,
            overall
        );

        let breakdown = weights
            .iter()
            .filter_map(|(category, weight)| {
                ratings.get(&category).map(|rating| BreakdownLine {
                    category,
                    label: category.label(),
                    rating: *rating,
                    weight,
                })
            })
            .collect();

        Ok(ScoreCard {
            weighted_total,
            overall,
            breakdown,
        })
    }
}
