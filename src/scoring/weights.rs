//! Category weight tables and normalization
//!
//! The canonical [`CategoryWeights`] table is never mutated: excluding a
//! category produces a fresh [`NormalizedWeights`] whose values sum to 1.0.

use crate::error::{RaterError, Result};
use crate::types::Category;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Category left out of scoring for solo-only games
pub const SOLO_EXCLUDED_CATEGORY: Category = Category::Interactivity;

/// Relative importance of each category.
///
/// The default weights sum to 1.0 but nothing relies on that, every score is
/// computed from a renormalized copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryWeights {
    weights: BTreeMap<Category, f64>,
}

impl Default for CategoryWeights {
    fn default() -> Self {
        let weights = [
            (Category::Artwork, 0.05),
            (Category::Gameplay, 0.20),
            (Category::Setup, 0.05),
            (Category::Length, 0.05),
            (Category::FunFactor, 0.15),
            (Category::Price, 0.05),
            (Category::LearningCurve, 0.05),
            (Category::Replayability, 0.10),
            (Category::Interactivity, 0.08),
            (Category::ProductionQuality, 0.06),
            (Category::ThemeIntegration, 0.06),
            (Category::PlayerCount, 0.05),
            (Category::Storage, 0.05),
        ]
        .into_iter()
        .collect();

        Self { weights }
    }
}

impl CategoryWeights {
    /// Build a weight table, rejecting empty tables, non-positive weights and
    /// weights whose sum overflows
    pub fn new(weights: BTreeMap<Category, f64>) -> Result<Self> {
        if weights.is_empty() {
            return Err(RaterError::ConfigurationError {
                message: "Weight table cannot be empty".to_string(),
            }
            .into());
        }
        for (category, weight) in &weights {
            if !weight.is_finite() || *weight <= 0.0 {
                return Err(RaterError::ConfigurationError {
                    message: format!("Weight for {} must be positive, got {}", category, weight),
                }
                .into());
            }
        }
        let total: f64 = weights.values().sum();
        if !total.is_finite() {
            return Err(RaterError::ConfigurationError {
                message: format!("Weights must have a finite sum, got {}", total),
            }
            .into());
        }
        Ok(Self { weights })
    }

    /// Default table with individual weights replaced
    pub fn with_overrides(overrides: &BTreeMap<Category, f64>) -> Result<Self> {
        let mut weights = Self::default().weights;
        weights.extend(overrides.iter().map(|(category, weight)| (*category, *weight)));
        Self::new(weights)
    }

    /// Weight of a single category
    pub fn get(&self, category: Category) -> Option<f64> {
        self.weights.get(&category).copied()
    }

    /// Iterate weights in weight-table order
    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        self.weights.iter().map(|(category, weight)| (*category, *weight))
    }

    /// Categories present in the table
    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.weights.keys().copied()
    }

    /// Raw sum of the weights
    pub fn sum(&self) -> f64 {
        self.weights.values().sum()
    }
}

/// Weights restricted to the active categories, summing to 1.0
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedWeights {
    weights: BTreeMap<Category, f64>,
}

impl NormalizedWeights {
    pub fn get(&self, category: Category) -> Option<f64> {
        self.weights.get(&category).copied()
    }

    pub fn contains(&self, category: Category) -> bool {
        self.weights.contains_key(&category)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        self.weights.iter().map(|(category, weight)| (*category, *weight))
    }

    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.weights.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn sum(&self) -> f64 {
        self.weights.values().sum()
    }
}

/// Categories excluded from scoring for the given solo flag
pub fn solo_exclusions(solo_only: bool) -> BTreeSet<Category> {
    if solo_only {
        BTreeSet::from([SOLO_EXCLUDED_CATEGORY])
    } else {
        BTreeSet::new()
    }
}

/// Active categories of a rating session, in weight-table order
pub fn active_categories(weights: &CategoryWeights, solo_only: bool) -> Vec<Category> {
    let excluded = solo_exclusions(solo_only);
    weights
        .categories()
        .filter(|category| !excluded.contains(category))
        .collect()
}

/// Drop the excluded categories and rescale the rest to sum to 1.0.
///
/// Excluded categories missing from the table are ignored. Fails with
/// [`RaterError::DivisionByZero`] when no weight remains or the remaining
/// weights do not have a finite positive sum.
pub fn normalize(
    weights: &CategoryWeights,
    exclude: &BTreeSet<Category>,
) -> Result<NormalizedWeights> {
    let remaining: BTreeMap<Category, f64> = weights
        .iter()
        .filter(|(category, _)| !exclude.contains(category))
        .collect();

    let total: f64 = remaining.values().sum();
    if remaining.is_empty() || total <= 0.0 || !total.is_finite() {
        return Err(RaterError::DivisionByZero.into());
    }

    let weights = remaining
        .into_iter()
        .map(|(category, weight)| (category, weight / total))
        .collect();

    Ok(NormalizedWeights { weights })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_weights_sum_to_one() {
        let weights = CategoryWeights::default();
        assert!((weights.sum() - 1.0).abs() < 1e-9);
        assert_eq!(weights.categories().count(), 13);
        assert_eq!(weights.get(Category::Gameplay), Some(0.20));
    }

    #[test]
    fn test_normalize_without_exclusions_is_identity() {
        let weights = CategoryWeights::default();
        let normalized = normalize(&weights, &BTreeSet::new()).unwrap();

        assert_eq!(normalized.len(), 13);
        for (category, weight) in weights.iter() {
            let scaled = normalized.get(category).unwrap();
            assert!((scaled - weight).abs() < 1e-12);
        }
    }

    #[test]
    fn test_normalize_solo_rescales_remaining() {
        let weights = CategoryWeights::default();
        let normalized = normalize(&weights, &solo_exclusions(true)).unwrap();

        assert_eq!(normalized.len(), 12);
        assert!(!normalized.contains(Category::Interactivity));
        assert!((normalized.sum() - 1.0).abs() < 1e-9);
        assert!((normalized.get(Category::Gameplay).unwrap() - 0.20 / 0.92).abs() < 1e-12);

        // canonical table untouched
        assert_eq!(weights.get(Category::Interactivity), Some(0.08));
    }

    #[test]
    fn test_normalize_ignores_absent_exclusion() {
        let table = BTreeMap::from([(Category::Gameplay, 0.5), (Category::Price, 0.5)]);
        let weights = CategoryWeights::new(table).unwrap();
        let normalized = normalize(&weights, &solo_exclusions(true)).unwrap();
        assert_eq!(normalized.len(), 2);
        assert_eq!(normalized.get(Category::Price), Some(0.5));
    }

    #[test]
    fn test_normalize_all_excluded_is_division_by_zero() {
        let weights = CategoryWeights::default();
        let everything: BTreeSet<Category> = Category::ALL.into_iter().collect();

        let err = normalize(&weights, &everything).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RaterError>(),
            Some(RaterError::DivisionByZero)
        ));
    }

    #[test]
    fn test_weight_validation() {
        assert!(CategoryWeights::new(BTreeMap::new()).is_err());
        assert!(CategoryWeights::new(BTreeMap::from([(Category::Price, 0.0)])).is_err());
        assert!(CategoryWeights::new(BTreeMap::from([(Category::Price, -0.1)])).is_err());
        assert!(CategoryWeights::new(BTreeMap::from([(Category::Price, f64::NAN)])).is_err());
    }

    #[test]
    fn test_overflowing_weight_sum_rejected() {
        let table = BTreeMap::from([(Category::Price, 1e308), (Category::Gameplay, 1e308)]);
        let err = CategoryWeights::new(table).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RaterError>(),
            Some(RaterError::ConfigurationError { .. })
        ));

        let overrides = BTreeMap::from([(Category::Price, 1e308), (Category::Gameplay, 1e308)]);
        assert!(CategoryWeights::with_overrides(&overrides).is_err());
    }

    #[test]
    fn test_normalize_rejects_overflowing_sum() {
        // deserialization skips the constructor checks
        let weights: CategoryWeights =
            serde_json::from_str(r#"{"weights": {"price": 1e308, "gameplay": 1e308}}"#).unwrap();

        let err = normalize(&weights, &BTreeSet::new()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RaterError>(),
            Some(RaterError::DivisionByZero)
        ));
    }

    #[test]
    fn test_with_overrides() {
        let overrides = BTreeMap::from([(Category::Price, 0.25)]);
        let weights = CategoryWeights::with_overrides(&overrides).unwrap();
        assert_eq!(weights.get(Category::Price), Some(0.25));
        assert_eq!(weights.get(Category::Gameplay), Some(0.20));
    }

    #[test]
    fn test_active_categories() {
        let weights = CategoryWeights::default();
        assert_eq!(active_categories(&weights, false), Category::ALL.to_vec());

        let solo = active_categories(&weights, true);
        assert_eq!(solo.len(), 12);
        assert!(!solo.contains(&Category::Interactivity));
    }

    proptest! {
        #[test]
        fn prop_single_exclusion_sums_to_one(
            raw in proptest::collection::vec(0.01f64..10.0, 13),
            excluded_index in 0usize..13,
        ) {
            let total: f64 = raw.iter().sum();
            let table: BTreeMap<Category, f64> = Category::ALL
                .iter()
                .copied()
                .zip(raw.iter().map(|w| w / total))
                .collect();
            let weights = CategoryWeights::new(table).unwrap();
            let exclude = BTreeSet::from([Category::ALL[excluded_index]]);

            let normalized = normalize(&weights, &exclude).unwrap();
            prop_assert_eq!(normalized.len(), 12);
            prop_assert!((normalized.sum() - 1.0).abs() < 1e-9);
        }
    }
}
