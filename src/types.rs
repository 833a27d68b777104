//! Common types used throughout the rating tool

use crate::error::{RaterError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Lowest value a category rating or overall score may take
pub const MIN_RATING: f64 = 1.0;

/// Highest value a category rating or overall score may take
pub const MAX_RATING: f64 = 10.0;

/// Granularity of ratings and scores
pub const RATING_STEP: f64 = 0.5;

/// Rating dimension of a board game.
///
/// Variants are declared in weight-table order; the derived `Ord` keeps every
/// `BTreeMap<Category, _>` (and therefore every table, CSV and JSON output)
/// in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Artwork,
    Gameplay,
    Setup,
    Length,
    FunFactor,
    Price,
    LearningCurve,
    Replayability,
    Interactivity,
    ProductionQuality,
    ThemeIntegration,
    PlayerCount,
    Storage,
}

impl Category {
    /// All categories in weight-table order
    pub const ALL: [Category; 13] = [
        Category::Artwork,
        Category::Gameplay,
        Category::Setup,
        Category::Length,
        Category::FunFactor,
        Category::Price,
        Category::LearningCurve,
        Category::Replayability,
        Category::Interactivity,
        Category::ProductionQuality,
        Category::ThemeIntegration,
        Category::PlayerCount,
        Category::Storage,
    ];

    /// Machine key used in JSON, CSV headers and config files
    pub fn key(&self) -> &'static str {
        match self {
            Category::Artwork => "artwork",
            Category::Gameplay => "gameplay",
            Category::Setup => "setup",
            Category::Length => "length",
            Category::FunFactor => "fun_factor",
            Category::Price => "price",
            Category::LearningCurve => "learning_curve",
            Category::Replayability => "replayability",
            Category::Interactivity => "interactivity",
            Category::ProductionQuality => "production_quality",
            Category::ThemeIntegration => "theme_integration",
            Category::PlayerCount => "player_count",
            Category::Storage => "storage",
        }
    }

    /// Human readable label, e.g. "Fun Factor"
    pub fn label(&self) -> String {
        crate::utils::title_case(self.key())
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Error returned when a string does not name a category
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Unknown category name: {0}")]
pub struct ParseCategoryError(pub String);

impl FromStr for Category {
    type Err = ParseCategoryError;

    /// Accepts the machine key ("fun_factor") or the label ("Fun Factor"),
    /// case-insensitively.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        Category::ALL
            .iter()
            .copied()
            .find(|category| category.key() == normalized)
            .ok_or_else(|| ParseCategoryError(s.to_string()))
    }
}

/// Per-category ratings, ordered by weight-table order
pub type Ratings = BTreeMap<Category, f64>;

/// Whether a value lies in [1.0, 10.0] on the 0.5 grid
pub fn is_valid_rating(value: f64) -> bool {
    value.is_finite()
        && (MIN_RATING..=MAX_RATING).contains(&value)
        && (value / RATING_STEP).fract() == 0.0
}

/// One submitted rating of a game.
///
/// Records are validated on construction and on deserialization, so every
/// record in circulation holds a non-empty name and on-grid values. Field
/// names are the JSON interchange contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RecordData")]
pub struct RatingRecord {
    name: String,
    score: f64,
    ratings: Ratings,
}

/// Unvalidated wire shape of a [`RatingRecord`]
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RecordData {
    name: String,
    score: f64,
    ratings: Ratings,
}

impl TryFrom<RecordData> for RatingRecord {
    type Error = anyhow::Error;

    fn try_from(data: RecordData) -> Result<Self> {
        RatingRecord::new(data.name, data.ratings, data.score)
    }
}

impl RatingRecord {
    /// Create a validated rating record
    pub fn new(name: impl Into<String>, ratings: Ratings, score: f64) -> Result<Self> {
        let record = Self {
            name: name.into().trim().to_string(),
            score,
            ratings,
        };
        record.validate()?;
        Ok(record)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn ratings(&self) -> &Ratings {
        &self.ratings
    }

    /// Check the record invariants: non-empty name, every rating and the
    /// overall score in range on the 0.5 grid.
    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(RaterError::EmptyGameName.into());
        }
        for (category, value) in &self.ratings {
            if !is_valid_rating(*value) {
                return Err(RaterError::InvalidRating {
                    category: *category,
                    value: *value,
                }
                .into());
            }
        }
        if !is_valid_rating(self.score) {
            return Err(RaterError::InvalidScore { value: self.score }.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_order_matches_weight_table() {
        let mut sorted = Category::ALL.to_vec();
        sorted.sort();
        assert_eq!(sorted, Category::ALL.to_vec());
        assert_eq!(Category::ALL[0], Category::Artwork);
        assert_eq!(Category::ALL[12], Category::Storage);
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("fun_factor".parse::<Category>(), Ok(Category::FunFactor));
        assert_eq!("Fun Factor".parse::<Category>(), Ok(Category::FunFactor));
        assert_eq!(
            "THEME-INTEGRATION".parse::<Category>(),
            Ok(Category::ThemeIntegration)
        );
        assert!("mechanics".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_serde_key() {
        let json = serde_json::to_string(&Category::LearningCurve).unwrap();
        assert_eq!(json, "\"learning_curve\"");
        for category in Category::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.key()));
        }
    }

    #[test]
    fn test_category_label() {
        assert_eq!(Category::PlayerCount.label(), "Player Count");
        assert_eq!(Category::Artwork.label(), "Artwork");
    }

    #[test]
    fn test_valid_rating_grid() {
        assert!(is_valid_rating(1.0));
        assert!(is_valid_rating(7.5));
        assert!(is_valid_rating(10.0));
        assert!(!is_valid_rating(0.5));
        assert!(!is_valid_rating(10.5));
        assert!(!is_valid_rating(7.25));
        assert!(!is_valid_rating(f64::NAN));
    }

    #[test]
    fn test_record_validation() {
        let ratings: Ratings = [(Category::Gameplay, 8.0)].into_iter().collect();
        let record = RatingRecord::new("  Azul ", ratings.clone(), 8.0).unwrap();
        assert_eq!(record.name(), "Azul");

        let err = RatingRecord::new("   ", ratings.clone(), 8.0).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RaterError>(),
            Some(RaterError::EmptyGameName)
        ));

        let bad: Ratings = [(Category::Price, 11.0)].into_iter().collect();
        let err = RatingRecord::new("Azul", bad, 8.0).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RaterError>(),
            Some(RaterError::InvalidRating {
                category: Category::Price,
                ..
            })
        ));
    }

    #[test]
    fn test_record_json_field_names() {
        let ratings: Ratings = [(Category::Setup, 6.5)].into_iter().collect();
        let record = RatingRecord::new("Root", ratings, 6.5).unwrap();
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["name"], "Root");
        assert_eq!(value["score"], 6.5);
        assert_eq!(value["ratings"]["setup"], 6.5);
    }

    #[test]
    fn test_deserialization_validates() {
        let record: RatingRecord =
            serde_json::from_str(r#"{"name": "Root", "score": 7.5, "ratings": {"setup": 7.5}}"#)
                .unwrap();
        assert_eq!(record.score(), 7.5);

        let off_grid = r#"{"name": "Root", "score": 7.86, "ratings": {}}"#;
        assert!(serde_json::from_str::<RatingRecord>(off_grid).is_err());

        let unnamed = r#"{"name": " ", "score": 7.5, "ratings": {}}"#;
        assert!(serde_json::from_str::<RatingRecord>(unnamed).is_err());
    }
}
