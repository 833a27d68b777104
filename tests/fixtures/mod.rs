//! Test fixtures and fake collaborators for integration testing

use boardgame_rater::catalog::{CatalogHit, GameCatalog, GameDetails};
use boardgame_rater::error::{RaterError, Result};
use boardgame_rater::types::{Category, Ratings};
use std::sync::Mutex;

/// Offline catalog file used by the end-to-end tests
pub const CATALOG_TOML: &str = r#"
[[games]]
id = "230802"
name = "Azul"
thumbnail = "https://example.com/azul.jpg"
min_players = 2
max_players = 4
playing_time = 45
average_rating = 7.7

[[games]]
id = "1"
name = "Friday"
min_players = 1
max_players = 1
playing_time = 25
"#;

/// Ratings of the reference scenario, all thirteen categories
pub fn scenario_ratings() -> Ratings {
    [
        (Category::Artwork, 8.0),
        (Category::Gameplay, 9.0),
        (Category::Setup, 7.0),
        (Category::Length, 6.0),
        (Category::FunFactor, 9.0),
        (Category::Price, 7.0),
        (Category::LearningCurve, 8.0),
        (Category::Replayability, 8.0),
        (Category::Interactivity, 7.0),
        (Category::ProductionQuality, 7.0),
        (Category::ThemeIntegration, 8.0),
        (Category::PlayerCount, 7.0),
        (Category::Storage, 6.0),
    ]
    .into_iter()
    .collect()
}

/// Catalog that fails the first `failures` calls and records every query
#[derive(Debug, Default)]
pub struct FlakyCatalog {
    failures: Mutex<usize>,
    queries: Mutex<Vec<String>>,
}

impl FlakyCatalog {
    pub fn new(failures: usize) -> Self {
        Self {
            failures: Mutex::new(failures),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Get all queries made (for testing)
    pub fn get_queries(&self) -> Vec<String> {
        self.queries
            .lock()
            .map(|queries| queries.clone())
            .unwrap_or_default()
    }

    fn check_reachable(&self) -> Result<()> {
        let mut failures = self.failures.lock().map_err(|_| RaterError::UnreachableCatalog {
            message: "catalog lock poisoned".to_string(),
        })?;
        if *failures > 0 {
            *failures -= 1;
            return Err(RaterError::UnreachableCatalog {
                message: "connection reset".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

impl GameCatalog for FlakyCatalog {
    fn search(&self, query: &str) -> Result<Vec<CatalogHit>> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.to_string());
        }
        self.check_reachable()?;
        Ok(vec![CatalogHit {
            id: "42".to_string(),
            name: format!("{} (catalog)", query),
        }])
    }

    fn details(&self, id: &str) -> Result<GameDetails> {
        self.check_reachable()?;
        Ok(GameDetails {
            name: Some(format!("Game {}", id)),
            ..GameDetails::default()
        })
    }
}
