//! Game catalog lookup traits and implementations
//!
//! The catalog is an external collaborator that may be slow, partial or
//! unreachable. Every detail it returns is optional; a failed lookup is
//! reported as [`RaterError::UnreachableCatalog`] so callers can fall back to
//! manual name entry.

use crate::error::{RaterError, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Search candidate returned for a free-text query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogHit {
    pub id: String,
    pub name: String,
}

/// Details of a single game; the catalog may omit any of them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameDetails {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub min_players: Option<u32>,
    #[serde(default)]
    pub max_players: Option<u32>,
    /// Playing time in minutes
    #[serde(default)]
    pub playing_time: Option<u32>,
    #[serde(default)]
    pub average_rating: Option<f64>,
}

impl GameDetails {
    /// A game for exactly one player suggests the solo-only toggle
    pub fn suggests_solo_only(&self) -> bool {
        self.max_players == Some(1)
    }

    /// "2-4 players", "1 player" or `None` when the catalog had no counts
    pub fn player_range(&self) -> Option<String> {
        match (self.min_players, self.max_players) {
            (Some(1), Some(1)) => Some("1 player".to_string()),
            (Some(min), Some(max)) if min == max => Some(format!("{} players", min)),
            (Some(min), Some(max)) => Some(format!("{}-{} players", min, max)),
            (Some(min), None) => Some(format!("{}+ players", min)),
            (None, Some(max)) => Some(format!("up to {} players", max)),
            (None, None) => None,
        }
    }
}

/// Trait for looking up games by name
#[cfg_attr(test, mockall::automock)]
pub trait GameCatalog {
    /// Candidates matching a free-text query, best match first
    fn search(&self, query: &str) -> Result<Vec<CatalogHit>>;

    /// Details of the game with the given catalog id
    fn details(&self, id: &str) -> Result<GameDetails>;
}

impl<T: GameCatalog + ?Sized> GameCatalog for Arc<T> {
    fn search(&self, query: &str) -> Result<Vec<CatalogHit>> {
        (**self).search(query)
    }

    fn details(&self, id: &str) -> Result<GameDetails> {
        (**self).details(id)
    }
}

/// Catalog entry of the offline catalog file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub details: GameDetails,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    games: Vec<CatalogEntry>,
}

/// Catalog backed by a fixed list of games, typically loaded from a TOML file
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    entries: Vec<CatalogEntry>,
}

impl StaticCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// Parse a catalog from TOML text with a `[[games]]` array
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(contents)?;
        Ok(Self::new(file.games))
    }

    /// Load a catalog file. A file that cannot be read or parsed is reported
    /// as an unreachable catalog.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog {}", path.display()))
            .map_err(|e| RaterError::UnreachableCatalog {
                message: format!("{:#}", e),
            })?;
        let catalog = Self::from_toml_str(&contents).map_err(|e| RaterError::UnreachableCatalog {
            message: format!("invalid catalog {}: {}", path.display(), e),
        })?;
        info!(
            "Loaded {} games from catalog {}",
            catalog.entries.len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl GameCatalog for StaticCatalog {
    fn search(&self, query: &str) -> Result<Vec<CatalogHit>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        // exact matches first, then prefix matches, then substring matches
        let mut ranked: Vec<(u8, &CatalogEntry)> = self
            .entries
            .iter()
            .filter_map(|entry| {
                let name = entry.name.to_lowercase();
                if name == needle {
                    Some((0, entry))
                } else if name.starts_with(&needle) {
                    Some((1, entry))
                } else if name.contains(&needle) {
                    Some((2, entry))
                } else {
                    None
                }
            })
            .collect();
        ranked.sort_by_key(|(rank, _)| *rank);

        debug!("Catalog search '{}' matched {} games", query, ranked.len());
        Ok(ranked
            .into_iter()
            .map(|(_, entry)| CatalogHit {
                id: entry.id.clone(),
                name: entry.name.clone(),
            })
            .collect())
    }

    fn details(&self, id: &str) -> Result<GameDetails> {
        let entry = self
            .entries
            .iter()
            .find(|entry| entry.id == id)
            .ok_or_else(|| RaterError::UnknownGame {
                game_id: id.to_string(),
            })?;

        let mut details = entry.details.clone();
        details.name.get_or_insert_with(|| entry.name.clone());
        Ok(details)
    }
}

/// Catalog used when no lookup source is configured; every call fails with
/// [`RaterError::UnreachableCatalog`].
#[derive(Debug, Clone, Default)]
pub struct UnavailableCatalog;

impl GameCatalog for UnavailableCatalog {
    fn search(&self, _query: &str) -> Result<Vec<CatalogHit>> {
        Err(RaterError::UnreachableCatalog {
            message: "no catalog configured".to_string(),
        }
        .into())
    }

    fn details(&self, _id: &str) -> Result<GameDetails> {
        Err(RaterError::UnreachableCatalog {
            message: "no catalog configured".to_string(),
        }
        .into())
    }
}
