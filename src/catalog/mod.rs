//! Game catalog lookup
//!
//! This module defines the lookup collaborator used to find a game by name
//! before rating it, with an offline file-backed implementation.

pub mod provider;

// Re-export commonly used types
#[cfg(test)]
pub use provider::MockGameCatalog;
pub use provider::{
    CatalogEntry, CatalogHit, GameCatalog, GameDetails, StaticCatalog, UnavailableCatalog,
};
