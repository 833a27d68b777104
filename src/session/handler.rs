//! Request/response handling for a rating session
//!
//! Each user interaction is one [`SessionRequest`] carrying the current form
//! values. The session answers with a [`SessionResponse`] holding what to show
//! next, the side effects it performed and any warnings. Failures never end
//! the session; they become warnings and leave the stored state unchanged.

use crate::catalog::{CatalogHit, GameCatalog, GameDetails, StaticCatalog, UnavailableCatalog};
use crate::config::AppConfig;
use crate::error::{RaterError, Result};
use crate::history::{FlatFileLog, RatingHistory, RatingTable};
use crate::scoring::{active_categories, ScoreCard, WeightedScoreCalculator};
use crate::types::{
    is_valid_rating, Category, RatingRecord, Ratings, MAX_RATING, MIN_RATING, RATING_STEP,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

/// Values of the rating form at submission time.
///
/// Categories without an entry keep the slider default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatingForm {
    pub game_name: String,
    pub solo_only: bool,
    pub ratings: Ratings,
}

impl RatingForm {
    pub fn new(game_name: impl Into<String>, solo_only: bool) -> Self {
        Self {
            game_name: game_name.into(),
            solo_only,
            ratings: Ratings::new(),
        }
    }

    /// Set one slider
    pub fn with_rating(mut self, category: Category, value: f64) -> Self {
        self.ratings.insert(category, value);
        self
    }
}

/// A single user interaction
#[derive(Debug, Clone, PartialEq)]
pub enum SessionRequest {
    /// Look up candidates for a free-text query
    Search { query: String },
    /// Fetch details of a catalog game and prefill the form
    Select { id: String },
    /// Show an empty form for manual name entry
    Form { solo_only: bool },
    /// Score the form and record the result
    Submit(RatingForm),
    /// Show the session history as a table
    Table,
    /// Serialize the session history
    Export,
    /// Replace the session history with previously exported data
    Import { payload: String },
}

/// One slider of the rating form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slider {
    pub category: Category,
    pub label: String,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub value: f64,
}

/// Rating form to present
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormModel {
    pub game_name: Option<String>,
    pub solo_only: bool,
    pub sliders: Vec<Slider>,
}

/// What to present after handling a request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum View {
    Candidates(Vec<CatalogHit>),
    Game {
        id: String,
        details: GameDetails,
        form: FormModel,
    },
    Form(FormModel),
    Scored {
        record: RatingRecord,
        card: ScoreCard,
    },
    Table(RatingTable),
    Exported {
        json: String,
        records: usize,
    },
    Imported {
        records: usize,
    },
}

/// Side effect performed while handling a request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SideEffect {
    AppendedToHistory { game: String },
    AppendedToFlatFile { path: PathBuf, rows: usize },
    HistoryReplaced { records: usize },
}

/// Outcome of one request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionResponse {
    pub view: View,
    pub effects: Vec<SideEffect>,
    pub warnings: Vec<String>,
}

impl SessionResponse {
    fn view(view: View) -> Self {
        Self {
            view,
            effects: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn warn(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn is_ok(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// State of one interactive rating session
pub struct RatingSession {
    calculator: WeightedScoreCalculator,
    catalog: Box<dyn GameCatalog>,
    history: RatingHistory,
    flat_file: Option<FlatFileLog>,
    default_rating: f64,
}

impl RatingSession {
    /// Create a session without flat-file persistence
    pub fn new(calculator: WeightedScoreCalculator, catalog: Box<dyn GameCatalog>) -> Self {
        Self {
            calculator,
            catalog,
            history: RatingHistory::new(),
            flat_file: None,
            default_rating: 7.0,
        }
    }

    /// Build a session from application configuration.
    ///
    /// An unreadable catalog is not fatal: the session starts with lookups
    /// unavailable and manual name entry still works.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let calculator = WeightedScoreCalculator::new(config.category_weights()?);

        let catalog: Box<dyn GameCatalog> = match &config.storage.catalog_path {
            Some(path) => match StaticCatalog::from_file(path) {
                Ok(catalog) => Box::new(catalog),
                Err(e) => {
                    warn!("Catalog unavailable, falling back to manual entry: {}", e);
                    Box::new(UnavailableCatalog)
                }
            },
            None => Box::new(UnavailableCatalog),
        };

        Ok(Self::new(calculator, catalog)
            .with_flat_file(FlatFileLog::new(&config.storage.flat_file_path))
            .with_default_rating(config.scoring.default_rating))
    }

    /// Also append every submission to a CSV flat file
    pub fn with_flat_file(mut self, flat_file: FlatFileLog) -> Self {
        self.flat_file = Some(flat_file);
        self
    }

    /// Stop appending submissions to the flat file
    pub fn without_flat_file(mut self) -> Self {
        self.flat_file = None;
        self
    }

    /// Initial slider value
    pub fn with_default_rating(mut self, default_rating: f64) -> Self {
        self.default_rating = default_rating;
        self
    }

    pub fn history(&self) -> &RatingHistory {
        &self.history
    }

    pub fn calculator(&self) -> &WeightedScoreCalculator {
        &self.calculator
    }

    /// Handle one interaction
    pub fn handle(&mut self, request: SessionRequest) -> SessionResponse {
        debug!("Handling session request: {:?}", request);
        match request {
            SessionRequest::Search { query } => self.search(&query),
            SessionRequest::Select { id } => self.select(&id),
            SessionRequest::Form { solo_only } => {
                SessionResponse::view(View::Form(self.form_model(None, solo_only, &Ratings::new())))
            }
            SessionRequest::Submit(form) => self.submit(form),
            SessionRequest::Table => SessionResponse::view(View::Table(self.history.to_table())),
            SessionRequest::Export => self.export(),
            SessionRequest::Import { payload } => self.import(&payload),
        }
    }

    /// Rating form for the given solo flag, sliders at `values` or the default
    pub fn form_model(
        &self,
        game_name: Option<String>,
        solo_only: bool,
        values: &Ratings,
    ) -> FormModel {
        let sliders = active_categories(self.calculator.weights(), solo_only)
            .into_iter()
            .map(|category| Slider {
                category,
                label: category.label(),
                min: MIN_RATING,
                max: MAX_RATING,
                step: RATING_STEP,
                value: values.get(&category).copied().unwrap_or(self.default_rating),
            })
            .collect();

        FormModel {
            game_name,
            solo_only,
            sliders,
        }
    }

    fn manual_entry(&self, warning: String) -> SessionResponse {
        SessionResponse::view(View::Form(self.form_model(None, false, &Ratings::new())))
            .warn(warning)
    }

    fn search(&self, query: &str) -> SessionResponse {
        match self.catalog.search(query) {
            Ok(hits) => {
                info!("Search '{}' returned {} candidates", query, hits.len());
                let empty = hits.is_empty();
                let response = SessionResponse::view(View::Candidates(hits));
                if empty {
                    response.warn(format!(
                        "No games found for '{}'; enter the name manually",
                        query
                    ))
                } else {
                    response
                }
            }
            Err(e) => {
                warn!("Search '{}' failed: {}", query, e);
                self.manual_entry(format!("{}; enter the game name manually", e))
            }
        }
    }

    fn select(&self, id: &str) -> SessionResponse {
        match self.catalog.details(id) {
            Ok(details) => {
                let solo_only = details.suggests_solo_only();
                let form = self.form_model(details.name.clone(), solo_only, &Ratings::new());
                SessionResponse::view(View::Game {
                    id: id.to_string(),
                    details,
                    form,
                })
            }
            Err(e) => {
                warn!("Lookup of game {} failed: {}", id, e);
                self.manual_entry(format!("{}; enter the game name manually", e))
            }
        }
    }

    fn submit(&mut self, form: RatingForm) -> SessionResponse {
        let (record, card) = match self.score_form(&form) {
            Ok(scored) => scored,
            Err(e) => {
                match e.downcast_ref::<RaterError>() {
                    Some(kind) if kind.is_configuration_fault() => {
                        error!("Weight table does not match the form: {}", e)
                    }
                    _ => warn!("Rejected submission for '{}': {}", form.game_name, e),
                }
                let model = self.form_model(
                    Some(form.game_name.clone()).filter(|name| !name.trim().is_empty()),
                    form.solo_only,
                    &form.ratings,
                );
                return SessionResponse::view(View::Form(model)).warn(e.to_string());
            }
        };

        info!(
            "Rated '{}': {} (weighted total {:.3})",
            record.name(),
            record.score(),
            card.weighted_total
        );

        let mut response = SessionResponse::view(View::Scored {
            record: record.clone(),
            card,
        });

        self.history.append(record.clone());
        response.effects.push(SideEffect::AppendedToHistory {
            game: record.name().to_string(),
        });

        if let Some(flat_file) = &self.flat_file {
            match flat_file.append(&record) {
                Ok(rows) => response.effects.push(SideEffect::AppendedToFlatFile {
                    path: flat_file.path().to_path_buf(),
                    rows,
                }),
                Err(e) => {
                    error!("Failed to save rating to {}: {:#}", flat_file.path().display(), e);
                    response.warnings.push(format!(
                        "Rating not saved to {}: {:#}",
                        flat_file.path().display(),
                        e
                    ));
                }
            }
        }

        response
    }

    fn score_form(&self, form: &RatingForm) -> Result<(RatingRecord, ScoreCard)> {
        if form.game_name.trim().is_empty() {
            return Err(RaterError::EmptyGameName.into());
        }
        if let Some((category, value)) = form
            .ratings
            .iter()
            .find(|(_, value)| !is_valid_rating(**value))
        {
            return Err(RaterError::InvalidRating {
                category: *category,
                value: *value,
            }
            .into());
        }

        let active = active_categories(self.calculator.weights(), form.solo_only);
        if let Some(category) = form.ratings.keys().find(|category| !active.contains(*category)) {
            return Err(RaterError::InactiveCategory {
                category: *category,
            }
            .into());
        }

        let mut ratings: Ratings = active
            .into_iter()
            .map(|category| (category, self.default_rating))
            .collect();
        ratings.extend(form.ratings.iter().map(|(category, value)| (*category, *value)));

        let card = self.calculator.evaluate(&ratings, form.solo_only)?;
        let record = RatingRecord::new(form.game_name.as_str(), ratings, card.overall)?;
        Ok((record, card))
    }

    fn export(&self) -> SessionResponse {
        match self.history.export_json() {
            Ok(json) => SessionResponse::view(View::Exported {
                json,
                records: self.history.len(),
            }),
            Err(e) => {
                error!("Failed to export history: {}", e);
                SessionResponse::view(View::Table(self.history.to_table()))
                    .warn(format!("Export failed: {}", e))
            }
        }
    }

    fn import(&mut self, payload: &str) -> SessionResponse {
        match self.history.import_json(payload) {
            Ok(records) => {
                let mut response = SessionResponse::view(View::Imported { records });
                response.effects.push(SideEffect::HistoryReplaced { records });
                response
            }
            Err(e) => SessionResponse::view(View::Table(self.history.to_table()))
                .warn(format!("{}; keeping the current history", e)),
        }
    }
}

impl std::fmt::Debug for RatingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RatingSession")
            .field("calculator", &self.calculator)
            .field("history", &self.history)
            .field("flat_file", &self.flat_file)
            .field("default_rating", &self.default_rating)
            .finish_non_exhaustive()
    }
}
