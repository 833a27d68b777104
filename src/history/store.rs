//! Session-scoped rating history
//!
//! This module keeps the ordered list of ratings submitted during a session,
//! projects it into a display table and moves it in and out of the JSON
//! interchange format.

use crate::error::{RaterError, Result};
use crate::types::{Category, RatingRecord, RecordData};
use crate::utils::format_rating;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Tabular view of the history: `Game`, `Overall`, then every category seen
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingTable {
    pub categories: Vec<Category>,
    pub rows: Vec<TableRow>,
}

/// One record projected onto the table columns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub game: String,
    pub overall: f64,
    /// One cell per entry of [`RatingTable::categories`], `None` when the
    /// record did not rate that category
    pub cells: Vec<Option<f64>>,
}

impl RatingTable {
    /// Column headers
    pub fn columns(&self) -> Vec<String> {
        let mut columns = vec!["Game".to_string(), "Overall".to_string()];
        columns.extend(self.categories.iter().map(|category| category.label()));
        columns
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl std::fmt::Display for RatingTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let columns = self.columns();
        let rendered: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                let mut cells = vec![row.game.clone(), format_rating(row.overall)];
                cells.extend(
                    row.cells
                        .iter()
                        .map(|cell| cell.map(format_rating).unwrap_or_default()),
                );
                cells
            })
            .collect();

        let widths: Vec<usize> = columns
            .iter()
            .enumerate()
            .map(|(index, header)| {
                rendered
                    .iter()
                    .map(|cells| cells[index].chars().count())
                    .chain(std::iter::once(header.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let line = |cells: &[String]| -> String {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
                .collect::<Vec<_>>()
                .join(" | ")
        };

        writeln!(f, "{}", line(columns.as_slice()))?;
        writeln!(
            f,
            "{}",
            widths
                .iter()
                .map(|width| "-".repeat(*width))
                .collect::<Vec<_>>()
                .join("-+-")
        )?;
        for cells in &rendered {
            writeln!(f, "{}", line(cells.as_slice()))?;
        }
        Ok(())
    }
}

/// Ordered, append-only list of the ratings of one session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatingHistory {
    records: Vec<RatingRecord>,
}

impl RatingHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record at the end. Duplicate game names are kept as separate
    /// ratings.
    pub fn append(&mut self, record: RatingRecord) {
        debug!("Appending rating for '{}' ({})", record.name(), record.score());
        self.records.push(record);
    }

    pub fn records(&self) -> &[RatingRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Project the history into a table whose category columns are the union
    /// of every category rated so far, in weight-table order.
    pub fn to_table(&self) -> RatingTable {
        let categories: Vec<Category> = self
            .records
            .iter()
            .flat_map(|record| record.ratings().keys().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let rows = self
            .records
            .iter()
            .map(|record| TableRow {
                game: record.name().to_string(),
                overall: record.score(),
                cells: categories
                    .iter()
                    .map(|category| record.ratings().get(category).copied())
                    .collect(),
            })
            .collect();

        RatingTable { categories, rows }
    }

    /// Serialize the history as a JSON array of `{name, score, ratings}`
    pub fn export_json(&self) -> Result<String> {
        let json = serde_json::to_string_pretty(&self.records)?;
        info!("Exported {} ratings", self.records.len());
        Ok(json)
    }

    /// Replace the whole history with the records in `text`.
    ///
    /// On any failure the current history is left untouched and a
    /// [`RaterError::MalformedImport`] is returned.
    pub fn import_json(&mut self, text: &str) -> Result<usize> {
        let records = parse_history(text).inspect_err(|e| warn!("Rejected import: {}", e))?;

        let count = records.len();
        self.records = records;
        info!("Imported {} ratings, replacing session history", count);
        Ok(count)
    }
}

fn parse_history(text: &str) -> Result<Vec<RatingRecord>> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| RaterError::MalformedImport {
            reason: format!("not valid JSON: {}", e),
        })?;

    if !value.is_array() {
        return Err(RaterError::MalformedImport {
            reason: "expected a top-level array of ratings".to_string(),
        }
        .into());
    }

    let entries: Vec<RecordData> =
        serde_json::from_value(value).map_err(|e| RaterError::MalformedImport {
            reason: format!("unexpected rating shape: {}", e),
        })?;

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            RatingRecord::try_from(entry).map_err(|e| {
                anyhow::Error::from(RaterError::MalformedImport {
                    reason: format!("entry {}: {}", index, e),
                })
            })
        })
        .collect()
}
