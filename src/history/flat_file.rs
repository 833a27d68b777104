//! Cross-run CSV accumulation of ratings
//!
//! Every submission is appended as one row of a CSV file with the fixed header
//! `Game,<13 categories in weight-table order>,Overall`. The file is read in
//! full, extended and rewritten through a temporary file that is renamed over
//! the original, so a crash mid-write leaves the previous file intact.

use crate::error::{RaterError, Result};
use crate::types::{Category, RatingRecord, Ratings};
use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Header of the game name column
pub const GAME_COLUMN: &str = "Game";

/// Header of the overall score column
pub const OVERALL_COLUMN: &str = "Overall";

/// Full flat file header in column order
pub fn flat_file_header() -> Vec<&'static str> {
    let mut header = vec![GAME_COLUMN];
    header.extend(Category::ALL.iter().map(|category| category.key()));
    header.push(OVERALL_COLUMN);
    header
}

/// One historical submission as stored in the flat file
#[derive(Debug, Clone, PartialEq)]
pub struct FlatFileRow {
    pub game: String,
    pub ratings: Ratings,
    pub overall: Option<f64>,
}

impl From<&RatingRecord> for FlatFileRow {
    fn from(record: &RatingRecord) -> Self {
        Self {
            game: record.name().to_string(),
            ratings: record.ratings().clone(),
            overall: Some(record.score()),
        }
    }
}

impl FlatFileRow {
    fn to_fields(&self) -> Vec<String> {
        let mut fields = Vec::with_capacity(Category::ALL.len() + 2);
        fields.push(self.game.clone());
        fields.extend(Category::ALL.iter().map(|category| {
            self.ratings
                .get(category)
                .map(|value| format_cell(*value))
                .unwrap_or_default()
        }));
        fields.push(self.overall.map(format_cell).unwrap_or_default());
        fields
    }
}

#[derive(Debug, Clone, Copy)]
enum Column {
    Game,
    Overall,
    Rating(Category),
}

/// Append-only CSV log of every rating ever submitted
#[derive(Debug, Clone)]
pub struct FlatFileLog {
    path: PathBuf,
}

impl FlatFileLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every stored row. A missing or empty file holds no rows.
    ///
    /// Files with a subset of the schema columns (in any order) are accepted;
    /// a column outside the schema is a [`RaterError::FlatFile`] error.
    pub fn read_all(&self) -> Result<Vec<FlatFileRow>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;

        let header = reader.headers()?.clone();
        if header.is_empty() {
            debug!("{} is empty", self.path.display());
            return Ok(Vec::new());
        }

        let columns = header
            .iter()
            .map(parse_column)
            .collect::<Result<Vec<_>>>()?;

        if !columns.iter().any(|column| matches!(column, Column::Game)) {
            return Err(RaterError::FlatFile {
                message: format!(
                    "{} has no '{}' column",
                    self.path.display(),
                    GAME_COLUMN
                ),
            }
            .into());
        }

        let mut rows = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = record?;
            let mut row = FlatFileRow {
                game: String::new(),
                ratings: Ratings::new(),
                overall: None,
            };

            for (column, field) in columns.iter().zip(record.iter()) {
                match column {
                    Column::Game => row.game = field.to_string(),
                    Column::Overall => row.overall = parse_cell(field, index)?,
                    Column::Rating(category) => {
                        if let Some(value) = parse_cell(field, index)? {
                            row.ratings.insert(*category, value);
                        }
                    }
                }
            }
            rows.push(row);
        }

        debug!("Read {} rows from {}", rows.len(), self.path.display());
        Ok(rows)
    }

    /// Append one record and rewrite the whole file in the full schema.
    /// Returns the number of data rows now stored.
    pub fn append(&self, record: &RatingRecord) -> Result<usize> {
        let mut rows = self.read_all()?;
        rows.push(FlatFileRow::from(record));
        self.write_all(&rows)?;

        info!(
            "Saved rating for '{}' to {} ({} rows)",
            record.name(),
            self.path.display(),
            rows.len()
        );
        Ok(rows.len())
    }

    fn write_all(&self, rows: &[FlatFileRow]) -> Result<()> {
        let directory = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut temp = tempfile::NamedTempFile::new_in(&directory).with_context(|| {
            format!("Failed to create temporary file in {}", directory.display())
        })?;

        {
            let mut writer = csv::Writer::from_writer(temp.as_file_mut());
            writer.write_record(flat_file_header())?;
            for row in rows {
                writer.write_record(row.to_fields())?;
            }
            writer.flush()?;
        }

        temp.persist(&self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

/// Append one record to the flat file at `path`, creating it when absent
pub fn append_to_flat_file(path: impl AsRef<Path>, record: &RatingRecord) -> Result<usize> {
    FlatFileLog::new(path.as_ref()).append(record)
}

/// Shortest text that reads back as the same value; whole numbers keep one
/// decimal ("7.0") to match rows written on the rating grid.
fn format_cell(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

fn parse_column(header: &str) -> Result<Column> {
    let header = header.trim();
    if header == GAME_COLUMN {
        return Ok(Column::Game);
    }
    if header == OVERALL_COLUMN {
        return Ok(Column::Overall);
    }
    header
        .parse::<Category>()
        .map(Column::Rating)
        .map_err(|_| {
            RaterError::FlatFile {
                message: format!("unexpected column '{}'", header),
            }
            .into()
        })
}

fn parse_cell(field: &str, row_index: usize) -> Result<Option<f64>> {
    let field = field.trim();
    if field.is_empty() {
        return Ok(None);
    }
    field.parse::<f64>().map(Some).map_err(|_| {
        RaterError::FlatFile {
            message: format!("row {}: '{}' is not a number", row_index + 1, field),
        }
        .into()
    })
}
