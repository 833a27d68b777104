//! Rating persistence
//!
//! Two independent persistence paths live here: the session-scoped
//! [`RatingHistory`] with its JSON export/import, and the run-spanning CSV
//! [`FlatFileLog`] that accumulates every submission.

pub mod flat_file;
pub mod store;

// Re-export commonly used types
pub use flat_file::{append_to_flat_file, flat_file_header, FlatFileLog, FlatFileRow};
pub use store::{RatingHistory, RatingTable, TableRow};
