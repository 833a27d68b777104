//! Interactive rating sessions
//!
//! This module turns user interactions into explicit requests and responses
//! over the scoring calculator, the rating history and the catalog.

pub mod handler;

// Re-export commonly used types
pub use handler::{
    FormModel, RatingForm, RatingSession, SessionRequest, SessionResponse, SideEffect, Slider,
    View,
};
