//! Integration tests for the board game rater
//!
//! These tests drive complete rating sessions through the public API:
//! - Catalog lookup with fallback to manual entry
//! - Scoring and recording of submissions
//! - CSV accumulation across sessions
//! - JSON export and import between sessions

mod fixtures;

use boardgame_rater::catalog::StaticCatalog;
use boardgame_rater::config::AppConfig;
use boardgame_rater::history::{flat_file_header, FlatFileLog};
use boardgame_rater::session::{SideEffect, View};
use boardgame_rater::types::Category;
use boardgame_rater::{RatingForm, RatingSession, SessionRequest, WeightedScoreCalculator};
use std::fs;
use std::sync::Arc;

use fixtures::{scenario_ratings, FlakyCatalog, CATALOG_TOML};

fn scenario_form(name: &str) -> RatingForm {
    let mut form = RatingForm::new(name, false);
    form.ratings = scenario_ratings();
    form
}

#[test]
fn test_complete_catalog_workflow() {
    let dir = tempfile::tempdir().unwrap();
    let catalog_path = dir.path().join("catalog.toml");
    let csv_path = dir.path().join("ratings.csv");
    fs::write(&catalog_path, CATALOG_TOML).unwrap();

    let mut config = AppConfig::default();
    config.storage.catalog_path = Some(catalog_path);
    config.storage.flat_file_path = csv_path.clone();
    let mut session = RatingSession::from_config(&config).unwrap();

    // Step 1: search the catalog
    let response = session.handle(SessionRequest::Search {
        query: "fri".to_string(),
    });
    let hits = match response.view {
        View::Candidates(hits) => hits,
        other => panic!("unexpected view: {:?}", other),
    };
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "Friday");

    // Step 2: select it, the one-player game suggests solo-only
    let response = session.handle(SessionRequest::Select {
        id: hits[0].id.clone(),
    });
    let form = match response.view {
        View::Game { form, details, .. } => {
            assert_eq!(details.playing_time, Some(25));
            form
        }
        other => panic!("unexpected view: {:?}", other),
    };
    assert!(form.solo_only);
    assert!(form
        .sliders
        .iter()
        .all(|slider| slider.category != Category::Interactivity));

    // Step 3: submit constant ratings
    let mut submission = RatingForm::new(form.game_name.unwrap(), form.solo_only);
    for slider in &form.sliders {
        submission = submission.with_rating(slider.category, 5.0);
    }
    let response = session.handle(SessionRequest::Submit(submission));
    assert!(response.is_ok(), "{:?}", response.warnings);

    match &response.view {
        View::Scored { record, .. } => {
            assert_eq!(record.name(), "Friday");
            assert_eq!(record.score(), 5.0);
            assert_eq!(record.ratings().len(), 12);
        }
        other => panic!("unexpected view: {:?}", other),
    }
    assert!(response.effects.contains(&SideEffect::AppendedToFlatFile {
        path: csv_path.clone(),
        rows: 1
    }));

    let contents = fs::read_to_string(&csv_path).unwrap();
    assert_eq!(contents.lines().count(), 2);
}

#[test]
fn test_reference_scenario_score() {
    let mut session =
        RatingSession::new(WeightedScoreCalculator::default(), Box::new(StaticCatalog::default()));

    let response = session.handle(SessionRequest::Submit(scenario_form("Brass: Birmingham")));
    match response.view {
        View::Scored { record, card } => {
            assert!((card.weighted_total - 7.86).abs() < 1e-9);
            assert_eq!(record.score(), 8.0);
            assert_eq!(card.breakdown.len(), 13);
        }
        other => panic!("unexpected view: {:?}", other),
    }
}

#[test]
fn test_catalog_outage_then_recovery() {
    let catalog = Arc::new(FlakyCatalog::new(1));
    let mut session =
        RatingSession::new(WeightedScoreCalculator::default(), Box::new(catalog.clone()));

    let response = session.handle(SessionRequest::Search {
        query: "Azul".to_string(),
    });
    assert_eq!(response.warnings.len(), 1);
    assert!(matches!(response.view, View::Form(_)));

    // manual entry still works while the catalog is down
    let response = session.handle(SessionRequest::Submit(RatingForm::new("Azul", false)));
    assert!(response.is_ok());

    let response = session.handle(SessionRequest::Search {
        query: "Azul".to_string(),
    });
    assert!(response.is_ok());
    assert!(matches!(response.view, View::Candidates(ref hits) if hits.len() == 1));

    assert_eq!(catalog.get_queries(), vec!["Azul".to_string(), "Azul".to_string()]);
    assert_eq!(session.history().len(), 1);
}

#[test]
fn test_flat_file_accumulates_across_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("ratings.csv");

    for name in ["Azul", "Root"] {
        let mut session = RatingSession::new(
            WeightedScoreCalculator::default(),
            Box::new(StaticCatalog::default()),
        )
        .with_flat_file(FlatFileLog::new(&csv_path));
        let response = session.handle(SessionRequest::Submit(RatingForm::new(name, false)));
        assert!(response.is_ok(), "{:?}", response.warnings);
    }

    let contents = fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], flat_file_header().join(","));

    let rows = FlatFileLog::new(&csv_path).read_all().unwrap();
    let games: Vec<_> = rows.iter().map(|row| row.game.as_str()).collect();
    assert_eq!(games, vec!["Azul", "Root"]);
    assert!(rows.iter().all(|row| row.overall == Some(7.0)));
}

#[test]
fn test_export_import_between_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let export_path = dir.path().join("session.json");

    let mut first =
        RatingSession::new(WeightedScoreCalculator::default(), Box::new(StaticCatalog::default()));
    first.handle(SessionRequest::Submit(scenario_form("Brass: Birmingham")));
    first.handle(SessionRequest::Submit(
        RatingForm::new("Friday", true).with_rating(Category::Gameplay, 8.5),
    ));
    first.handle(SessionRequest::Submit(scenario_form("Brass: Birmingham")));

    match first.handle(SessionRequest::Export).view {
        View::Exported { json, records } => {
            assert_eq!(records, 3);
            fs::write(&export_path, json).unwrap();
        }
        other => panic!("unexpected view: {:?}", other),
    }

    let mut second =
        RatingSession::new(WeightedScoreCalculator::default(), Box::new(StaticCatalog::default()));
    let payload = fs::read_to_string(&export_path).unwrap();
    let response = second.handle(SessionRequest::Import { payload });
    assert_eq!(response.effects, vec![SideEffect::HistoryReplaced { records: 3 }]);
    assert_eq!(second.history(), first.history());

    // the solo rating leaves its interactivity cell empty in the table
    let table = match second.handle(SessionRequest::Table).view {
        View::Table(table) => table,
        other => panic!("unexpected view: {:?}", other),
    };
    let interactivity = table
        .categories
        .iter()
        .position(|category| *category == Category::Interactivity)
        .unwrap();
    assert_eq!(table.rows[1].cells[interactivity], None);
    assert_eq!(table.rows[0].cells[interactivity], Some(7.0));
}
