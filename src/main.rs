//! Main entry point for the board game rater
//!
//! Offers one-shot ratings, a look at the weight table and the accumulated
//! ratings file, and a line-oriented interactive session.

use anyhow::Result;
use boardgame_rater::config::AppConfig;
use boardgame_rater::history::FlatFileLog;
use boardgame_rater::session::{FormModel, View};
use boardgame_rater::types::Category;
use boardgame_rater::utils::format_rating;
use boardgame_rater::{RatingForm, RatingSession, SessionRequest, SessionResponse};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{error, info};

/// Board Game Rater - weighted multi-category board game ratings
#[derive(Parser)]
#[command(
    name = "boardgame-rater",
    version,
    about = "Rate board games across weighted categories",
    long_about = "Board Game Rater scores a game across thirteen weighted categories, rounds the \
                 weighted average to the nearest half point and appends every rating to a CSV \
                 file. Interactive sessions can look games up in an offline catalog and export \
                 or import the session history as JSON."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Ratings file override
    #[arg(long, value_name = "FILE", help = "Override the CSV ratings file")]
    csv: Option<PathBuf>,

    /// Catalog file override
    #[arg(long, value_name = "FILE", help = "Override the offline catalog file")]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rate a single game and append it to the ratings file
    Rate {
        /// Game title
        #[arg(short, long)]
        game: String,

        /// Leave interactivity out of the score
        #[arg(long)]
        solo: bool,

        /// Category rating, e.g. --set gameplay=8.5 (others keep the default)
        #[arg(
            short = 's',
            long = "set",
            value_name = "CATEGORY=VALUE",
            value_parser = parse_rating_arg
        )]
        ratings: Vec<(Category, f64)>,

        /// Do not append to the ratings file
        #[arg(long)]
        no_save: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the normalized weight table
    Weights {
        /// Show the weights of a solo-only game
        #[arg(long)]
        solo: bool,
    },

    /// Show every rating accumulated in the ratings file
    History,

    /// Start an interactive rating session
    Session,
}

fn parse_rating_arg(value: &str) -> std::result::Result<(Category, f64), String> {
    let (category, rating) = value
        .split_once('=')
        .ok_or_else(|| format!("expected CATEGORY=VALUE, got '{}'", value))?;
    let category: Category = category.parse().map_err(|e| format!("{}", e))?;
    let rating: f64 = rating
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", rating))?;
    Ok((category, rating))
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Load and merge configuration from environment, file and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if let Some(csv) = &args.csv {
        config.storage.flat_file_path = csv.clone();
    }

    if let Some(catalog) = &args.catalog {
        config.storage.catalog_path = Some(catalog.clone());
    }

    boardgame_rater::config::validate_config(&config)?;
    Ok(config)
}

fn print_warnings(response: &SessionResponse) {
    for warning in &response.warnings {
        println!("⚠️  {}", warning);
    }
}

fn print_form(form: &FormModel) {
    match &form.game_name {
        Some(name) => println!("📋 Rating form for {}", name),
        None => println!("📋 Rating form (set the game with `name <title>`)"),
    }
    println!("   Solo-only: {}", if form.solo_only { "yes" } else { "no" });
    for slider in &form.sliders {
        println!(
            "   {:<20} {} ({}-{}, step {})",
            slider.label,
            format_rating(slider.value),
            slider.min,
            slider.max,
            slider.step
        );
    }
}

fn print_view(view: &View) {
    match view {
        View::Candidates(hits) => {
            for hit in hits {
                println!("   [{}] {}", hit.id, hit.name);
            }
        }
        View::Game { id, details, form } => {
            println!("🎲 {} [{}]", details.name.as_deref().unwrap_or("Unknown title"), id);
            if let Some(range) = details.player_range() {
                println!("   Players: {}", range);
            }
            if let Some(time) = details.playing_time {
                println!("   Playing time: {} min", time);
            }
            if let Some(average) = details.average_rating {
                println!("   Catalog average: {:.2}", average);
            }
            if let Some(thumbnail) = &details.thumbnail {
                println!("   Image: {}", thumbnail);
            }
            print_form(form);
        }
        View::Form(form) => print_form(form),
        View::Scored { record, card } => {
            println!(
                "✅ Overall rating for {}: {}",
                record.name(),
                format_rating(record.score())
            );
            println!("🧾 Score breakdown");
            for line in &card.breakdown {
                println!(
                    "   {:<20} {:>5}  weight {:.3}",
                    line.label,
                    format_rating(line.rating),
                    line.weight
                );
            }
        }
        View::Table(table) => {
            if table.is_empty() {
                println!("No ratings in this session yet");
            } else {
                print!("{}", table);
            }
        }
        View::Exported { records, .. } => println!("📁 Exported {} ratings", records),
        View::Imported { records } => println!("📂 Imported {} ratings", records),
    }
}

fn run_rate(
    config: &AppConfig,
    game: String,
    solo: bool,
    ratings: Vec<(Category, f64)>,
    no_save: bool,
    json: bool,
) -> Result<()> {
    let mut session = RatingSession::from_config(config)?;
    if no_save {
        session = session.without_flat_file();
    }

    let mut form = RatingForm::new(game, solo);
    for (category, value) in ratings {
        form = form.with_rating(category, value);
    }

    let response = session.handle(SessionRequest::Submit(form));
    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print_view(&response.view);
        print_warnings(&response);
    }

    if matches!(response.view, View::Scored { .. }) {
        Ok(())
    } else {
        Err(anyhow::anyhow!("Rating was not recorded"))
    }
}

fn run_weights(config: &AppConfig, solo: bool) -> Result<()> {
    let weights = config.category_weights()?;
    let calculator = boardgame_rater::WeightedScoreCalculator::new(weights);
    let normalized = calculator.normalized(solo)?;

    println!("Category weights{}", if solo { " (solo-only)" } else { "" });
    for (category, weight) in normalized.iter() {
        println!("   {:<20} {:.4}", category.label(), weight);
    }
    Ok(())
}

fn run_history(config: &AppConfig) -> Result<()> {
    let log = FlatFileLog::new(&config.storage.flat_file_path);
    let rows = log.read_all()?;
    if rows.is_empty() {
        println!("No ratings saved in {}", log.path().display());
        return Ok(());
    }

    for row in rows {
        println!(
            "{:<32} {}",
            row.game,
            row.overall.map(format_rating).unwrap_or_else(|| "-".to_string())
        );
    }
    Ok(())
}

const SESSION_HELP: &str = "Commands:
  search <query>        look a game up in the catalog
  select <id>           load a catalog game into the form
  name <title>          set the game title manually
  solo on|off           toggle the solo-only flag
  set <category> <n>    set a category rating (1-10, step 0.5)
  form                  show the current form
  submit                score and save the current form
  table                 show this session's ratings
  export <file>         write this session's ratings as JSON
  import <file>         replace this session's ratings from JSON
  help                  show this help
  quit                  end the session";

fn run_session(config: &AppConfig) -> Result<()> {
    let mut session = RatingSession::from_config(config)?;
    let mut draft = RatingForm::default();

    println!("🎲 Board Game Rater {}", boardgame_rater::VERSION);
    println!("{}", SESSION_HELP);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else { break };
        let line = line?;
        let (command, rest) = match line.trim().split_once(char::is_whitespace) {
            Some((command, rest)) => (command.to_string(), rest.trim().to_string()),
            None => (line.trim().to_string(), String::new()),
        };

        let request = match command.as_str() {
            "" => continue,
            "quit" | "exit" => break,
            "help" => {
                println!("{}", SESSION_HELP);
                continue;
            }
            "name" => {
                draft.game_name = rest.clone();
                continue;
            }
            "solo" => {
                draft.solo_only = matches!(rest.as_str(), "on" | "yes" | "true");
                if draft.solo_only {
                    draft.ratings.remove(&boardgame_rater::scoring::SOLO_EXCLUDED_CATEGORY);
                }
                SessionRequest::Form {
                    solo_only: draft.solo_only,
                }
            }
            "set" => match rest.split_once(char::is_whitespace) {
                Some((category, value)) => {
                    match parse_rating_arg(&format!("{}={}", category, value)) {
                        Ok((category, value)) => {
                            draft.ratings.insert(category, value);
                        }
                        Err(e) => println!("⚠️  {}", e),
                    }
                    continue;
                }
                None => {
                    println!("⚠️  usage: set <category> <value>");
                    continue;
                }
            },
            "form" => {
                let name = Some(draft.game_name.clone()).filter(|name| !name.is_empty());
                print_form(&session.form_model(name, draft.solo_only, &draft.ratings));
                continue;
            }
            "search" => SessionRequest::Search {
                query: rest.clone(),
            },
            "select" => SessionRequest::Select { id: rest.clone() },
            "submit" => SessionRequest::Submit(draft.clone()),
            "table" => SessionRequest::Table,
            "export" | "import" if rest.is_empty() => {
                println!("⚠️  usage: {} <file>", command);
                continue;
            }
            "export" => SessionRequest::Export,
            "import" => match std::fs::read_to_string(&rest) {
                Ok(payload) => SessionRequest::Import { payload },
                Err(e) => {
                    println!("⚠️  Cannot read {}: {}", rest, e);
                    continue;
                }
            },
            other => {
                println!("⚠️  Unknown command '{}', try `help`", other);
                continue;
            }
        };

        let response = session.handle(request);
        match &response.view {
            View::Game { form, .. } => {
                draft.game_name = form.game_name.clone().unwrap_or_default();
                draft.solo_only = form.solo_only;
                draft.ratings.clear();
            }
            View::Scored { .. } => draft = RatingForm::default(),
            View::Exported { json, .. } => {
                if let Err(e) = std::fs::write(&rest, json) {
                    error!("Failed to write {}: {}", rest, e);
                    println!("⚠️  Cannot write {}: {}", rest, e);
                    continue;
                }
                info!("Wrote session export to {}", rest);
            }
            _ => {}
        }
        print_view(&response.view);
        print_warnings(&response);
    }

    println!("👋 Rated {} games this session", session.history().len());
    Ok(())
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {:#}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!(
        "Starting {} (ratings file: {})",
        config.service.name,
        config.storage.flat_file_path.display()
    );

    match args.command {
        Command::Rate {
            game,
            solo,
            ratings,
            no_save,
            json,
        } => run_rate(&config, game, solo, ratings, no_save, json),
        Command::Weights { solo } => run_weights(&config, solo),
        Command::History => run_history(&config),
        Command::Session => run_session(&config),
    }
}
