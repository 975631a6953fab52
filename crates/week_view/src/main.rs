mod config;
mod error;
mod export;
mod store;
mod view;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info, warn};
use slot_grid::{
    WeekGrid, WeekPlacement, assign, build_week, format_instant, parse_instant, place_week,
    slots_for_booking, slots_for_span,
};
use std::path::PathBuf;

use crate::{config::Config, store::BookingStore, view::WeekView};

#[derive(Parser)]
#[command(author, version, about = "Weekly booking calendar", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a week with its bookings
    Show {
        /// Any date inside the week (defaults to today)
        #[arg(short = 'w', long = "week")]
        week: Option<NaiveDate>,
    },

    /// Create a booking and show it in its week
    Book {
        #[arg(short = 'o', long = "owner")]
        owner: String,

        /// RFC 3339 start, e.g. 2024-01-01T09:00:00Z
        #[arg(short = 's', long = "start")]
        start: String,

        /// Minutes (defaults to booking.default_duration_minutes)
        #[arg(short = 'd', long = "duration")]
        duration: Option<u32>,

        #[arg(short = 'n', long = "note", default_value = "")]
        note: String,
    },

    /// Write a week to a CSV or JSON file
    Export {
        #[arg(short = 'w', long = "week")]
        week: Option<NaiveDate>,

        #[arg(short = 'o', long = "out", default_value = "export")]
        out: PathBuf,

        #[arg(short = 'f', long = "format", value_enum, default_value_t = Format::Csv)]
        format: Format,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Json,
}

fn main() -> Result<()> {
    // Initialize logger - defaults to RUST_LOG if set, otherwise INFO
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    let args = Args::parse();
    let config = Config::from_env()?;
    let store = BookingStore::open(config.bookings_path());
    debug!("Booking store: {}", store.path().display());

    match args.command {
        Command::Show { week } => show(&config, &store, week),
        Command::Book {
            owner,
            start,
            duration,
            note,
        } => book(&config, &store, &owner, &start, duration, &note),
        Command::Export { week, out, format } => export(&config, &store, week, out, format),
    }
}

fn week_start(config: &Config, week: Option<NaiveDate>) -> DateTime<Utc> {
    config.week_start_for(week.unwrap_or_else(|| Utc::now().date_naive()))
}

/// Builds the grid of a week and places the stored bookings on it.
fn load_week(
    config: &Config,
    store: &BookingStore,
    week_start: DateTime<Utc>,
) -> Result<(WeekGrid, WeekPlacement)> {
    let grid = build_week(week_start, &config.grid)?;
    let bookings = store.load_all()?;
    let placement = place_week(&grid, &bookings);

    for (booking, e) in &placement.rejected {
        warn!("Booking {} ({}) cannot be shown: {e}", booking.id, booking.owner);
    }
    Ok((grid, placement))
}

fn show(config: &Config, store: &BookingStore, week: Option<NaiveDate>) -> Result<()> {
    let (grid, placement) = load_week(config, store, week_start(config, week))?;
    let view = WeekView::project(&grid, &placement.assignment);

    print!("{}", view.render_text());
    info!(
        "{} booking(s) on {} slot(s)",
        placement.assignment.bookings().len(),
        view.booked_cells()
    );
    Ok(())
}

fn book(
    config: &Config,
    store: &BookingStore,
    owner: &str,
    start: &str,
    duration: Option<u32>,
    note: &str,
) -> Result<()> {
    let start = parse_instant(start)?;
    let duration = duration.unwrap_or(config.booking.default_duration_minutes);
    let (grid, placement) = load_week(config, store, config.week_start_for(start.date_naive()))?;

    // Reject bad input before the store hands out an id.
    slots_for_span(start, duration, &grid)
        .with_context(|| format!("Cannot book {duration}m at {}", format_instant(&start)))?;

    let booking = store.create_booking(owner, start, duration, note)?;
    info!("Created booking {} for {}", booking.id, booking.owner);

    let slots = slots_for_booking(&booking, &grid)?;
    for other in placement.assignment.conflicts(&booking, &slots) {
        warn!(
            "Booking {} overlaps booking {} ({}), showing the newer one",
            booking.id, other.id, other.owner
        );
    }
    let assignment = assign(&placement.assignment, &booking, &slots);

    print!("{}", WeekView::project(&grid, &assignment).render_text());
    Ok(())
}

fn export(
    config: &Config,
    store: &BookingStore,
    week: Option<NaiveDate>,
    out: PathBuf,
    format: Format,
) -> Result<()> {
    let (grid, placement) = load_week(config, store, week_start(config, week))?;
    let view = WeekView::project(&grid, &placement.assignment);

    let path = match format {
        Format::Csv => export::export_to_csv_with_path(&view, Some(out.as_path()))?,
        Format::Json => export::export_to_json_with_path(&view, Some(out.as_path()))?,
    };
    info!("Week exported to: {}", path.display());
    Ok(())
}
