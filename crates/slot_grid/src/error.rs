use chrono::{DateTime, Utc};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SlotGridError>;

#[derive(Debug, Error)]
pub enum SlotGridError {
    #[error("Invalid grid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Placement(#[from] PlacementError),

    #[error("Invalid instant '{value}'")]
    InvalidInstant {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<toml::de::Error> for SlotGridError {
    fn from(err: toml::de::Error) -> Self {
        SlotGridError::Config(format!("TOML parse error: {}", err))
    }
}

/// Reasons a booking cannot be placed onto a week grid.
///
/// All of these are recoverable: the caller corrects the booking (or picks
/// another week) and tries again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error(
        "Booking duration {duration_minutes}m is not a positive multiple of the {resolution_minutes}m slot resolution"
    )]
    MisalignedDuration {
        duration_minutes: u32,
        resolution_minutes: u32,
    },

    #[error("Booking start {start} is not a slot of this week")]
    OutOfRange { start: DateTime<Utc> },

    #[error(
        "Booking starting {start} needs {slot_count} slots and would run past the last of {slots_per_day} slots of its day"
    )]
    CrossesDayBoundary {
        start: DateTime<Utc>,
        slot_count: u32,
        slots_per_day: u32,
    },
}
