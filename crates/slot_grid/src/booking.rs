use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity handed out by whatever persists bookings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(pub u64);

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub start: DateTime<Utc>,
    pub duration_minutes: u32,
    pub owner: String,
    pub note: String,
}

impl Booking {
    pub fn new(
        id: BookingId,
        start: DateTime<Utc>,
        duration_minutes: u32,
        owner: impl Into<String>,
        note: impl Into<String>,
    ) -> Self {
        Self {
            id,
            start,
            duration_minutes,
            owner: owner.into(),
            note: note.into(),
        }
    }

    /// Exclusive end of the booking
    pub fn end(&self) -> DateTime<Utc> {
        self.start + Duration::minutes(i64::from(self.duration_minutes))
    }
}
