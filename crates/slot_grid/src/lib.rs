pub mod booking;
pub mod config;
pub mod constants;
pub mod error;
pub mod grid;
pub mod instant;
pub mod placer;

pub use booking::{Booking, BookingId};
pub use config::{GridConfig, slots_per_day, total_slots};
pub use constants::{DAYS_PER_WEEK, MINUTES_PER_DAY};
pub use error::{PlacementError, Result, SlotGridError};
pub use grid::{SlotDescriptor, WeekGrid, build_week, locate_slot};
pub use instant::{format_instant, parse_instant};
pub use placer::{
    SlotAssignment, WeekPlacement, assign, bookings_in_week, place_week, slots_for_booking,
    slots_for_span,
};
