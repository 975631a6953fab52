use crate::{
    booking::{Booking, BookingId},
    constants::DAYS_PER_WEEK,
    error::PlacementError,
    grid::{SlotDescriptor, WeekGrid},
    instant::{format_instant, parse_instant},
};
use chrono::{DateTime, Duration, Utc};
use log::{debug, warn};
use std::collections::{BTreeMap, HashSet};

/// Which booking occupies which slot, keyed by slot instant.
///
/// Values are never changed in place: [`assign`] returns a new mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotAssignment {
    slots: BTreeMap<DateTime<Utc>, Booking>,
}

impl SlotAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Booking in the slot starting at `instant`, `None` if the slot is empty
    pub fn get(&self, instant: &DateTime<Utc>) -> Option<&Booking> {
        self.slots.get(instant)
    }

    /// Lookup by the serialized form produced by [`SlotDescriptor::key`]
    pub fn get_by_key(&self, key: &str) -> Option<&Booking> {
        let instant = parse_instant(key).ok()?;
        self.get(&instant)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Occupied slots in ascending instant order
    pub fn iter(&self) -> impl Iterator<Item = (&DateTime<Utc>, &Booking)> {
        self.slots.iter()
    }

    /// Distinct bookings, ordered by the first slot they occupy
    pub fn bookings(&self) -> Vec<&Booking> {
        let mut seen = HashSet::new();
        self.slots
            .values()
            .filter(|booking| seen.insert(booking.id))
            .collect()
    }

    /// Bookings other than `booking` already holding any of `slots`.
    pub fn conflicts(&self, booking: &Booking, slots: &[SlotDescriptor]) -> Vec<&Booking> {
        let mut seen: HashSet<BookingId> = HashSet::new();
        slots
            .iter()
            .filter_map(|slot| self.slots.get(&slot.instant))
            .filter(|other| other.id != booking.id && seen.insert(other.id))
            .collect()
    }
}

/// Result of seeding an assignment for a freshly activated week view.
#[derive(Debug, Clone, Default)]
pub struct WeekPlacement {
    pub assignment: SlotAssignment,
    /// Bookings of the week that could not be placed, with the reason
    pub rejected: Vec<(Booking, PlacementError)>,
}

/// Computes the slots a booking occupies, in increasing time order.
///
/// # Errors
/// * `MisalignedDuration` - duration is zero or not a multiple of the slot resolution
/// * `OutOfRange` - the start is not a slot of `grid`
/// * `CrossesDayBoundary` - the run would continue past the day's last slot
pub fn slots_for_booking(
    booking: &Booking,
    grid: &WeekGrid,
) -> Result<Vec<SlotDescriptor>, PlacementError> {
    let slots = slots_for_span(booking.start, booking.duration_minutes, grid)?;
    debug!(
        "Booking {} placed on {} slot(s) from {}",
        booking.id,
        slots.len(),
        format_instant(&booking.start)
    );
    Ok(slots)
}

/// Same as [`slots_for_booking`] for input that has no booking identity yet.
pub fn slots_for_span(
    start: DateTime<Utc>,
    duration_minutes: u32,
    grid: &WeekGrid,
) -> Result<Vec<SlotDescriptor>, PlacementError> {
    let resolution = grid.config().slot_resolution_minutes;
    if duration_minutes == 0 || duration_minutes % resolution != 0 {
        return Err(PlacementError::MisalignedDuration {
            duration_minutes,
            resolution_minutes: resolution,
        });
    }
    let slot_count = duration_minutes / resolution;

    let first = grid
        .locate(start)
        .ok_or(PlacementError::OutOfRange { start })?;

    let slots_per_day = grid.slots_per_day();
    // `locate` keeps the index below `slots_per_day`
    if slot_count > slots_per_day - first.time_of_day_slot_index {
        return Err(PlacementError::CrossesDayBoundary {
            start,
            slot_count,
            slots_per_day,
        });
    }

    // Every instant is derived from the untouched start.
    Ok((0..slot_count)
        .map(|k| SlotDescriptor {
            day_offset: first.day_offset,
            time_of_day_slot_index: first.time_of_day_slot_index + k,
            instant: start + Duration::minutes(i64::from(k * resolution)),
        })
        .collect())
}

/// Returns `existing` with every slot in `slots` mapped to `booking`.
///
/// Earlier occupants of those slots are overwritten. Applying the same
/// booking and slots again yields an identical mapping.
pub fn assign(
    existing: &SlotAssignment,
    booking: &Booking,
    slots: &[SlotDescriptor],
) -> SlotAssignment {
    let mut next = existing.clone();
    for slot in slots {
        next.slots.insert(slot.instant, booking.clone());
    }
    next
}

/// Bookings starting within `[week_start, week_start + 7 days)`.
///
/// The iterator is lazy and can be cloned to walk the same bookings again.
pub fn bookings_in_week(
    bookings: &[Booking],
    week_start: DateTime<Utc>,
) -> impl Iterator<Item = &Booking> + Clone {
    let week_end = week_start + Duration::days(i64::from(DAYS_PER_WEEK));
    bookings
        .iter()
        .filter(move |booking| booking.start >= week_start && booking.start < week_end)
}

/// Builds the assignment for `grid` from a caller-owned booking collection.
///
/// Bookings outside the week are skipped. Bookings inside the week that
/// cannot be placed are returned in `rejected`.
pub fn place_week(grid: &WeekGrid, bookings: &[Booking]) -> WeekPlacement {
    let mut placement = WeekPlacement::default();

    for booking in bookings_in_week(bookings, grid.week_start()) {
        match slots_for_booking(booking, grid) {
            Ok(slots) => {
                placement.assignment = assign(&placement.assignment, booking, &slots);
            }
            Err(e) => {
                warn!("Booking {} not placed: {e}", booking.id);
                placement.rejected.push((booking.clone(), e));
            }
        }
    }

    placement
}
