use crate::{
    config::{GridConfig, slots_per_day, total_slots},
    constants::DAYS_PER_WEEK,
    error::Result,
    instant::format_instant,
};
use chrono::{DateTime, Duration, Utc};
use log::debug;
use serde::Serialize;

const NANOS_PER_MINUTE: i64 = 60 * 1_000_000_000;

/// A single bookable slot of a week grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SlotDescriptor {
    /// 0 is the first day of the displayed week
    pub day_offset: u32,
    pub time_of_day_slot_index: u32,
    /// Absolute start of the slot, unique within its grid
    pub instant: DateTime<Utc>,
}

impl SlotDescriptor {
    /// Join key between a rendered slot and [`crate::SlotAssignment`] lookups
    pub fn key(&self) -> String {
        format_instant(&self.instant)
    }
}

/// The slots of one displayed week.
///
/// Slots are stored row-major: every day for time-of-day index 0, then every
/// day for index 1, and so on. Renderers lay rows out as time and columns as
/// days and may rely on this order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekGrid {
    week_start: DateTime<Utc>,
    config: GridConfig,
    slots: Vec<SlotDescriptor>,
}

impl WeekGrid {
    /// Builds the grid for the week beginning at `week_start`.
    ///
    /// `week_start` must already be the day boundary the caller wants as day
    /// offset 0. No weekday alignment happens here.
    ///
    /// # Errors
    /// Returns `InvalidConfig` if `config` fails validation
    pub fn build(week_start: DateTime<Utc>, config: &GridConfig) -> Result<Self> {
        config.validate()?;

        let per_day = slots_per_day(config);
        let mut slots = Vec::with_capacity(total_slots(config) as usize);
        for index in 0..per_day {
            for day_offset in 0..DAYS_PER_WEEK {
                slots.push(SlotDescriptor {
                    day_offset,
                    time_of_day_slot_index: index,
                    instant: slot_instant(week_start, config, day_offset, index),
                });
            }
        }

        debug!(
            "Built week grid from {} with {} slots ({} per day)",
            format_instant(&week_start),
            slots.len(),
            per_day
        );

        Ok(Self {
            week_start,
            config: *config,
            slots,
        })
    }

    pub fn week_start(&self) -> DateTime<Utc> {
        self.week_start
    }

    /// Exclusive end of the week, `week_start + 7 days`
    pub fn week_end(&self) -> DateTime<Utc> {
        self.week_start + Duration::days(i64::from(DAYS_PER_WEEK))
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn slots(&self) -> &[SlotDescriptor] {
        &self.slots
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SlotDescriptor> {
        self.slots.iter()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots_per_day(&self) -> u32 {
        slots_per_day(&self.config)
    }

    /// One row per time of day, each holding the slots of day 0..=6
    pub fn rows(&self) -> std::slice::Chunks<'_, SlotDescriptor> {
        self.slots.chunks(DAYS_PER_WEEK as usize)
    }

    /// Opening instant of the given day
    pub fn day_start(&self, day_offset: u32) -> DateTime<Utc> {
        slot_instant(self.week_start, &self.config, day_offset, 0)
    }

    pub fn slot_at(&self, day_offset: u32, time_of_day_slot_index: u32) -> Option<&SlotDescriptor> {
        if day_offset >= DAYS_PER_WEEK || time_of_day_slot_index >= self.slots_per_day() {
            return None;
        }
        let position = time_of_day_slot_index * DAYS_PER_WEEK + day_offset;
        self.slots.get(position as usize)
    }

    /// Finds the slot starting exactly at `instant`.
    ///
    /// Returns `None` (not in grid) when the instant lies outside the week,
    /// outside operating hours of its day, or between two slot boundaries.
    pub fn locate(&self, instant: DateTime<Utc>) -> Option<SlotDescriptor> {
        let elapsed = instant.signed_duration_since(self.week_start);
        if elapsed < Duration::zero() || instant >= self.week_end() {
            return None;
        }

        let day_offset = elapsed.num_days();
        let since_open = elapsed
            - Duration::days(day_offset)
            - Duration::hours(i64::from(self.config.start_hour));
        if since_open < Duration::zero()
            || since_open >= Duration::minutes(i64::from(self.config.operating_minutes()))
        {
            return None;
        }

        let slot_nanos = i64::from(self.config.slot_resolution_minutes) * NANOS_PER_MINUTE;
        let nanos = since_open.num_nanoseconds()?;
        if nanos % slot_nanos != 0 {
            return None;
        }

        self.slot_at(day_offset as u32, (nanos / slot_nanos) as u32).copied()
    }
}

impl<'a> IntoIterator for &'a WeekGrid {
    type Item = &'a SlotDescriptor;
    type IntoIter = std::slice::Iter<'a, SlotDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Builds the grid of one week. See [`WeekGrid::build`].
pub fn build_week(week_start: DateTime<Utc>, config: &GridConfig) -> Result<WeekGrid> {
    WeekGrid::build(week_start, config)
}

/// Maps an instant to the slot starting at it. See [`WeekGrid::locate`].
pub fn locate_slot(grid: &WeekGrid, instant: DateTime<Utc>) -> Option<SlotDescriptor> {
    grid.locate(instant)
}

fn slot_instant(
    week_start: DateTime<Utc>,
    config: &GridConfig,
    day_offset: u32,
    time_of_day_slot_index: u32,
) -> DateTime<Utc> {
    week_start
        + Duration::days(i64::from(day_offset))
        + Duration::hours(i64::from(config.start_hour))
        + Duration::minutes(i64::from(time_of_day_slot_index * config.slot_resolution_minutes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SlotGridError;
    use chrono::TimeZone;
    use std::collections::HashSet;

    fn monday() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, hour, minute, 0).unwrap()
    }

    fn default_grid() -> WeekGrid {
        build_week(monday(), &GridConfig::default()).unwrap()
    }

    #[test]
    fn test_build_week_slot_count() {
        let grid = default_grid();
        assert_eq!(grid.len(), 112);
        assert_eq!(grid.slots_per_day(), 16);
        assert!(!grid.is_empty());
    }

    #[test]
    fn test_build_week_instants_are_unique() {
        let grid = default_grid();
        let instants: HashSet<_> = grid.iter().map(|s| s.instant).collect();
        assert_eq!(instants.len(), grid.len());
    }

    #[test]
    fn test_build_week_row_major_order() {
        let grid = default_grid();
        let slots = grid.slots();

        for (i, day) in (0..7).enumerate() {
            assert_eq!(slots[i].time_of_day_slot_index, 0);
            assert_eq!(slots[i].day_offset, day);
        }
        assert_eq!(slots[0].instant, at(1, 9, 0));
        assert_eq!(slots[6].instant, at(7, 9, 0));
        assert_eq!(slots[7].instant, at(1, 9, 30));
        assert_eq!(slots[111].instant, at(7, 16, 30));
    }

    #[test]
    fn test_rows() {
        let grid = default_grid();
        let rows: Vec<_> = grid.rows().collect();
        assert_eq!(rows.len(), 16);
        for (index, row) in rows.iter().enumerate() {
            assert_eq!(row.len(), 7);
            assert!(row.iter().all(|s| s.time_of_day_slot_index == index as u32));
        }
    }

    #[test]
    fn test_build_week_is_deterministic() {
        assert_eq!(default_grid(), default_grid());
    }

    #[test]
    fn test_build_week_rejects_invalid_config() {
        let config = GridConfig {
            start_hour: 9,
            end_hour: 17,
            slot_resolution_minutes: 0,
        };
        assert!(matches!(
            build_week(monday(), &config),
            Err(SlotGridError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_day_start_and_week_end() {
        let grid = default_grid();
        assert_eq!(grid.day_start(0), at(1, 9, 0));
        assert_eq!(grid.day_start(3), at(4, 9, 0));
        assert_eq!(grid.week_end(), at(8, 0, 0));
    }

    #[test]
    fn test_slot_at() {
        let grid = default_grid();
        let slot = grid.slot_at(2, 3).unwrap();
        assert_eq!(slot.day_offset, 2);
        assert_eq!(slot.time_of_day_slot_index, 3);
        assert_eq!(slot.instant, at(3, 10, 30));

        assert!(grid.slot_at(7, 0).is_none());
        assert!(grid.slot_at(0, 16).is_none());
    }

    #[test]
    fn test_locate_round_trip() {
        let grid = default_grid();
        for slot in &grid {
            assert_eq!(locate_slot(&grid, slot.instant), Some(*slot));
        }
    }

    #[test]
    fn test_locate_outside_week() {
        let grid = default_grid();
        assert_eq!(grid.locate(monday() - Duration::minutes(30)), None);
        assert_eq!(grid.locate(at(8, 9, 0)), None);
        assert_eq!(grid.locate(grid.week_end()), None);
    }

    #[test]
    fn test_locate_outside_operating_hours() {
        let grid = default_grid();
        assert_eq!(grid.locate(at(1, 8, 30)), None);
        assert_eq!(grid.locate(at(1, 17, 0)), None);
        assert_eq!(grid.locate(at(2, 23, 30)), None);
        assert_eq!(grid.locate(monday()), None);
    }

    #[test]
    fn test_locate_rejects_misaligned_instants() {
        let grid = default_grid();
        assert_eq!(grid.locate(at(1, 9, 15)), None);
        assert_eq!(grid.locate(at(1, 9, 0) + Duration::seconds(1)), None);
        assert_eq!(grid.locate(at(1, 9, 0) + Duration::milliseconds(1)), None);
    }

    #[test]
    fn test_locate_full_day_grid() {
        let config = GridConfig::new(0, 24, 60).unwrap();
        let grid = build_week(monday(), &config).unwrap();

        let first = grid.locate(monday()).unwrap();
        assert_eq!((first.day_offset, first.time_of_day_slot_index), (0, 0));

        let last = grid.locate(at(7, 23, 0)).unwrap();
        assert_eq!((last.day_offset, last.time_of_day_slot_index), (6, 23));
    }

    #[test]
    fn test_slot_key() {
        let grid = default_grid();
        assert_eq!(grid.slots()[0].key(), "2024-01-01T09:00:00Z");
    }
}
