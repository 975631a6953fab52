use serde::Serialize;
use slot_grid::{BookingId, SlotAssignment, WeekGrid, format_instant};
use std::fmt::Write;

const TIME_COLUMN_WIDTH: usize = 6;
const DAY_COLUMN_WIDTH: usize = 16;
const EMPTY_CELL: &str = ".";

/// A week grid projected into displayable strings.
///
/// Built fresh from a `WeekGrid` and a `SlotAssignment` whenever either
/// changes; nothing is read back from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekView {
    /// e.g. "January 2024"
    pub title: String,
    pub week_start: String,
    /// One label per day offset, e.g. "01 Monday"
    pub days: Vec<String>,
    pub rows: Vec<ViewRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewRow {
    /// "HH:MM"
    pub time: String,
    pub cells: Vec<ViewCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewCell {
    /// Serialized slot instant
    pub key: String,
    pub day_offset: u32,
    pub booking: Option<CellBooking>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellBooking {
    pub id: BookingId,
    pub owner: String,
    pub note: String,
    /// Exclusive end of the booking as a serialized instant
    pub until: String,
}

impl WeekView {
    pub fn project(grid: &WeekGrid, assignment: &SlotAssignment) -> Self {
        let week_start = grid.week_start();
        let days = (0..slot_grid::DAYS_PER_WEEK)
            .map(|offset| grid.day_start(offset).format("%d %A").to_string())
            .collect();

        let rows = grid
            .rows()
            .map(|row| ViewRow {
                time: row
                    .first()
                    .map(|slot| slot.instant.format("%H:%M").to_string())
                    .unwrap_or_default(),
                cells: row
                    .iter()
                    .map(|slot| ViewCell {
                        key: slot.key(),
                        day_offset: slot.day_offset,
                        booking: assignment.get(&slot.instant).map(|booking| CellBooking {
                            id: booking.id,
                            owner: booking.owner.clone(),
                            note: booking.note.clone(),
                            until: format_instant(&booking.end()),
                        }),
                    })
                    .collect(),
            })
            .collect();

        Self {
            title: week_start.format("%B %Y").to_string(),
            week_start: format_instant(&week_start),
            days,
            rows,
        }
    }

    pub fn booked_cells(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|row| row.cells.iter())
            .filter(|cell| cell.booking.is_some())
            .count()
    }

    /// Plain-text table, one line per time of day.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.title);

        let _ = write!(out, "{:<width$}", "", width = TIME_COLUMN_WIDTH);
        for day in &self.days {
            let _ = write!(out, "{}", pad(day));
        }
        out.truncate(out.trim_end().len());
        out.push('\n');

        for row in &self.rows {
            let mut line = format!("{:<width$}", row.time, width = TIME_COLUMN_WIDTH);
            for cell in &row.cells {
                let label = match &cell.booking {
                    Some(booking) => format!("#{} {}", booking.id, booking.owner),
                    None => EMPTY_CELL.to_string(),
                };
                line.push_str(&pad(&label));
            }
            let _ = writeln!(out, "{}", line.trim_end());
        }

        out
    }
}

fn pad(label: &str) -> String {
    let shown: String = label.chars().take(DAY_COLUMN_WIDTH - 1).collect();
    format!("{:<width$}", shown, width = DAY_COLUMN_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use slot_grid::{Booking, GridConfig, assign, build_week, slots_for_booking};

    fn week() -> (WeekGrid, SlotAssignment, Booking) {
        let monday = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let grid = build_week(monday, &GridConfig::default()).unwrap();
        let booking = Booking::new(
            BookingId(4),
            Utc.with_ymd_and_hms(2024, 1, 2, 9, 30, 0).unwrap(),
            60,
            "alice",
            "1:1",
        );
        let slots = slots_for_booking(&booking, &grid).unwrap();
        let assignment = assign(&SlotAssignment::new(), &booking, &slots);
        (grid, assignment, booking)
    }

    #[test]
    fn test_project_labels() {
        let (grid, assignment, _) = week();
        let view = WeekView::project(&grid, &assignment);

        assert_eq!(view.title, "January 2024");
        assert_eq!(view.week_start, "2024-01-01T00:00:00Z");
        assert_eq!(view.days.len(), 7);
        assert_eq!(view.days[0], "01 Monday");
        assert_eq!(view.days[6], "07 Sunday");
        assert_eq!(view.rows.len(), 16);
        assert_eq!(view.rows[0].time, "09:00");
        assert_eq!(view.rows[15].time, "16:30");
    }

    #[test]
    fn test_project_cells_follow_grid_order() {
        let (grid, assignment, _) = week();
        let view = WeekView::project(&grid, &assignment);

        let keys: Vec<&str> = view
            .rows
            .iter()
            .flat_map(|row| row.cells.iter().map(|cell| cell.key.as_str()))
            .collect();
        let expected: Vec<String> = grid.iter().map(|slot| slot.key()).collect();
        assert_eq!(keys, expected);
    }

    #[test]
    fn test_project_places_booking() {
        let (grid, assignment, booking) = week();
        let view = WeekView::project(&grid, &assignment);

        assert_eq!(view.booked_cells(), 2);
        let cell = &view.rows[1].cells[1];
        assert_eq!(cell.key, "2024-01-02T09:30:00Z");
        assert_eq!(cell.booking.as_ref().map(|b| b.id), Some(booking.id));
        let until = view.rows[2].cells[1].booking.as_ref().map(|b| b.until.as_str());
        assert_eq!(until, Some("2024-01-02T10:30:00Z"));
        assert!(view.rows[3].cells[1].booking.is_none());
        assert!(view.rows[1].cells[0].booking.is_none());
    }

    #[test]
    fn test_render_text() {
        let (grid, assignment, _) = week();
        let text = WeekView::project(&grid, &assignment).render_text();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "January 2024");
        assert!(lines[1].contains("01 Monday"));
        assert!(lines[1].ends_with("07 Sunday"));
        assert_eq!(lines.len(), 2 + 16);
        assert!(lines[2].starts_with("09:00 "));
        assert!(!lines[2].contains("alice"));
        assert!(lines[3].contains("#4 alice"));
        assert!(lines[4].contains("#4 alice"));
        assert!(!lines[5].contains("alice"));
    }

    #[test]
    fn test_pad_truncates_long_labels() {
        let padded = pad("a very long owner name indeed");
        assert_eq!(padded.chars().count(), DAY_COLUMN_WIDTH);
        assert!(padded.ends_with(' '));
    }
}
