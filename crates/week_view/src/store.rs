use crate::error::{Result, WeekViewError};
use chrono::{DateTime, Utc};
use csv::{ReaderBuilder, Trim, WriterBuilder};
use log::debug;
use slot_grid::{Booking, BookingId};
use std::{
    fs::OpenOptions,
    io::BufWriter,
    path::{Path, PathBuf},
};

/// Bookings persisted as one CSV row each.
///
/// The store is the only owner of booking identities: ids are handed out by
/// [`BookingStore::create_booking`] and never reused.
#[derive(Debug, Clone)]
pub struct BookingStore {
    path: PathBuf,
}

impl BookingStore {
    pub fn open<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every stored booking in file order. A missing file is an empty store.
    pub fn load_all(&self) -> Result<Vec<Booking>> {
        if !self.path.exists() {
            debug!("Booking store {} does not exist yet", self.path.display());
            return Ok(Vec::new());
        }

        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::Headers)
            .from_path(&self.path)?;

        let mut bookings: Vec<Booking> = Vec::new();
        for record in rdr.deserialize::<Booking>() {
            bookings.push(record?);
        }

        debug!(
            "Loaded {} booking(s) from {}",
            bookings.len(),
            self.path.display()
        );
        Ok(bookings)
    }

    /// Persists a new booking and returns it with its assigned id.
    pub fn create_booking(
        &self,
        owner: &str,
        start: DateTime<Utc>,
        duration_minutes: u32,
        note: &str,
    ) -> Result<Booking> {
        let existing = self.load_all()?;
        let next_id = existing.iter().map(|b| b.id.0).max().map_or(1, |id| id + 1);
        let booking = Booking::new(BookingId(next_id), start, duration_minutes, owner, note);

        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            std::fs::create_dir_all(dir).map_err(|e| WeekViewError::CreateDir {
                path: dir.to_path_buf(),
                source: e,
            })?;
        }

        let is_new = existing.is_empty()
            && std::fs::metadata(&self.path).map_or(true, |meta| meta.len() == 0);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| WeekViewError::CreateFile {
                path: self.path.clone(),
                source: e,
            })?;

        let mut wtr = WriterBuilder::new()
            .has_headers(is_new)
            .from_writer(BufWriter::new(file));
        wtr.serialize(&booking)?;
        wtr.flush()?;

        debug!("Stored booking {} in {}", booking.id, self.path.display());
        Ok(booking)
    }
}
