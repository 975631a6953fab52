use crate::error::{Result, WeekViewError};
use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, Utc, Weekday};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use slot_grid::GridConfig;
use std::{
    env,
    path::{Path, PathBuf},
};

const ENV_CONFIG_PATH: &str = "WEEK_VIEW_CONFIG";
const ENV_DATA_DIR: &str = "WEEK_VIEW_DATA_DIR";

const DEFAULT_CONFIG_PATH: &str = "config/week_view.toml";
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_BOOKING_DURATION_MINUTES: u32 = 60;

const BOOKINGS_FILE: &str = "bookings.csv";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub grid: GridConfig,
    pub booking: BookingConfig,
    /// Directory holding the booking store
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BookingConfig {
    /// Duration used when `book` is run without `--duration`
    pub default_duration_minutes: u32,
    /// Day shown as day offset 0 of every week
    pub first_weekday: Weekday,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            default_duration_minutes: DEFAULT_BOOKING_DURATION_MINUTES,
            first_weekday: Weekday::Mon,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            booking: BookingConfig::default(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

impl Config {
    /// Loads the config file named by `WEEK_VIEW_CONFIG` (or the default
    /// path), then applies `WEEK_VIEW_DATA_DIR`.
    pub fn from_env() -> Result<Self> {
        let explicit_path = env::var(ENV_CONFIG_PATH)
            .ok()
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        let mut config = match &explicit_path {
            Some(path) if path.exists() => Self::load_from_file(path)?,
            Some(path) => {
                warn!(
                    "Config file not found: {}, using default settings",
                    path.display()
                );
                Self::default()
            }
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::load_from_file(DEFAULT_CONFIG_PATH)?
            }
            None => {
                debug!("No config file, using default settings");
                Self::default()
            }
        };

        if let Ok(data_dir) = env::var(ENV_DATA_DIR)
            && !data_dir.trim().is_empty()
        {
            let path = PathBuf::from(data_dir);

            // If the path already exists but is not a directory, reject early.
            if path.exists() && !path.is_dir() {
                return Err(WeekViewError::InvalidConfiguration(format!(
                    "Data path is not a directory: {}",
                    path.display()
                )));
            }
            config.data_dir = path;
        }

        Ok(config)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| WeekViewError::OpenFile {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.grid.validate()?;

        let duration = self.booking.default_duration_minutes;
        let resolution = self.grid.slot_resolution_minutes;
        if duration == 0 || duration % resolution != 0 {
            return Err(WeekViewError::InvalidConfiguration(format!(
                "default_duration_minutes ({}) must be a positive multiple of slot_resolution_minutes ({})",
                duration, resolution
            )));
        }

        Ok(())
    }

    /// Midnight UTC of the latest `first_weekday` on or before `date`.
    pub fn week_start_for(&self, date: NaiveDate) -> DateTime<Utc> {
        let today = date.weekday().num_days_from_monday();
        let first = self.booking.first_weekday.num_days_from_monday();
        let back = (7 + today - first) % 7;

        (date - Days::new(u64::from(back)))
            .and_time(NaiveTime::MIN)
            .and_utc()
    }

    pub fn bookings_path(&self) -> PathBuf {
        self.data_dir.join(BOOKINGS_FILE)
    }
}
