use crate::{
    constants::{
        DAYS_PER_WEEK, DEFAULT_END_HOUR, DEFAULT_SLOT_RESOLUTION_MINUTES, DEFAULT_START_HOUR,
        HOURS_PER_DAY, MINUTES_PER_DAY,
    },
    error::{Result, SlotGridError},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Operating hours and slot resolution shared by every week grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GridConfig {
    /// First bookable hour of a day (inclusive)
    pub start_hour: u32,
    /// Closing hour of a day (exclusive)
    pub end_hour: u32,
    pub slot_resolution_minutes: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            start_hour: DEFAULT_START_HOUR,
            end_hour: DEFAULT_END_HOUR,
            slot_resolution_minutes: DEFAULT_SLOT_RESOLUTION_MINUTES,
        }
    }
}

impl GridConfig {
    pub fn new(start_hour: u32, end_hour: u32, slot_resolution_minutes: u32) -> Result<Self> {
        let config = Self {
            start_hour,
            end_hour,
            slot_resolution_minutes,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reads a `GridConfig` from a standalone TOML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SlotGridError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: GridConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.start_hour >= self.end_hour || self.end_hour > HOURS_PER_DAY {
            return Err(SlotGridError::InvalidConfig(format!(
                "operating hours must satisfy 0 <= start_hour < end_hour <= {}, got {}..{}",
                HOURS_PER_DAY, self.start_hour, self.end_hour
            )));
        }

        let resolution = self.slot_resolution_minutes;
        if resolution == 0 {
            return Err(SlotGridError::InvalidConfig(
                "slot_resolution_minutes must be greater than 0".to_string(),
            ));
        }

        if self.operating_minutes() % resolution != 0 {
            return Err(SlotGridError::InvalidConfig(format!(
                "slot_resolution_minutes ({}) must divide the {} operating minutes of a day",
                resolution,
                self.operating_minutes()
            )));
        }

        if MINUTES_PER_DAY % resolution != 0 {
            return Err(SlotGridError::InvalidConfig(format!(
                "slot_resolution_minutes ({}) must divide {} minutes",
                resolution, MINUTES_PER_DAY
            )));
        }

        Ok(())
    }

    /// Minutes between opening and closing on a single day
    pub fn operating_minutes(&self) -> u32 {
        self.end_hour.saturating_sub(self.start_hour) * 60
    }
}

/// Number of slots in one operating day.
pub fn slots_per_day(config: &GridConfig) -> u32 {
    match config.slot_resolution_minutes {
        0 => 0,
        resolution => config.operating_minutes() / resolution,
    }
}

/// Number of slots in a full week grid.
pub fn total_slots(config: &GridConfig) -> u32 {
    slots_per_day(config) * DAYS_PER_WEEK
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        let config = GridConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(slots_per_day(&config), 16);
        assert_eq!(total_slots(&config), 112);
    }

    #[test]
    fn test_full_day_hourly() {
        let config = GridConfig::new(0, 24, 60).unwrap();
        assert_eq!(slots_per_day(&config), 24);
        assert_eq!(total_slots(&config), 168);
    }

    #[test]
    fn test_rejects_inverted_hours() {
        assert!(matches!(
            GridConfig::new(17, 9, 30),
            Err(SlotGridError::InvalidConfig(_))
        ));
        assert!(matches!(
            GridConfig::new(9, 9, 30),
            Err(SlotGridError::InvalidConfig(_))
        ));
        assert!(matches!(
            GridConfig::new(9, 25, 30),
            Err(SlotGridError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_zero_resolution() {
        assert!(matches!(
            GridConfig::new(9, 17, 0),
            Err(SlotGridError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_resolution_not_dividing_hours() {
        // 8 hours = 480 minutes, 7 does not divide it
        assert!(GridConfig::new(9, 17, 7).is_err());
        // 90 divides both 180 and 1440
        assert!(GridConfig::new(9, 12, 90).is_ok());
        // 120 divides 480 and 1440
        assert!(GridConfig::new(9, 17, 120).is_ok());
    }

    #[test]
    fn test_rejects_resolution_not_dividing_day() {
        // 100 divides 10 hours (600m) but not 1440m
        assert!(matches!(
            GridConfig::new(8, 18, 100),
            Err(SlotGridError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "start_hour = 8\nend_hour = 12\nslot_resolution_minutes = 15"
        )
        .unwrap();

        let config = GridConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config, GridConfig::new(8, 12, 15).unwrap());
        assert_eq!(slots_per_day(&config), 16);
    }

    #[test]
    fn test_load_from_file_uses_defaults_for_missing_keys() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "end_hour = 18").unwrap();

        let config = GridConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.start_hour, DEFAULT_START_HOUR);
        assert_eq!(config.end_hour, 18);
        assert_eq!(config.slot_resolution_minutes, DEFAULT_SLOT_RESOLUTION_MINUTES);
    }

    #[test]
    fn test_load_from_file_validates() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "start_hour = 20\nend_hour = 10").unwrap();

        let result = GridConfig::load_from_file(file.path());
        assert!(matches!(result, Err(SlotGridError::InvalidConfig(_))));
    }

    #[test]
    fn test_load_from_missing_file() {
        let result = GridConfig::load_from_file("nonexistent/grid.toml");
        assert!(matches!(result, Err(SlotGridError::Config(_))));
    }
}
