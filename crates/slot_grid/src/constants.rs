/// Calendar arithmetic
pub const DAYS_PER_WEEK: u32 = 7;
pub const HOURS_PER_DAY: u32 = 24;
pub const MINUTES_PER_DAY: u32 = HOURS_PER_DAY * 60;

/// Default operating hours (09:00 - 17:00) and slot size
pub const DEFAULT_START_HOUR: u32 = 9;
pub const DEFAULT_END_HOUR: u32 = 17;
pub const DEFAULT_SLOT_RESOLUTION_MINUTES: u32 = 30;
