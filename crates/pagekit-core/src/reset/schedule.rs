use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

/// Weekday whose firing hour triggers the reset.
const DEFAULT_WEEKDAY: Weekday = Weekday::Sun;

/// Local hour (0-23) in which the reset fires.
const DEFAULT_HOUR: u32 = 22;

/// One-hour recurrence window, repeating weekly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetSchedule {
    pub weekday: Weekday,
    pub hour: u32,
}

impl Default for ResetSchedule {
    fn default() -> Self {
        Self {
            weekday: DEFAULT_WEEKDAY,
            hour: DEFAULT_HOUR,
        }
    }
}

impl ResetSchedule {
    pub fn new(weekday: Weekday, hour: u32) -> Self {
        Self { weekday, hour }
    }

    /// Whether `now` (local wall time) falls inside the window.
    pub fn contains(&self, now: NaiveDateTime) -> bool {
        now.weekday() == self.weekday && now.hour() == self.hour
    }

    pub fn is_valid(&self) -> bool {
        self.hour < 24
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, 0).unwrap()
    }

    #[test]
    fn test_default_window_is_sunday_22() {
        let schedule = ResetSchedule::default();
        // 2024-01-07 is a Sunday
        assert!(schedule.contains(at(2024, 1, 7, 22, 0)));
        assert!(schedule.contains(at(2024, 1, 7, 22, 59)));
        assert!(!schedule.contains(at(2024, 1, 7, 21, 59)));
        assert!(!schedule.contains(at(2024, 1, 7, 23, 0)));
        assert!(!schedule.contains(at(2024, 1, 8, 22, 0)));
    }

    #[test]
    fn test_schedule_deserializes_from_config() {
        let schedule: ResetSchedule = serde_json::from_str(r#"{"weekday":"Mon","hour":6}"#).unwrap();
        assert_eq!(schedule, ResetSchedule::new(Weekday::Mon, 6));
        assert!(schedule.is_valid());
        assert!(!ResetSchedule::new(Weekday::Mon, 24).is_valid());
    }
}
