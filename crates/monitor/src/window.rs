use chrono::{FixedOffset, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};
use vigil_core::Timestamp;
use vigil_ports::ConfigError;

/// Local-market trading hours gate for the surge rule
///
/// Stores the market's UTC offset explicitly so the check works no
/// matter where the process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradingWindow {
    start: NaiveTime,
    end: NaiveTime,
    /// Market UTC offset in hours (e.g. 9 for KST)
    utc_offset_hours: i32,
}

impl TradingWindow {
    pub fn new(start: NaiveTime, end: NaiveTime, utc_offset_hours: i32) -> Result<Self, ConfigError> {
        if start >= end {
            return Err(ConfigError::BadTradingWindow {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self {
            start,
            end,
            utc_offset_hours,
        })
    }

    /// True when `now` falls within [start, end] local market time.
    pub fn contains(&self, now: Timestamp) -> bool {
        let offset = match FixedOffset::east_opt(self.utc_offset_hours * 3600) {
            Some(o) => o,
            None => return false,
        };
        let local = offset.from_utc_datetime(&now.naive_utc()).time();
        local >= self.start && local <= self.end
    }
}

impl Default for TradingWindow {
    /// 09:00-15:20 local market time, UTC+9.
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            end: NaiveTime::from_hms_opt(15, 20, 0).unwrap_or_default(),
            utc_offset_hours: 9,
        }
    }
}
