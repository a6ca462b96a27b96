//! Date and time readout in a fixed UTC offset.

use crate::error::{BoardError, Result};
use chrono::{DateTime, FixedOffset, Utc};

/// One formatted reading, e.g. `Sun` / `Oct 18, 2026` / `14:03:09`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockReading {
    pub weekday: String,
    pub date: String,
    pub time: String,
}

#[derive(Debug, Clone, Copy)]
pub struct Clock {
    offset: FixedOffset,
}

impl Clock {
    pub fn new(utc_offset_hours: i32) -> Result<Self> {
        let offset = utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                BoardError::Config(format!("UTC offset out of range: {utc_offset_hours}h"))
            })?;
        Ok(Self { offset })
    }

    pub fn read(&self, now: DateTime<Utc>) -> ClockReading {
        let local = now.with_timezone(&self.offset);
        ClockReading {
            weekday: local.format("%a").to_string(),
            date: local.format("%b %-d, %Y").to_string(),
            time: local.format("%H:%M:%S").to_string(),
        }
    }

    pub fn now(&self) -> ClockReading {
        self.read(Utc::now())
    }
}
