// Post-time parsing and the recency gate.
//
// A post's time can arrive as a readable string or as a numeric epoch whose
// unit (seconds vs milliseconds) has to be guessed from its magnitude.
// Readable strings win when both are present. Anything that does not parse
// is "unknown", and unknown posts are never recent.

use anyhow::Result;
use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, Offset, TimeZone, Utc};

/// Numeric values above this are milliseconds since the epoch.
pub const MILLIS_CUTOFF: f64 = 1e12;
/// Numeric values above this (and not above [`MILLIS_CUTOFF`]) are seconds.
pub const SECONDS_CUTOFF: f64 = 1e9;

/// Accepted layouts for readable timestamps.
pub const READABLE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M:%S"];

/// Layout used when echoing a parsed time back to callers.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Interpret a numeric epoch value, inferring its unit.
pub fn parse_epoch(value: f64) -> Option<DateTime<Utc>> {
    if !value.is_finite() {
        return None;
    }
    if value > MILLIS_CUTOFF {
        DateTime::from_timestamp_millis(value as i64)
    } else if value > SECONDS_CUTOFF {
        let secs = value.trunc();
        let nanos = ((value - secs) * 1e9) as u32;
        DateTime::from_timestamp(secs as i64, nanos)
    } else {
        None
    }
}

/// True iff `post_time` is at or after `now - window_days`.
/// Unknown times are never recent.
pub fn is_recent_at(post_time: Option<DateTime<Utc>>, window_days: u32, now: DateTime<Utc>) -> bool {
    let Some(t) = post_time else {
        return false;
    };
    match now.checked_sub_signed(Duration::days(i64::from(window_days))) {
        Some(cutoff) => t >= cutoff,
        // Window reaches past the representable range: everything is inside it
        None => true,
    }
}

/// [`is_recent_at`] against the wall clock.
pub fn is_recent(post_time: Option<DateTime<Utc>>, window_days: u32) -> bool {
    is_recent_at(post_time, window_days, Utc::now())
}

/// Parses post times. Readable strings carry no zone, so they are read in
/// a fixed offset (UTC+8 by default, the zone the HAR extractor writes).
#[derive(Debug, Clone, Copy)]
pub struct TemporalGate {
    offset: FixedOffset,
}

impl Default for TemporalGate {
    fn default() -> Self {
        Self {
            offset: beijing_offset(),
        }
    }
}

/// UTC+8.
pub fn beijing_offset() -> FixedOffset {
    FixedOffset::east_opt(8 * 3600).unwrap_or_else(|| Utc.fix())
}

impl TemporalGate {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn with_offset_hours(hours: i32) -> Result<Self> {
        match hours.checked_mul(3600).and_then(FixedOffset::east_opt) {
            Some(offset) => Ok(Self { offset }),
            None => anyhow::bail!("Invalid UTC offset: {hours} hours"),
        }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Parse a readable timestamp in either accepted layout.
    pub fn parse_readable(&self, text: &str) -> Option<DateTime<Utc>> {
        let text = text.trim();
        READABLE_FORMATS.iter().find_map(|fmt| {
            let naive = NaiveDateTime::parse_from_str(text, fmt).ok()?;
            self.offset
                .from_local_datetime(&naive)
                .single()
                .map(|dt| dt.with_timezone(&Utc))
        })
    }

    /// Resolve a post's time from its readable and numeric fields.
    pub fn parse_post_time(&self, readable: Option<&str>, numeric: Option<f64>) -> Option<DateTime<Utc>> {
        readable
            .filter(|s| !s.is_empty())
            .and_then(|s| self.parse_readable(s))
            .or_else(|| numeric.and_then(parse_epoch))
    }

    /// Render a time in the gate's offset using [`DISPLAY_FORMAT`].
    pub fn format(&self, time: DateTime<Utc>) -> String {
        time.with_timezone(&self.offset).format(DISPLAY_FORMAT).to_string()
    }
}
