use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;

use crate::error::{InsightsError, Result};

/// Zone message timestamps are localized into unless configured otherwise.
pub const DEFAULT_TIMEZONE: &str = "US/Central";

/// Format of the `DATE` column in `messages.csv`.
pub const MESSAGE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Formats accepted for the `Connected On` column, tried in order.
const CONNECTION_DATE_FORMATS: &[&str] = &["%d %b %Y", "%Y-%m-%d", "%m/%d/%Y", "%d-%b-%y"];

// ── System timezone detection ─────────────────────────────────────────────────

/// Detect the IANA timezone name of the running system.
///
/// Falls back to `"UTC"` if detection fails.
pub fn get_system_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

/// Resolve a configured zone name; `"auto"` means the system zone.
pub fn resolve_timezone(name: &str) -> Result<Tz> {
    let name = if name.eq_ignore_ascii_case("auto") {
        get_system_timezone()
    } else {
        name.to_string()
    };
    name.parse::<Tz>()
        .map_err(|_| InsightsError::InvalidTimezone(name))
}

// ── TimezoneHandler ───────────────────────────────────────────────────────────

/// Parses export timestamps (always UTC) and localizes them to one zone.
#[derive(Debug, Clone, Copy)]
pub struct TimezoneHandler {
    target_tz: Tz,
}

impl TimezoneHandler {
    pub fn new(target_tz: Tz) -> Self {
        Self { target_tz }
    }

    /// Parse a `messages.csv` `DATE` value as UTC.
    ///
    /// Returns `None` for anything not shaped like `2022-01-15 18:04:11 UTC`.
    pub fn parse_message_timestamp(&self, s: &str) -> Option<DateTime<Utc>> {
        NaiveDateTime::parse_from_str(s.trim(), MESSAGE_TIMESTAMP_FORMAT)
            .ok()
            .map(|naive| naive.and_utc())
    }

    /// Convert a UTC instant into the target zone.
    pub fn localize(&self, dt: DateTime<Utc>) -> DateTime<Tz> {
        dt.with_timezone(&self.target_tz)
    }

    /// Parse and localize in one step.
    pub fn parse_and_localize(&self, s: &str) -> Option<DateTime<Tz>> {
        self.parse_message_timestamp(s).map(|dt| self.localize(dt))
    }

    /// Validate that `tz_name` is a recognised IANA timezone identifier.
    pub fn validate_timezone(tz_name: &str) -> bool {
        tz_name.parse::<Tz>().is_ok()
    }
}

// ── Dates ─────────────────────────────────────────────────────────────────────

/// Parse a `Connected On` value such as `"15 Jan 2022"`.
pub fn parse_connection_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    CONNECTION_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Parse a `YYYY-MM` month selector into `(year, month)`.
pub fn parse_year_month(s: &str) -> Option<(i32, u32)> {
    let (year, month) = s.trim().split_once('-')?;
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    (1..=12).contains(&month).then_some((year, month))
}

// ── Tests ──────────────────────────────────────────────────────────────────────
