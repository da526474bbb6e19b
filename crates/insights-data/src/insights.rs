//! Summary views over cleaned connections.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Weekday};
use insights_core::models::{AggregationRow, ContactRecord};
use serde::Serialize;

// ── Overview ──────────────────────────────────────────────────────────────────

/// Who a connection is, for the first/most-recent highlights.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionSummary {
    pub name: String,
    pub position: String,
    pub company: String,
    pub connected_on: NaiveDate,
}

impl From<&ContactRecord> for ConnectionSummary {
    fn from(r: &ContactRecord) -> Self {
        Self {
            name: r.name.clone(),
            position: r.position.clone(),
            company: r.company.clone(),
            connected_on: r.connected_on,
        }
    }
}

/// Headline numbers for the connections export.
///
/// Everything derived from the cleaned set is optional so an export with no
/// usable rows still produces an overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionOverview {
    /// Rows in `Connections.csv`, before cleaning.
    pub total_connections: usize,
    pub cleaned_connections: usize,
    pub top_position: Option<AggregationRow>,
    pub top_company: Option<AggregationRow>,
    pub second_company: Option<AggregationRow>,
    /// `YYYY-MM` month counted in `new_connections_in_month`.
    pub reference_month: String,
    pub new_connections_in_month: usize,
    /// The export lists newest first, so this is the last cleaned record.
    pub first_connection: Option<ConnectionSummary>,
    pub most_recent_connection: Option<ConnectionSummary>,
}

/// Build the overview.
///
/// `company_rows` / `position_rows` must be the sorted aggregation tables;
/// `month` is `(year, month)`.
pub fn overview(
    total_connections: usize,
    records: &[ContactRecord],
    company_rows: &[AggregationRow],
    position_rows: &[AggregationRow],
    month: (i32, u32),
) -> ConnectionOverview {
    let (year, month_no) = month;
    let new_connections_in_month = records
        .iter()
        .filter(|r| r.connected_on.year() == year && r.connected_on.month() == month_no)
        .count();

    ConnectionOverview {
        total_connections,
        cleaned_connections: records.len(),
        top_position: position_rows.first().cloned(),
        top_company: company_rows.first().cloned(),
        second_company: company_rows.get(1).cloned(),
        reference_month: format!("{:04}-{:02}", year, month_no),
        new_connections_in_month,
        first_connection: records.last().map(ConnectionSummary::from),
        most_recent_connection: records.first().map(ConnectionSummary::from),
    }
}

// ── Timeline ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateCount {
    pub date: NaiveDate,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CumulativePoint {
    pub date: NaiveDate,
    pub count: u32,
    pub cumulative: u64,
}

/// Connections per day, ascending by date.
pub fn timeline(records: &[ContactRecord]) -> Vec<DateCount> {
    let mut per_day: BTreeMap<NaiveDate, u32> = BTreeMap::new();
    for record in records {
        *per_day.entry(record.connected_on).or_default() += 1;
    }
    per_day
        .into_iter()
        .map(|(date, count)| DateCount { date, count })
        .collect()
}

/// Running total over a timeline.
pub fn cumulative(timeline: &[DateCount]) -> Vec<CumulativePoint> {
    let mut total = 0u64;
    timeline
        .iter()
        .map(|p| {
            total += u64::from(p.count);
            CumulativePoint {
                date: p.date,
                count: p.count,
                cumulative: total,
            }
        })
        .collect()
}

// ── Weekdays ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekdayCount {
    pub weekday: &'static str,
    pub count: u32,
}

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Connections per weekday, Monday first; days with no connections are left out.
pub fn weekday_histogram(records: &[ContactRecord]) -> Vec<WeekdayCount> {
    let mut counts = [0u32; 7];
    for record in records {
        counts[record.connected_on.weekday().num_days_from_monday() as usize] += 1;
    }
    WEEKDAYS
        .iter()
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .map(|(day, count)| WeekdayCount {
            weekday: weekday_name(*day),
            count,
        })
        .collect()
}

// ── E-mail directory ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailContact {
    pub name: String,
    pub company: String,
    pub position: String,
    pub email: String,
}

/// Connections that share an e-mail address, in export order.
pub fn email_directory(records: &[ContactRecord]) -> Vec<EmailContact> {
    records
        .iter()
        .filter_map(|r| {
            r.email.as_ref().map(|email| EmailContact {
                name: r.name.clone(),
                company: r.company.clone(),
                position: r.position.clone(),
                email: email.clone(),
            })
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
