//! Contact record cleaning.
//!
//! Turns raw `Connections.csv` rows into [`ContactRecord`]s: trims fields,
//! joins the name, truncates long company names, parses the connection
//! date and drops rows that cannot be aggregated meaningfully.

use std::sync::OnceLock;

use insights_core::error::{InsightsError, Result};
use insights_core::models::{ContactRecord, MAX_COMPANY_CHARS};
use insights_core::time_utils::parse_connection_date;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::reader::RawContact;

/// Self-reported entries that are not real employers.
const NON_EMPLOYER_PATTERN: &str = r"(?i)freelance|self-employed|\.|-";

fn non_employer_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(NON_EMPLOYER_PATTERN).expect("regex is valid"))
}

/// How many rows each cleaning step removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleaningStats {
    pub rows_read: usize,
    /// Rows without a company or a position.
    pub missing_fields: usize,
    /// Rows whose company looks like freelance / self-employment.
    pub non_employer: usize,
    pub kept: usize,
}

/// Output of [`clean`].
#[derive(Debug, Clone, Default)]
pub struct CleanedContacts {
    /// Cleaned records in export order (newest connection first).
    pub records: Vec<ContactRecord>,
    pub stats: CleaningStats,
}

/// Clean raw contact rows.
///
/// Rows missing a company or position are dropped silently.  An
/// unparseable `Connected On` value on any remaining row aborts the whole
/// import with [`InsightsError::MalformedDate`]; the date is checked before
/// the non-employer filter, so such rows still fail the import.
pub fn clean(raw: &[RawContact]) -> Result<CleanedContacts> {
    let mut stats = CleaningStats {
        rows_read: raw.len(),
        ..Default::default()
    };
    let mut records = Vec::with_capacity(raw.len());

    for row in raw {
        let (Some(company), Some(position)) = (present(&row.company), present(&row.position))
        else {
            stats.missing_fields += 1;
            continue;
        };

        let name = [present(&row.first_name), present(&row.last_name)]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");

        let company = truncate_chars(company, MAX_COMPANY_CHARS);

        let date_text = row.connected_on.as_deref().unwrap_or("");
        let connected_on =
            parse_connection_date(date_text).ok_or_else(|| InsightsError::MalformedDate {
                row: row.row,
                value: date_text.to_string(),
            })?;

        if non_employer_regex().is_match(&company) {
            stats.non_employer += 1;
            continue;
        }

        records.push(ContactRecord {
            name,
            company,
            position: position.to_string(),
            connected_on,
            email: present(&row.email_address).map(str::to_string),
        });
    }

    stats.kept = records.len();
    debug!(
        "Cleaned contacts: {} read, {} missing company/position, {} non-employer, {} kept",
        stats.rows_read, stats.missing_fields, stats.non_employer, stats.kept
    );

    Ok(CleanedContacts { records, stats })
}

/// Trimmed field value, `None` when absent or blank.
fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// First `max` characters of `s`, without an ellipsis.
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
