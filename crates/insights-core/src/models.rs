use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single connection from `Connections.csv`, after cleaning.
///
/// `company` and `position` are always non-empty; rows missing either are
/// dropped by the cleaner before a `ContactRecord` is ever built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
    /// First and last name joined with a single space.
    pub name: String,
    /// Employer, truncated to [`MAX_COMPANY_CHARS`] characters.
    pub company: String,
    /// Job title; may be rewritten by label canonicalization.
    pub position: String,
    /// Date the connection was made.
    pub connected_on: NaiveDate,
    /// E-mail address, only present when the contact shares it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Longest company label kept after cleaning.
pub const MAX_COMPANY_CHARS: usize = 35;

/// One row of `messages.csv`, localized to the target timezone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageRecord {
    pub conversation_id: String,
    pub from: String,
    pub to: String,
    pub timestamp: DateTime<Tz>,
}

/// A `(key, count)` pair produced by value-count aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationRow {
    pub key: String,
    pub count: u32,
}

impl AggregationRow {
    pub fn new(key: impl Into<String>, count: u32) -> Self {
        Self {
            key: key.into(),
            count,
        }
    }
}

// ── Grouping keys ─────────────────────────────────────────────────────────────

/// Columns of a [`ContactRecord`] that can be grouped on or rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactField {
    Name,
    Company,
    Position,
    Email,
}

impl ContactField {
    /// Borrow the value of this column, `None` when absent.
    pub fn value<'a>(&self, record: &'a ContactRecord) -> Option<&'a str> {
        match self {
            ContactField::Name => Some(record.name.as_str()),
            ContactField::Company => Some(record.company.as_str()),
            ContactField::Position => Some(record.position.as_str()),
            ContactField::Email => record.email.as_deref(),
        }
    }

    /// Mutable access for in-place label rewriting.
    pub fn value_mut<'a>(&self, record: &'a mut ContactRecord) -> Option<&'a mut String> {
        match self {
            ContactField::Name => Some(&mut record.name),
            ContactField::Company => Some(&mut record.company),
            ContactField::Position => Some(&mut record.position),
            ContactField::Email => record.email.as_mut(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContactField::Name => "name",
            ContactField::Company => "company",
            ContactField::Position => "position",
            ContactField::Email => "email",
        }
    }
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Columns of a [`MessageRecord`] that can be grouped on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageField {
    ConversationId,
    From,
    To,
}

impl MessageField {
    /// Borrow the value of this column; empty cells count as absent.
    pub fn value<'a>(&self, record: &'a MessageRecord) -> Option<&'a str> {
        let value = match self {
            MessageField::ConversationId => record.conversation_id.as_str(),
            MessageField::From => record.from.as_str(),
            MessageField::To => record.to.as_str(),
        };
        (!value.is_empty()).then_some(value)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
