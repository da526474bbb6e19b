//! Views over `messages.csv`.
//!
//! Timestamps are already localized to the target zone by the reader, so
//! hours and dates here are local.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{NaiveDate, Timelike};
use insights_core::models::{AggregationRow, MessageField, MessageRecord};
use serde::Serialize;

use crate::aggregator::Aggregator;

// ── Stats ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChatStats {
    pub total_messages: usize,
    pub conversations: usize,
    pub unique_senders: usize,
    pub unique_recipients: usize,
}

pub fn chat_stats(messages: &[MessageRecord]) -> ChatStats {
    let distinct = |field: MessageField| {
        messages
            .iter()
            .filter_map(|m| field.value(m))
            .collect::<HashSet<_>>()
            .len()
    };
    ChatStats {
        total_messages: messages.len(),
        conversations: distinct(MessageField::ConversationId),
        unique_senders: distinct(MessageField::From),
        unique_recipients: distinct(MessageField::To),
    }
}

// ── Correspondents ────────────────────────────────────────────────────────────

/// Senders or recipients by message count, without the account owner.
///
/// The owner takes part in every conversation and therefore always tops the
/// table, so the first row is dropped.
pub fn top_correspondents(messages: &[MessageRecord], field: MessageField) -> Vec<AggregationRow> {
    Aggregator::by_message_field(messages, field)
        .into_iter()
        .skip(1)
        .collect()
}

// ── Time of day ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HourCount {
    pub hour: u32,
    pub count: u32,
}

/// Messages per local hour of day, ascending; hours with no messages are omitted.
pub fn messages_per_hour(messages: &[MessageRecord]) -> Vec<HourCount> {
    let mut per_hour: BTreeMap<u32, u32> = BTreeMap::new();
    for message in messages {
        *per_hour.entry(message.timestamp.hour()).or_default() += 1;
    }
    per_hour
        .into_iter()
        .map(|(hour, count)| HourCount { hour, count })
        .collect()
}

// ── Daily activity ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyActivity {
    pub date: NaiveDate,
    pub count: u32,
    /// Everyone who sent or received a message that day, sorted.
    pub participants: BTreeSet<String>,
}

/// Messages per local date, ascending.
pub fn daily_activity(messages: &[MessageRecord]) -> Vec<DailyActivity> {
    let mut per_day: BTreeMap<NaiveDate, (u32, BTreeSet<String>)> = BTreeMap::new();
    for message in messages {
        let (count, participants) = per_day.entry(message.timestamp.date_naive()).or_default();
        *count += 1;
        for field in [MessageField::From, MessageField::To] {
            if let Some(person) = field.value(message) {
                participants.insert(person.to_string());
            }
        }
    }
    per_day
        .into_iter()
        .map(|(date, (count, participants))| DailyActivity {
            date,
            count,
            participants,
        })
        .collect()
}

// ── Report ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ChatReport {
    pub stats: ChatStats,
    pub top_senders: Vec<AggregationRow>,
    pub top_recipients: Vec<AggregationRow>,
    pub hourly: Vec<HourCount>,
    pub daily: Vec<DailyActivity>,
}

/// Every chat view at once; correspondent tables are cut to `top_n` rows.
pub fn analyze_chats(messages: &[MessageRecord], top_n: usize) -> ChatReport {
    ChatReport {
        stats: chat_stats(messages),
        top_senders: Aggregator::top_n(&top_correspondents(messages, MessageField::From), top_n),
        top_recipients: Aggregator::top_n(&top_correspondents(messages, MessageField::To), top_n),
        hourly: messages_per_hour(messages),
        daily: daily_activity(messages),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
