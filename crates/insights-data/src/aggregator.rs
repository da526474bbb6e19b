//! Value-count aggregation over contact and message columns.
//!
//! Rows are ordered by count descending.  Equal counts keep the order in
//! which their key first appeared in the input, so identical input always
//! yields identical output.

use std::collections::HashMap;

use insights_core::models::{AggregationRow, ContactField, ContactRecord, MessageField, MessageRecord};

/// Stateless helper that counts values per grouping key.
pub struct Aggregator;

impl Aggregator {
    /// Count occurrences of each value.
    pub fn value_counts<'a, I>(values: I) -> Vec<AggregationRow>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut index: HashMap<&'a str, usize> = HashMap::new();
        let mut rows: Vec<AggregationRow> = Vec::new();

        for value in values {
            match index.get(value) {
                Some(&i) => rows[i].count += 1,
                None => {
                    index.insert(value, rows.len());
                    rows.push(AggregationRow::new(value, 1));
                }
            }
        }

        // `sort_by` is stable: ties stay in first-occurrence order.
        rows.sort_by(|a, b| b.count.cmp(&a.count));
        rows
    }

    /// Value counts of one contact column; absent values are skipped.
    pub fn by_contact_field(records: &[ContactRecord], field: ContactField) -> Vec<AggregationRow> {
        Self::value_counts(records.iter().filter_map(|r| field.value(r)))
    }

    /// Value counts of one message column; empty cells are skipped.
    pub fn by_message_field(messages: &[MessageRecord], field: MessageField) -> Vec<AggregationRow> {
        Self::value_counts(messages.iter().filter_map(|m| field.value(m)))
    }

    /// The first `n` rows.
    pub fn top_n(rows: &[AggregationRow], n: usize) -> Vec<AggregationRow> {
        rows.iter().take(n).cloned().collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
