//! Nested grouping of contacts (e.g. company → position → name) for
//! tree-map style views.

use std::collections::HashMap;

use insights_core::models::{ContactField, ContactRecord};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HierarchyNode {
    pub label: String,
    /// Contacts under this node.
    pub count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<HierarchyNode>,
}

/// Company → position → contact name.
pub fn company_hierarchy(records: &[ContactRecord]) -> Vec<HierarchyNode> {
    build_hierarchy(
        records,
        &[ContactField::Company, ContactField::Position, ContactField::Name],
    )
}

/// Position → company → contact name.
pub fn position_hierarchy(records: &[ContactRecord]) -> Vec<HierarchyNode> {
    build_hierarchy(
        records,
        &[ContactField::Position, ContactField::Company, ContactField::Name],
    )
}

/// Group `records` by each field of `levels` in turn.
///
/// Siblings appear in first-occurrence order.  Records with no value for a
/// level (an empty name, a missing e-mail) are left out below that level.
pub fn build_hierarchy(records: &[ContactRecord], levels: &[ContactField]) -> Vec<HierarchyNode> {
    let refs: Vec<&ContactRecord> = records.iter().collect();
    group(&refs, levels)
}

fn group(records: &[&ContactRecord], levels: &[ContactField]) -> Vec<HierarchyNode> {
    let Some((field, rest)) = levels.split_first() else {
        return Vec::new();
    };

    let mut order: Vec<&str> = Vec::new();
    let mut members: HashMap<&str, Vec<&ContactRecord>> = HashMap::new();
    for &record in records {
        let Some(value) = field.value(record).filter(|v| !v.is_empty()) else {
            continue;
        };
        members
            .entry(value)
            .or_insert_with(|| {
                order.push(value);
                Vec::new()
            })
            .push(record);
    }

    order
        .into_iter()
        .map(|label| {
            let group_records = members.remove(label).unwrap_or_default();
            HierarchyNode {
                label: label.to_string(),
                count: group_records.len(),
                children: group(&group_records, rest),
            }
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
