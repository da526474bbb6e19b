//! Fuzzy canonicalization of free-text labels such as job titles.
//!
//! A [`LabelCanonicalizer`] holds an ordered list of [`CanonicalPass`]es.
//! Passes run in sequence and rewrite matching values in place, so a later
//! pass can claim values an earlier pass already rewrote.  The default
//! position passes run `"Data Scientist"` (75) before `"Software Engineer"`
//! (65): the looser, more specific target is applied last and wins on overlap.

use std::collections::HashSet;

use insights_core::models::{ContactField, ContactRecord};
use insights_core::similarity::{Scorer, WeightedRatio};
use serde::Serialize;
use tracing::debug;

/// At most this many best-scoring unique values are considered per pass.
pub const MAX_CANDIDATES: usize = 500;

/// Default similarity threshold for a pass.
pub const DEFAULT_MIN_SIMILARITY: u8 = 75;

/// One `(target_label, threshold)` rewrite step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalPass {
    pub target: String,
    pub min_similarity: u8,
}

impl CanonicalPass {
    pub fn new(target: impl Into<String>, min_similarity: u8) -> Self {
        Self {
            target: target.into(),
            min_similarity,
        }
    }
}

/// Ordered canonicalization passes plus the scorer they share.
pub struct LabelCanonicalizer {
    passes: Vec<CanonicalPass>,
    scorer: Box<dyn Scorer>,
}

impl LabelCanonicalizer {
    pub fn new(passes: Vec<CanonicalPass>, scorer: Box<dyn Scorer>) -> Self {
        Self { passes, scorer }
    }

    /// Passes applied to job titles.
    pub fn default_position_passes() -> Vec<CanonicalPass> {
        vec![
            CanonicalPass::new("Data Scientist", DEFAULT_MIN_SIMILARITY),
            CanonicalPass::new("Software Engineer", 65),
        ]
    }

    /// Job-title passes with the weighted-ratio scorer.
    pub fn for_positions() -> Self {
        Self::new(Self::default_position_passes(), Box::new(WeightedRatio))
    }

    pub fn passes(&self) -> &[CanonicalPass] {
        &self.passes
    }

    /// Run every pass, in order, over `field`.  Returns the total number of
    /// values rewritten (a record rewritten twice counts twice).
    pub fn apply(&self, records: &mut [ContactRecord], field: ContactField) -> usize {
        self.passes
            .iter()
            .map(|pass| {
                canonicalize(
                    records,
                    field,
                    &pass.target,
                    pass.min_similarity,
                    self.scorer.as_ref(),
                )
            })
            .sum()
    }
}

/// Rewrite every value of `field` close enough to `target` into `target`.
///
/// Unique values are scored against `target`; the best [`MAX_CANDIDATES`]
/// (ties kept in first-occurrence order) that reach `min_similarity` are
/// replaced.  Returns how many records changed.
pub fn canonicalize(
    records: &mut [ContactRecord],
    field: ContactField,
    target: &str,
    min_similarity: u8,
    scorer: &dyn Scorer,
) -> usize {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut scored: Vec<(&str, u8)> = Vec::new();
    for record in records.iter() {
        if let Some(value) = field.value(record) {
            if seen.insert(value) {
                scored.push((value, scorer.score(target, value)));
            }
        }
    }

    // Stable sort keeps first-occurrence order among equal scores.
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    let matching: HashSet<String> = scored
        .into_iter()
        .take(MAX_CANDIDATES)
        .filter(|(_, score)| *score >= min_similarity)
        .map(|(value, _)| value.to_string())
        .collect();

    if matching.is_empty() {
        return 0;
    }

    let mut replaced = 0;
    for record in records.iter_mut() {
        if let Some(value) = field.value_mut(record) {
            if value.as_str() != target && matching.contains(value.as_str()) {
                *value = target.to_string();
                replaced += 1;
            }
        }
    }

    debug!(
        "Canonicalized {} {} value(s) to {:?} ({} distinct labels matched)",
        replaced,
        field,
        target,
        matching.len()
    );
    replaced
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use insights_core::similarity::JaroWinkler;

    fn record(position: &str) -> ContactRecord {
        ContactRecord {
            name: format!("Person {}", position),
            company: "Acme".to_string(),
            position: position.to_string(),
            connected_on: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            email: None,
        }
    }

    fn positions(records: &[ContactRecord]) -> Vec<&str> {
        records.iter().map(|r| r.position.as_str()).collect()
    }

    /// Scores by exact lookup so tests can control candidate ordering.
    struct TableScorer(Vec<(&'static str, u8)>);

    impl Scorer for TableScorer {
        fn score(&self, _query: &str, choice: &str) -> u8 {
            self.0
                .iter()
                .find(|(label, _)| *label == choice)
                .map(|(_, s)| *s)
                .unwrap_or(0)
        }
    }

    // ── canonicalize ──────────────────────────────────────────────────────────

    #[test]
    fn test_plural_rewritten_unrelated_untouched() {
        let mut records = vec![record("Data Scientists"), record("Chef")];
        let n = canonicalize(
            &mut records,
            ContactField::Position,
            "Data Scientist",
            75,
            &WeightedRatio,
        );

        assert_eq!(n, 1);
        assert_eq!(positions(&records), vec!["Data Scientist", "Chef"]);
    }

    #[test]
    fn test_rewrites_every_record_with_matching_value() {
        let mut records = vec![
            record("Senior Data Scientist"),
            record("Chef"),
            record("Senior Data Scientist"),
        ];
        let n = canonicalize(
            &mut records,
            ContactField::Position,
            "Data Scientist",
            75,
            &WeightedRatio,
        );

        assert_eq!(n, 2);
        assert_eq!(
            positions(&records),
            vec!["Data Scientist", "Chef", "Data Scientist"]
        );
    }

    #[test]
    fn test_idempotent() {
        let mut once = vec![
            record("Data Scientists"),
            record("Lead Data Scientist"),
            record("Data Analyst"),
            record("Chef"),
        ];
        canonicalize(&mut once, ContactField::Position, "Data Scientist", 75, &WeightedRatio);
        let mut twice = once.clone();
        let n = canonicalize(&mut twice, ContactField::Position, "Data Scientist", 75, &WeightedRatio);

        assert_eq!(n, 0);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let scorer = TableScorer(vec![("Exact", 70), ("Below", 69)]);
        let mut records = vec![record("Exact"), record("Below")];
        canonicalize(&mut records, ContactField::Position, "Target", 70, &scorer);
        assert_eq!(positions(&records), vec!["Target", "Below"]);
    }

    #[test]
    fn test_candidate_cap_keeps_best_scores() {
        // 501 distinct labels all above threshold; the single lowest-scoring
        // one falls outside the candidate window.
        let labels: Vec<&'static str> = (0..=MAX_CANDIDATES)
            .map(|i| &*Box::leak(format!("label-{i}").into_boxed_str()))
            .collect();
        let table = labels
            .iter()
            .enumerate()
            .map(|(i, l)| (*l, if i == 0 { 80 } else { 90 }))
            .collect();
        let scorer = TableScorer(table);
        let mut records: Vec<ContactRecord> = labels.iter().map(|l| record(l)).collect();

        let n = canonicalize(&mut records, ContactField::Position, "Target", 75, &scorer);

        assert_eq!(n, MAX_CANDIDATES);
        assert_eq!(records[0].position, "label-0");
        assert!(records[1..].iter().all(|r| r.position == "Target"));
    }

    #[test]
    fn test_candidate_cap_ties_prefer_first_occurrence() {
        let labels: Vec<&'static str> = (0..=MAX_CANDIDATES)
            .map(|i| &*Box::leak(format!("tie-{i}").into_boxed_str()))
            .collect();
        let scorer = TableScorer(labels.iter().map(|l| (*l, 90)).collect());
        let mut records: Vec<ContactRecord> = labels.iter().map(|l| record(l)).collect();

        canonicalize(&mut records, ContactField::Position, "Target", 75, &scorer);

        assert_eq!(records[MAX_CANDIDATES].position, format!("tie-{}", MAX_CANDIDATES));
        assert!(records[..MAX_CANDIDATES].iter().all(|r| r.position == "Target"));
    }

    #[test]
    fn test_email_field_skips_absent_values() {
        let mut records = vec![record("Chef")];
        let n = canonicalize(&mut records, ContactField::Email, "x@example.com", 0, &WeightedRatio);
        assert_eq!(n, 0);
        assert!(records[0].email.is_none());
    }

    #[test]
    fn test_empty_records() {
        let mut records: Vec<ContactRecord> = Vec::new();
        assert_eq!(
            canonicalize(&mut records, ContactField::Position, "Data Scientist", 75, &WeightedRatio),
            0
        );
    }

    // ── LabelCanonicalizer ────────────────────────────────────────────────────

    #[test]
    fn test_default_pass_order() {
        let passes = LabelCanonicalizer::default_position_passes();
        assert_eq!(
            passes,
            vec![
                CanonicalPass::new("Data Scientist", 75),
                CanonicalPass::new("Software Engineer", 65),
            ]
        );
    }

    #[test]
    fn test_apply_runs_both_default_passes() {
        let mut records = vec![
            record("Data Scientists"),
            record("Senior Software Engineer"),
            record("Chef"),
        ];
        LabelCanonicalizer::for_positions().apply(&mut records, ContactField::Position);
        assert_eq!(
            positions(&records),
            vec!["Data Scientist", "Software Engineer", "Chef"]
        );
    }

    #[test]
    fn test_later_pass_overwrites_earlier() {
        let scorer = TableScorer(vec![("Overlap", 80), ("First", 80), ("Second", 80)]);
        let canonicalizer = LabelCanonicalizer::new(
            vec![CanonicalPass::new("First", 75), CanonicalPass::new("Second", 75)],
            Box::new(scorer),
        );
        let mut records = vec![record("Overlap")];
        canonicalizer.apply(&mut records, ContactField::Position);

        // "Overlap" → "First" in pass one, then "First" → "Second" in pass two.
        assert_eq!(records[0].position, "Second");
    }

    #[test]
    fn test_apply_with_jaro_winkler() {
        let canonicalizer = LabelCanonicalizer::new(
            vec![CanonicalPass::new("Data Scientist", 90)],
            Box::new(JaroWinkler),
        );
        let mut records = vec![record("Data Scientists"), record("Chef")];
        canonicalizer.apply(&mut records, ContactField::Position);
        assert_eq!(positions(&records), vec!["Data Scientist", "Chef"]);
    }
}
