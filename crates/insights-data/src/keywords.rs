//! Keyword frequencies over job titles.

use insights_core::models::{AggregationRow, ContactRecord};
use insights_core::text_processing::TextNormalizer;

use crate::aggregator::Aggregator;

/// Stemmed keyword counts over arbitrary labels.
pub fn keyword_counts<'a, I>(labels: I, normalizer: &TextNormalizer) -> Vec<AggregationRow>
where
    I: IntoIterator<Item = &'a str>,
{
    let tokens: Vec<String> = labels
        .into_iter()
        .flat_map(|label| normalizer.tokens(label))
        .collect();
    Aggregator::value_counts(tokens.iter().map(String::as_str))
}

/// Stemmed keyword counts over every contact's position.
pub fn position_keywords(records: &[ContactRecord], normalizer: &TextNormalizer) -> Vec<AggregationRow> {
    keyword_counts(records.iter().map(|r| r.position.as_str()), normalizer)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(position: &str) -> ContactRecord {
        ContactRecord {
            name: "Someone".to_string(),
            company: "Acme".to_string(),
            position: position.to_string(),
            connected_on: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            email: None,
        }
    }

    #[test]
    fn test_position_keywords() {
        let records = vec![
            record("Head of Engineering"),
            record("Software Engineer"),
            record("VP, Engineering"),
        ];
        let rows = position_keywords(&records, TextNormalizer::shared_english());

        assert_eq!(rows[0], AggregationRow::new("engin", 3));
        assert!(rows.iter().all(|r| r.key != "of"));
        assert!(rows.iter().any(|r| r.key == "softwar"));
    }

    #[test]
    fn test_keyword_counts_custom_stopwords() {
        let normalizer = TextNormalizer::new(["senior"], rust_stemmers::Algorithm::English);
        let rows = keyword_counts(["Senior Consultant", "Consultant"], &normalizer);
        assert_eq!(rows, vec![AggregationRow::new("consult", 2)]);
    }

    #[test]
    fn test_keyword_counts_empty() {
        assert!(keyword_counts(Vec::<&str>::new(), TextNormalizer::shared_english()).is_empty());
    }
}
