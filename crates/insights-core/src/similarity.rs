//! Approximate string similarity on a 0–100 scale.
//!
//! [`WeightedRatio`] blends plain, partial and token-based ratios the way
//! common fuzzy-matching libraries do, so that `"Senior Data Scientist"`
//! and `"Data Scientist"` score high while `"Chef"` does not.  All ratios
//! operate on [`default_process`]ed strings.

use std::collections::BTreeSet;

/// Scores the closeness of two labels, `0` (unrelated) to `100` (equal).
pub trait Scorer {
    fn score(&self, query: &str, choice: &str) -> u8;
}

/// Multi-strategy ratio; the default scorer for label canonicalization.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedRatio;

impl Scorer for WeightedRatio {
    fn score(&self, query: &str, choice: &str) -> u8 {
        to_score(weighted_ratio(&default_process(query), &default_process(choice)))
    }
}

/// Jaro-Winkler similarity scaled to 0–100.
#[derive(Debug, Clone, Copy, Default)]
pub struct JaroWinkler;

impl Scorer for JaroWinkler {
    fn score(&self, query: &str, choice: &str) -> u8 {
        let sim = strsim::jaro_winkler(&default_process(query), &default_process(choice));
        to_score(sim * 100.0)
    }
}

/// Look up a scorer by its CLI name (`"weighted"` or `"jaro-winkler"`).
pub fn scorer_by_name(name: &str) -> Option<Box<dyn Scorer>> {
    match name {
        "weighted" => Some(Box::new(WeightedRatio)),
        "jaro-winkler" => Some(Box::new(JaroWinkler)),
        _ => None,
    }
}

fn to_score(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

// ── Pre-processing ────────────────────────────────────────────────────────────

/// Lowercase, replace every non-alphanumeric character with a space, and
/// collapse whitespace runs.
pub fn default_process(s: &str) -> String {
    let mapped: String = s
        .chars()
        .flat_map(|c| {
            let replaced = if c.is_alphanumeric() { c } else { ' ' };
            replaced.to_lowercase()
        })
        .collect();
    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ── Ratios ────────────────────────────────────────────────────────────────────

const UNBASE_SCALE: f64 = 0.95;

/// Length of the longest common subsequence of two char slices.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                curr[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

fn ratio_chars(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    200.0 * lcs_len(a, b) as f64 / total as f64
}

/// Normalized indel similarity: `200 * LCS / (len_a + len_b)`.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    ratio_chars(&a, &b)
}

/// Best [`ratio`] of the shorter string against any alignment inside the
/// longer one, including windows clipped at either end.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    if short.is_empty() {
        return if long.is_empty() { 100.0 } else { 0.0 };
    }
    if short.len() == long.len() {
        return ratio_chars(&short, &long);
    }

    let width = short.len();
    let mut best = 0.0f64;

    for start in 0..=(long.len() - width) {
        best = best.max(ratio_chars(&short, &long[start..start + width]));
        if best >= 100.0 {
            return 100.0;
        }
    }
    for clipped in 1..width {
        best = best
            .max(ratio_chars(&short, &long[..clipped]))
            .max(ratio_chars(&short, &long[long.len() - clipped..]));
    }
    best
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn join_set(set: &BTreeSet<&str>) -> String {
    set.iter().copied().collect::<Vec<_>>().join(" ")
}

/// [`ratio`] after sorting the whitespace-separated tokens of both strings.
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

/// Compares the shared token set against each side's remainder.
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let ta: BTreeSet<&str> = a.split_whitespace().collect();
    let tb: BTreeSet<&str> = b.split_whitespace().collect();
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }

    let intersection: BTreeSet<&str> = ta.intersection(&tb).copied().collect();
    let diff_ab: BTreeSet<&str> = ta.difference(&tb).copied().collect();
    let diff_ba: BTreeSet<&str> = tb.difference(&ta).copied().collect();

    if !intersection.is_empty() && (diff_ab.is_empty() || diff_ba.is_empty()) {
        return 100.0;
    }

    let sect = join_set(&intersection);
    let combined_ab = format!("{} {}", sect, join_set(&diff_ab)).trim().to_string();
    let combined_ba = format!("{} {}", sect, join_set(&diff_ba)).trim().to_string();

    let mut best = ratio(&combined_ab, &combined_ba);
    if !sect.is_empty() {
        best = best
            .max(ratio(&sect, &combined_ab))
            .max(ratio(&sect, &combined_ba));
    }
    best
}

/// [`partial_ratio`] over sorted tokens; any shared token scores 100.
pub fn partial_token_ratio(a: &str, b: &str) -> f64 {
    let tokens_a: Vec<&str> = a.split_whitespace().collect();
    let tokens_b: Vec<&str> = b.split_whitespace().collect();
    let set_a: BTreeSet<&str> = tokens_a.iter().copied().collect();
    let set_b: BTreeSet<&str> = tokens_b.iter().copied().collect();

    if set_a.is_empty() || set_b.is_empty() {
        return 0.0;
    }
    if set_a.intersection(&set_b).next().is_some() {
        return 100.0;
    }

    let result = partial_ratio(&sorted_tokens(a), &sorted_tokens(b));
    if set_a.len() == tokens_a.len() && set_b.len() == tokens_b.len() {
        return result;
    }

    // Duplicate tokens collapse in the sets, so the deduplicated forms may align better.
    result.max(partial_ratio(&join_set(&set_a), &join_set(&set_b)))
}

/// Weighted blend of the ratios above, unrounded.
///
/// Strings of similar length are compared whole and by token; when one is
/// at least 1.5× longer the partial ratios take over, scaled down further
/// once the length ratio reaches 8.
pub fn weighted_ratio(a: &str, b: &str) -> f64 {
    let len_a = a.chars().count();
    let len_b = b.chars().count();
    if len_a == 0 || len_b == 0 {
        return 0.0;
    }

    let len_ratio = len_a.max(len_b) as f64 / len_a.min(len_b) as f64;
    let end_ratio = ratio(a, b);

    if len_ratio < 1.5 {
        let token_ratio = token_sort_ratio(a, b).max(token_set_ratio(a, b));
        return end_ratio.max(token_ratio * UNBASE_SCALE);
    }

    let partial_scale = if len_ratio < 8.0 { 0.9 } else { 0.6 };
    end_ratio
        .max(partial_ratio(a, b) * partial_scale)
        .max(partial_token_ratio(a, b) * UNBASE_SCALE * partial_scale)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
