//! Importance ranking and near-duplicate collapsing
//!
//! Quadratic in the number of records; the orchestrator only calls this on
//! bounded lists.

use lorekeeper_domain::KnowledgeRecord;
use tracing::debug;

/// Ranks records and removes near-duplicate titles
#[derive(Debug, Clone, Copy)]
pub struct Deduplicator {
    similarity_threshold: f64,
}

impl Deduplicator {
    /// Create a deduplicator; titles scoring at or above the threshold are duplicates
    pub fn new(similarity_threshold: f64) -> Self {
        Self {
            similarity_threshold,
        }
    }

    /// Sort by importance, drop near-duplicates, keep at most `max_count`
    ///
    /// The sort is stable, so records of equal importance keep their
    /// document order and the earliest of a duplicate group survives.
    pub fn optimize(
        &self,
        records: Vec<KnowledgeRecord>,
        max_count: usize,
    ) -> Vec<KnowledgeRecord> {
        let input_len = records.len();
        let mut sorted = records;
        sorted.sort_by_key(|r| std::cmp::Reverse(r.importance.rank()));

        let mut accepted: Vec<KnowledgeRecord> = Vec::with_capacity(max_count.min(input_len));
        let mut seen_titles: Vec<Vec<char>> = Vec::new();

        for record in sorted {
            if accepted.len() >= max_count {
                break;
            }

            let normalized: Vec<char> = normalize_title(&record.title).chars().collect();
            let duplicate = seen_titles
                .iter()
                .any(|seen| similarity(seen, &normalized) >= self.similarity_threshold);

            if duplicate {
                debug!("Dropping near-duplicate record '{}'", record.title);
                continue;
            }

            seen_titles.push(normalized);
            accepted.push(record);
        }

        debug!("Deduplicated {} records down to {}", input_len, accepted.len());
        accepted
    }
}

/// Lower-case and strip everything but letters, digits and spaces
pub fn normalize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// `1 - levenshtein(a, b) / max(len(a), len(b))`, with two empty strings scoring 1.0
pub fn similarity(a: &[char], b: &[char]) -> f64 {
    let longest = a.len().max(b.len());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / longest as f64
}

/// Edit distance over characters, two-row dynamic programming
pub fn levenshtein(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use lorekeeper_domain::{Category, Importance};

    fn record(title: &str, importance: Importance) -> KnowledgeRecord {
        KnowledgeRecord::new(title, "", Category::Terminology, vec![], importance, "test")
    }

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein(&chars("kitten"), &chars("sitting")), 3);
        assert_eq!(levenshtein(&chars(""), &chars("abc")), 3);
        assert_eq!(levenshtein(&chars("same"), &chars("same")), 0);
        assert_eq!(levenshtein(&chars("勤務規則"), &chars("勤務規定")), 1);
    }

    #[test]
    fn test_similarity_bounds() {
        assert_eq!(similarity(&chars(""), &chars("")), 1.0);
        assert_eq!(similarity(&chars("abc"), &chars("abc")), 1.0);
        assert_eq!(similarity(&chars("abc"), &chars("xyz")), 0.0);
    }

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("  Leave-Policy (2024)! "), "leavepolicy 2024");
        assert_eq!(normalize_title("Sales   Dept."), "sales dept");
    }

    #[test]
    fn test_sorts_by_importance() {
        let records = vec![
            record("Glossary", Importance::Low),
            record("Payroll", Importance::High),
            record("Parking", Importance::Medium),
        ];
        let result = Deduplicator::new(0.8).optimize(records, 10);
        let titles: Vec<_> = result.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Payroll", "Parking", "Glossary"]);
    }

    #[test]
    fn test_drops_near_duplicates_keeping_most_important() {
        let records = vec![
            record("Expense Policy", Importance::Medium),
            record("Expense policy.", Importance::High),
            record("Expense Policies", Importance::Low),
            record("Travel Booking", Importance::Medium),
        ];
        let result = Deduplicator::new(0.8).optimize(records, 10);

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].title, "Expense policy.");
        assert_eq!(result[0].importance, Importance::High);
        assert_eq!(result[1].title, "Travel Booking");
    }

    #[test]
    fn test_truncates_to_max_count() {
        let records: Vec<_> = ('a'..='t')
            .map(|c| record(&format!("Topic {}", c.to_string().repeat(6)), Importance::Medium))
            .collect();
        let result = Deduplicator::new(0.8).optimize(records, 5);
        assert_eq!(result.len(), 5);
    }

    #[test]
    fn test_input_is_not_mutated_in_place() {
        let original = record("Onboarding", Importance::High);
        let result = Deduplicator::new(0.8).optimize(vec![original.clone()], 1);
        assert_eq!(result[0], original);
    }
}
