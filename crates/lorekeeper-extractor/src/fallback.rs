//! Heuristic extraction that never calls the AI endpoint
//!
//! Title detection and classification are ordered rule tables. Each rule is
//! an independent predicate, so rules can be tested on their own.

use lorekeeper_domain::{Category, Importance, KnowledgeRecord};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;

/// Lines at or over this many characters are never "short" titles
const SHORT_TITLE_CHARS: usize = 50;

/// Keywords kept per record
const KEYWORD_COUNT: usize = 5;

const SENTENCE_ENDINGS: &[char] = &['.', '!', '?', '。', '！', '？', ':', '：', ','];

static LIST_MARKER: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:\d{1,3}[.)]|[A-Za-z][.)]|[(（]\d{1,3}[)）]|[①-⑳])\s*\S").ok()
});

static SECTION_KEYWORD: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?:第[0-9０-９一二三四五六七八九十百]+[章条節項]|(?i:chapter|section|article|part)\s+[0-9IVXivx]+\b)",
    )
    .ok()
});

/// A title-detection rule
type TitleRule = (&'static str, fn(&str) -> bool);

/// Title rules, checked in order; the first match wins
const TITLE_RULES: &[TitleRule] = &[
    ("markdown_heading", is_markdown_heading),
    ("section_keyword", has_section_keyword),
    ("list_marker", has_list_marker),
    ("all_upper_case", is_all_upper_case),
    ("short_unpunctuated", is_short_unpunctuated),
];

/// Category keyword sets, checked in order against the lower-cased title
///
/// Position is checked before department so that "部長" or "department
/// manager" land on the role rather than the unit.
const CATEGORY_RULES: &[(Category, &[&str])] = &[
    (
        Category::Position,
        &[
            "manager", "director", "officer", "position", "role", "chief", "役職", "部長", "課長",
            "担当者",
        ],
    ),
    (
        Category::Department,
        &["department", "division", "team", "office", "部署", "部門", "部", "課", "室"],
    ),
    (
        Category::Procedure,
        &[
            "procedure",
            "process",
            "how to",
            "steps",
            "workflow",
            "application",
            "手順",
            "手続",
            "方法",
            "申請",
            "フロー",
        ],
    ),
    (
        Category::Regulation,
        &[
            "regulation", "rule", "policy", "policies", "compliance", "規則", "規程", "規定", "就業",
            "禁止",
        ],
    ),
];

/// Importance keyword sets; high is checked before low
const IMPORTANCE_RULES: &[(Importance, &[&str])] = &[
    (
        Importance::High,
        &["important", "core", "critical", "mandatory", "重要", "必須"],
    ),
    (
        Importance::Low,
        &["supplementary", "optional", "reference", "補足", "参考"],
    ),
];

const STOP_WORDS: &[&str] = &[
    "the", "and", "of", "to", "in", "for", "is", "are", "be", "on", "or", "with", "as", "at", "by",
    "an", "it", "this", "that", "from", "must", "will", "all", "any",
];

/// Extracts records from headings and the text under them
#[derive(Debug, Clone, Copy)]
pub struct ManualExtractor {
    max_content_chars: usize,
}

impl ManualExtractor {
    /// Create an extractor that truncates content to `max_content_chars`
    pub fn new(max_content_chars: usize) -> Self {
        Self { max_content_chars }
    }

    /// Split `text` into titled sections and turn each into a record
    ///
    /// Always produces at least one record. Lines before the first title,
    /// or the whole document when no titles are found, go under a
    /// placeholder title derived from `label`.
    pub fn extract_heuristically(&self, text: &str, label: &str) -> Vec<KnowledgeRecord> {
        let sections = split_sections(text);

        let records: Vec<KnowledgeRecord> = if sections.is_empty() {
            vec![self.build_record(&placeholder_title(label), &[], label)]
        } else {
            sections
                .iter()
                .map(|section| {
                    let title = section
                        .title
                        .clone()
                        .unwrap_or_else(|| placeholder_title(label));
                    self.build_record(&title, &section.body, label)
                })
                .collect()
        };

        debug!("Manual extraction produced {} records from {}", records.len(), label);
        records
    }

    fn build_record(&self, title: &str, body: &[&str], label: &str) -> KnowledgeRecord {
        let full_content = if body.is_empty() {
            title.to_string()
        } else {
            body.join("\n")
        };
        let content: String = full_content.chars().take(self.max_content_chars).collect();

        let category = classify_category(title);
        let importance = classify_importance(title, &full_content);
        let keywords = top_keywords(&format!("{}\n{}", title, full_content), KEYWORD_COUNT);

        KnowledgeRecord::new(title, content, category, keywords, importance, label)
    }
}

struct Section<'a> {
    title: Option<String>,
    body: Vec<&'a str>,
}

fn split_sections(text: &str) -> Vec<Section<'_>> {
    let mut sections: Vec<Section<'_>> = Vec::new();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(rule) = title_rule(line) {
            debug!("Title line via {}: {}", rule, line);
            sections.push(Section {
                title: Some(clean_title(line)),
                body: Vec::new(),
            });
            continue;
        }

        match sections.last_mut() {
            Some(section) => section.body.push(line),
            None => sections.push(Section {
                title: None,
                body: vec![line],
            }),
        }
    }

    sections
}

/// Name of the first title rule matching `line`
pub fn title_rule(line: &str) -> Option<&'static str> {
    TITLE_RULES
        .iter()
        .find(|(_, predicate)| predicate(line))
        .map(|(name, _)| *name)
}

fn is_markdown_heading(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

fn has_section_keyword(line: &str) -> bool {
    SECTION_KEYWORD.as_ref().is_some_and(|re| re.is_match(line))
}

fn has_list_marker(line: &str) -> bool {
    LIST_MARKER.as_ref().is_some_and(|re| re.is_match(line))
}

fn is_all_upper_case(line: &str) -> bool {
    let letters: Vec<char> = line.chars().filter(|c| c.is_alphabetic()).collect();
    letters.len() >= 2 && letters.iter().all(|c| c.is_uppercase())
}

fn is_short_unpunctuated(line: &str) -> bool {
    line.chars().count() < SHORT_TITLE_CHARS && !line.contains(SENTENCE_ENDINGS)
}

fn clean_title(line: &str) -> String {
    line.trim_start_matches('#').trim().to_string()
}

fn placeholder_title(label: &str) -> String {
    format!("{} (summary)", label)
}

/// Category from the first keyword set the title matches
pub fn classify_category(title: &str) -> Category {
    let lowered = title.to_lowercase();
    CATEGORY_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or_default()
}

/// Importance from explicit markers in the title or content
pub fn classify_importance(title: &str, content: &str) -> Importance {
    let lowered = format!("{} {}", title, content).to_lowercase();
    IMPORTANCE_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(importance, _)| *importance)
        .unwrap_or_default()
}

/// The `count` most frequent tokens, ties broken by first appearance
pub fn top_keywords(text: &str, count: usize) -> Vec<String> {
    let mut frequencies: HashMap<String, (usize, usize)> = HashMap::new();

    let tokens = text
        .split(|c: char| !c.is_alphanumeric())
        .map(str::to_lowercase)
        .filter(|t| t.chars().count() >= 2 && !STOP_WORDS.contains(&t.as_str()));

    for (position, token) in tokens.enumerate() {
        frequencies.entry(token).or_insert((0, position)).0 += 1;
    }

    let mut ranked: Vec<(String, (usize, usize))> = frequencies.into_iter().collect();
    ranked.sort_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
        count_b.cmp(count_a).then(first_a.cmp(first_b))
    });

    ranked.into_iter().take(count).map(|(token, _)| token).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> ManualExtractor {
        ManualExtractor::new(500)
    }

    #[test]
    fn test_title_rules_individually() {
        assert_eq!(title_rule("# Leave policy"), Some("markdown_heading"));
        assert_eq!(title_rule("第3章 就業時間"), Some("section_keyword"));
        assert_eq!(title_rule("Section 4 Overtime, holidays and leave."), Some("section_keyword"));
        assert_eq!(
            title_rule("2) Submit the form to your manager, then wait."),
            Some("list_marker")
        );
        assert_eq!(
            title_rule("GENERAL PROVISIONS, SCOPE AND PURPOSE OF THIS DOCUMENT."),
            Some("all_upper_case")
        );
        assert_eq!(title_rule("Expense reimbursement"), Some("short_unpunctuated"));
        assert_eq!(title_rule("Employees submit expenses."), None);
        assert_eq!(
            title_rule("This sentence is long enough that it cannot be a title at all"),
            None
        );
    }

    #[test]
    fn test_sections_become_records() {
        let text = "# Sales Department\n\
                    The sales department handles all client accounts in the region.\n\
                    It reports to the chief operating officer every quarter.\n\
                    # Expense Procedure\n\
                    Submit receipts within thirty days of purchase, please.\n";
        let records = extractor().extract_heuristically(text, "handbook");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "Sales Department");
        assert_eq!(records[0].category, Category::Department);
        assert!(records[0].content.contains("client accounts"));
        assert!(records[0].keywords.contains(&"sales".to_string()));
        assert_eq!(records[1].title, "Expense Procedure");
        assert_eq!(records[1].category, Category::Procedure);
        assert!(records.iter().all(|r| r.source == "handbook"));
    }

    #[test]
    fn test_no_titles_yields_single_record() {
        let text = "This document has no headings, only sentences of ordinary prose.\n\
                    Every line ends with punctuation, so none of them looks like a title.\n";
        let records = extractor().extract_heuristically(text, "memo.txt");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "memo.txt (summary)");
        assert!(records[0].content.starts_with("This document"));
    }

    #[test]
    fn test_preamble_gets_placeholder_section() {
        let text = "Welcome to the company, we are glad you are here.\n# Parking\nUse level B2.\n";
        let records = extractor().extract_heuristically(text, "guide");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "guide (summary)");
        assert_eq!(records[1].title, "Parking");
    }

    #[test]
    fn test_content_is_truncated() {
        let body = "x".repeat(2000) + ".";
        let text = format!("# Long section\n{}\n", body);
        let records = ManualExtractor::new(500).extract_heuristically(&text, "doc");

        assert_eq!(records[0].content.chars().count(), 500);
    }

    #[test]
    fn test_category_rules() {
        assert_eq!(classify_category("Department managers"), Category::Position);
        assert_eq!(classify_category("人事部"), Category::Department);
        assert_eq!(classify_category("申請手順"), Category::Procedure);
        assert_eq!(classify_category("就業規則"), Category::Regulation);
        assert_eq!(classify_category("Glossary"), Category::Terminology);
    }

    #[test]
    fn test_importance_rules() {
        assert_eq!(classify_importance("Core values", ""), Importance::High);
        assert_eq!(classify_importance("重要事項", ""), Importance::High);
        assert_eq!(classify_importance("Notes", "Supplementary reading."), Importance::Low);
        assert_eq!(classify_importance("Parking", "Level B2."), Importance::Medium);
    }

    #[test]
    fn test_top_keywords_by_frequency() {
        let keywords = top_keywords("leave leave leave sick sick vacation the the the x", 3);
        assert_eq!(keywords, vec!["leave", "sick", "vacation"]);
    }

    #[test]
    fn test_top_keywords_ties_keep_first_occurrence() {
        let keywords = top_keywords("beta alpha gamma", 5);
        assert_eq!(keywords, vec!["beta", "alpha", "gamma"]);
    }

    #[test]
    fn test_blank_document_still_yields_one_record() {
        let records = extractor().extract_heuristically("   \n\n", "empty");
        assert_eq!(records.len(), 1);
    }
}
