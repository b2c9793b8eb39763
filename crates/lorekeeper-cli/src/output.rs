//! Output formatting for the CLI.

use crate::cli::CliFormat;
use crate::error::Result;
use colored::*;
use lorekeeper_domain::{Importance, KnowledgeRecord};
use lorekeeper_extractor::{ExtractionOutcome, PipelineStatus};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Longest content preview shown in a table cell
const PREVIEW_CHARS: usize = 60;

/// Output formatter.
pub struct Formatter {
    format: CliFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: CliFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format extracted records.
    pub fn format_records(&self, records: &[KnowledgeRecord]) -> Result<String> {
        match self.format {
            CliFormat::Json => self.format_records_json(records),
            CliFormat::Table => Ok(self.format_records_table(records)),
        }
    }

    /// Format records as JSON.
    fn format_records_json(&self, records: &[KnowledgeRecord]) -> Result<String> {
        let json_records: Vec<serde_json::Value> = records
            .iter()
            .map(|r| {
                serde_json::json!({
                    "id": r.id.to_string(),
                    "title": r.title,
                    "content": r.content,
                    "category": r.category.as_str(),
                    "keywords": r.keywords,
                    "importance": r.importance.as_str(),
                    "source": r.source,
                    "created_at": r.created_at,
                    "updated_at": r.updated_at
                })
            })
            .collect();

        Ok(serde_json::to_string_pretty(&json_records)?)
    }

    /// Format records as a table.
    fn format_records_table(&self, records: &[KnowledgeRecord]) -> String {
        if records.is_empty() {
            return self.colorize("No records extracted.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["Title", "Category", "Importance", "Keywords", "Content"]);

        for record in records {
            builder.push_record([
                record.title.clone(),
                record.category.to_string(),
                self.importance_label(record.importance),
                record.keywords.join(", "),
                preview(&record.content),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Summarise chunk outcomes and interruptions.
    pub fn outcome_summary(&self, outcome: &ExtractionOutcome) -> String {
        let meta = &outcome.metadata;
        let mut lines = vec![self.info(&format!(
            "{}: {} records ({} before dedup) from {} chunk(s), ~{} tokens, model {}, {} ms",
            meta.source_label,
            meta.records_after_dedup,
            meta.records_before_dedup,
            meta.chunk_count,
            meta.total_tokens,
            meta.model_name,
            meta.processing_time_ms
        ))];

        for chunk in outcome.failed_chunks() {
            if let Err(failure) = &chunk.outcome {
                lines.push(self.warning(&format!(
                    "chunk {}/{}: {}",
                    chunk.index, chunk.total, failure
                )));
            }
        }

        if let Some(suspension) = &outcome.interrupted {
            lines.push(self.warning(&format!("AI path interrupted: {}", suspension.reason())));
        }

        lines.join("\n")
    }

    /// Format the availability status.
    pub fn format_status(&self, status: &PipelineStatus) -> Result<String> {
        if self.format == CliFormat::Json {
            return Ok(serde_json::to_string_pretty(status)?);
        }

        let message = match (&status.reason, status.available) {
            (None, _) => return Ok(self.success("AI endpoint available")),
            (Some(reason), true) => format!("AI endpoint available ({})", reason),
            (Some(reason), false) => format!("AI endpoint unavailable: {}", reason),
        };
        Ok(if status.available {
            self.warning(&message)
        } else {
            self.error(&message)
        })
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn importance_label(&self, importance: Importance) -> String {
        let color = match importance {
            Importance::High => "red",
            Importance::Medium => "yellow",
            Importance::Low => "cyan",
        };
        self.colorize(importance.as_str(), color)
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

/// First line of `content`, cut to a table-friendly width.
fn preview(content: &str) -> String {
    let first_line = content.lines().next().unwrap_or_default();
    if first_line.chars().count() <= PREVIEW_CHARS {
        return first_line.to_string();
    }
    let cut: String = first_line.chars().take(PREVIEW_CHARS - 1).collect();
    format!("{}…", cut)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lorekeeper_domain::Category;

    fn create_test_record() -> KnowledgeRecord {
        KnowledgeRecord::new(
            "Expense policy",
            "Receipts are due within 30 days.",
            Category::Regulation,
            vec!["expenses".to_string(), "receipts".to_string()],
            Importance::High,
            "handbook",
        )
    }

    #[test]
    fn test_json_format() {
        let formatter = Formatter::new(CliFormat::Json, false);
        let output = formatter.format_records(&[create_test_record()]).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed[0]["title"], "Expense policy");
        assert_eq!(parsed[0]["category"], "regulation");
        assert_eq!(parsed[0]["importance"], "high");
        assert_eq!(parsed[0]["keywords"][1], "receipts");
    }

    #[test]
    fn test_table_format() {
        let formatter = Formatter::new(CliFormat::Table, false);
        let output = formatter.format_records(&[create_test_record()]).unwrap();
        assert!(output.contains("Importance"));
        assert!(output.contains("Expense policy"));
        assert!(output.contains("expenses, receipts"));
    }

    #[test]
    fn test_empty_records() {
        let formatter = Formatter::new(CliFormat::Table, false);
        let output = formatter.format_records(&[]).unwrap();
        assert!(output.contains("No records extracted"));
    }

    #[test]
    fn test_status_formats() {
        let status = PipelineStatus {
            available: false,
            reason: Some("suspended".to_string()),
            suspended_until: Some(1_700_000_000),
            consecutive_failures: 15,
        };

        let text = Formatter::new(CliFormat::Table, false).format_status(&status).unwrap();
        assert_eq!(text, "✗ AI endpoint unavailable: suspended");

        let json = Formatter::new(CliFormat::Json, false).format_status(&status).unwrap();
        assert!(json.contains("\"consecutive_failures\": 15"));
    }

    #[test]
    fn test_preview_truncates() {
        let long = "a".repeat(200);
        assert_eq!(preview(&long).chars().count(), PREVIEW_CHARS);
        assert_eq!(preview("one\ntwo"), "one");
    }
}
