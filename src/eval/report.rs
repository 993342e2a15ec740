//! Human-readable evaluation reports.

use crate::error::{RagError, Result};
use crate::eval::evaluator::EvaluationRecord;
use crate::llm::Labels;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

const SEPARATOR_WIDTH: usize = 50;

fn push_record(out: &mut String, record: &EvaluationRecord, labels: &Labels, markdown: bool) {
    let grading = match &record.error {
        Some(error) => format!("Error: {}", error),
        None => record.grading.clone(),
    };

    if markdown {
        let _ = writeln!(out, "### {}: {}", labels.question, record.question);
        let _ = writeln!(out, "**{}**: {}", labels.answer, record.answer);
        let _ = writeln!(out, "**{}**:\n{}", labels.evaluation, grading);
    } else {
        let _ = writeln!(out, "{}: {}", labels.question, record.question);
        let _ = writeln!(out, "{}: {}", labels.answer, record.answer);
        let _ = writeln!(out, "{}:\n{}", labels.evaluation, grading);
    }
    let _ = writeln!(out, "{}", "=".repeat(SEPARATOR_WIDTH));
    out.push('\n');
}

/// Render all records as a markdown document.
pub fn render_markdown(records: &[EvaluationRecord], labels: &Labels) -> String {
    let mut out = format!("# {}\n\n", labels.report_title);
    for record in records {
        push_record(&mut out, record, labels, true);
    }
    out
}

/// Render all records as plain text for the terminal.
pub fn render_terminal(records: &[EvaluationRecord], labels: &Labels) -> String {
    let mut out = format!("{}\n\n", labels.report_title);
    for record in records {
        push_record(&mut out, record, labels, false);
    }
    out
}

/// Closing line with the average score, or a notice that none was found.
pub fn summary_line(average: Option<f64>, labels: &Labels) -> String {
    match average {
        Some(average) => format!("{}: {:.2} {} 10", labels.average, average, labels.out_of),
        None => labels.no_scores.to_string(),
    }
}

/// Write the markdown report to `path`, creating parent directories.
pub fn write_markdown(records: &[EvaluationRecord], labels: &Labels, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| RagError::io(parent, e))?;
        }
    }
    fs::write(path, render_markdown(records, labels)).map_err(|e| RagError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{Language, Prompts};
    use tempfile::TempDir;

    fn records() -> Vec<EvaluationRecord> {
        vec![
            EvaluationRecord {
                question: "Vad handlar examensarbetet om?".into(),
                answer: "Om heltal.".into(),
                grading: "Poäng: 8\nNästan komplett.".into(),
                score: Some(8.0),
                error: None,
            },
            EvaluationRecord {
                question: "Vilken metod användes?".into(),
                answer: String::new(),
                grading: String::new(),
                score: None,
                error: Some("timeout".into()),
            },
        ]
    }

    #[test]
    fn test_markdown_layout() {
        let labels = Prompts::new(Language::Swedish).labels();
        let report = render_markdown(&records(), &labels);

        assert!(report.starts_with("# *** Utvärdering av Chatbot ***\n\n"));
        assert!(report.contains("### Fråga: Vad handlar examensarbetet om?\n"));
        assert!(report.contains("**Svar från AI**: Om heltal.\n"));
        assert!(report.contains("**Utvärdering**:\nPoäng: 8\nNästan komplett.\n"));
        assert!(report.contains("**Utvärdering**:\nError: timeout\n"));
        assert_eq!(report.matches(&"=".repeat(50)).count(), 2);
    }

    #[test]
    fn test_terminal_layout_has_no_markup() {
        let labels = Prompts::new(Language::English).labels();
        let report = render_terminal(&records()[..1], &labels);

        assert!(report.contains("Question: Vad handlar examensarbetet om?\n"));
        assert!(report.contains("Answer from AI: Om heltal.\n"));
        assert!(!report.contains("###"));
        assert!(!report.contains("**Answer"));
    }

    #[test]
    fn test_summary_line() {
        let labels = Prompts::new(Language::Swedish).labels();
        assert_eq!(
            summary_line(Some(7.5), &labels),
            "Genomsnittligt betyg för chatbotten: 7.50 av 10"
        );
        assert_eq!(summary_line(None, &labels), labels.no_scores);
    }

    #[test]
    fn test_write_markdown() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("report.md");
        let labels = Prompts::new(Language::Swedish).labels();

        write_markdown(&records(), &labels, &path).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            render_markdown(&records(), &labels)
        );
    }
}
