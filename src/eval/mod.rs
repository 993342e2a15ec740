//! Offline evaluation of the chatbot against a validation set.
//!
//! Each item is answered through the normal retrieval pipeline, graded by the
//! generation model on a 0–10 scale, and written to a results file and a
//! markdown report.

pub mod dataset;
pub mod evaluator;
pub mod grader;
pub mod report;

pub use dataset::{ValidationItem, ValidationSet};
pub use evaluator::{EvaluationRecord, EvaluationSummary, Evaluator, ScoreTally};
pub use grader::{Grade, Grader, ScoreOutcome};
pub use report::{render_markdown, render_terminal, summary_line, write_markdown};
