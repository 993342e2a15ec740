//! LLM-as-grader: scores a generated answer against a reference answer.

use crate::error::Result;
use crate::llm::{GenerationService, Prompts};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::LazyLock;
use tracing::warn;

/// Highest score on the rubric.
pub const MAX_SCORE: f64 = 10.0;

static SCORE_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(poäng|betyg|score)").expect("valid score label regex"));

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?\d+(?:[.,]\d+)?").expect("valid number regex"));

/// How a score was obtained from the grading response.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ScoreOutcome {
    /// Read from the schema-constrained JSON response.
    Structured(f64),
    /// Found on a labelled line of a free-text response.
    Extracted(f64),
    /// No score could be read; not counted in the average.
    Unparseable,
}

impl ScoreOutcome {
    pub fn value(&self) -> Option<f64> {
        match self {
            ScoreOutcome::Structured(score) | ScoreOutcome::Extracted(score) => Some(*score),
            ScoreOutcome::Unparseable => None,
        }
    }
}

/// The grader's verdict for one case.
#[derive(Debug, Clone)]
pub struct Grade {
    /// Human-readable grading text kept in the evaluation record.
    pub narrative: String,
    pub outcome: ScoreOutcome,
}

/// JSON object the grader is asked for.
#[derive(Debug, Deserialize)]
pub struct StructuredGrade {
    pub score: f64,
    #[serde(default)]
    pub motivation: String,
}

/// Grades answers with one generation call per case.
pub struct Grader<'a, G> {
    generator: &'a G,
    prompts: Prompts,
}

impl<'a, G: GenerationService> Grader<'a, G> {
    pub fn new(generator: &'a G, prompts: Prompts) -> Self {
        Self { generator, prompts }
    }

    /// Response schema in the API's OpenAPI subset.
    pub fn response_schema() -> serde_json::Value {
        json!({
            "type": "OBJECT",
            "properties": {
                "score": {
                    "type": "INTEGER",
                    "description": "Score from 0 to 10 according to the rubric"
                },
                "motivation": {
                    "type": "STRING",
                    "description": "Justification in 1-2 sentences"
                }
            },
            "required": ["score", "motivation"]
        })
    }

    /// Ask the model to grade `generated` against `ideal`.
    pub async fn grade(&self, question: &str, generated: &str, ideal: &str) -> Result<Grade> {
        let prompt = self.prompts.grading(question, generated, ideal);
        let response = self
            .generator
            .generate_json(&prompt, &Self::response_schema())
            .await?;
        Ok(self.interpret(&response))
    }

    /// Turn a raw grading response into a [`Grade`].
    pub fn interpret(&self, response: &str) -> Grade {
        if let Some(structured) = parse_structured(response) {
            return Grade {
                narrative: format!(
                    "{}: {}\n{}",
                    self.prompts.labels().score,
                    structured.score,
                    structured.motivation.trim()
                ),
                outcome: ScoreOutcome::Structured(structured.score),
            };
        }

        let outcome = extract_labelled_score(response)
            .map(ScoreOutcome::Extracted)
            .unwrap_or(ScoreOutcome::Unparseable);

        if outcome == ScoreOutcome::Unparseable {
            warn!(response_chars = response.len(), "no score found in grading response");
        }

        Grade {
            narrative: response.trim().to_string(),
            outcome,
        }
    }
}

/// Parse the JSON grade, tolerating code fences and surrounding text.
pub fn parse_structured(response: &str) -> Option<StructuredGrade> {
    serde_json::from_str::<StructuredGrade>(&extract_json(response))
        .ok()
        .filter(|grade| in_range(grade.score))
}

/// Find the first line mentioning a score label and read the first number
/// after its first colon. Lines that do not yield a valid score are skipped.
pub fn extract_labelled_score(response: &str) -> Option<f64> {
    response
        .lines()
        .filter(|line| SCORE_LABEL.is_match(line))
        .find_map(|line| {
            let (_, after) = line.split_once(':')?;
            let token = NUMBER.find(after)?.as_str().replace(',', ".");
            token.parse::<f64>().ok().filter(|score| in_range(*score))
        })
}

fn in_range(score: f64) -> bool {
    (0.0..=MAX_SCORE).contains(&score)
}

/// Extract JSON from a response.
fn extract_json(response: &str) -> String {
    let response = response.trim();

    if response.starts_with("```") {
        if let Some(end) = response.rfind("```") {
            let start = response.find('\n').map(|n| n + 1).unwrap_or(3);
            if end > start {
                return response[start..end].trim().to_string();
            }
        }
    }

    if let Some(start) = response.find('{') {
        if let Some(end) = response.rfind('}') {
            if end > start {
                return response[start..=end].to_string();
            }
        }
    }

    response.to_string()
}
