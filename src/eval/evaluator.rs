//! Runs a validation set through the chatbot and grades every answer.

use crate::eval::dataset::{ValidationItem, ValidationSet};
use crate::eval::grader::{Grader, ScoreOutcome};
use crate::llm::{EmbeddingService, GenerationService};
use crate::session::RagSession;
use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Outcome of one evaluated question, as persisted in the results file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct EvaluationRecord {
    pub question: String,
    pub answer: String,
    pub grading: String,
    #[serde(default)]
    pub score: Option<f64>,
    /// Set when answering or grading failed for this question.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EvaluationRecord {
    fn failed(item: &ValidationItem, answer: String, error: String) -> Self {
        Self {
            question: item.question.clone(),
            answer,
            grading: String::new(),
            score: None,
            error: Some(error),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Running sum of the scores that could be read.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreTally {
    pub total_score: f64,
    pub score_count: usize,
}

impl ScoreTally {
    /// Count the outcome if it carries a score; unparseable outcomes are ignored.
    pub fn record(&mut self, outcome: &ScoreOutcome) {
        if let Some(score) = outcome.value() {
            self.total_score += score;
            self.score_count += 1;
        }
    }

    /// Mean score rounded to two decimals, `None` when nothing was counted.
    pub fn average(&self) -> Option<f64> {
        (self.score_count > 0)
            .then(|| (self.total_score / self.score_count as f64 * 100.0).round() / 100.0)
    }

    /// Rebuild a tally from persisted records.
    pub fn from_records(records: &[EvaluationRecord]) -> Self {
        let mut tally = Self::default();
        for score in records.iter().filter_map(|r| r.score) {
            tally.record(&ScoreOutcome::Structured(score));
        }
        tally
    }
}

/// Everything an evaluation run produced.
#[derive(Debug, Clone)]
pub struct EvaluationSummary {
    pub set_name: String,
    pub records: Vec<EvaluationRecord>,
    pub tally: ScoreTally,
}

impl EvaluationSummary {
    pub fn average(&self) -> Option<f64> {
        self.tally.average()
    }

    pub fn failed_cases(&self) -> usize {
        self.records.iter().filter(|r| r.is_failed()).count()
    }
}

/// Answers and grades validation items one after another.
pub struct Evaluator<'a, E, G> {
    session: &'a RagSession<E, G>,
}

impl<'a, E: EmbeddingService, G: GenerationService> Evaluator<'a, E, G> {
    pub fn new(session: &'a RagSession<E, G>) -> Self {
        Self { session }
    }

    /// Answer one item with the chatbot, then grade the answer.
    pub async fn evaluate_item(&self, item: &ValidationItem) -> (EvaluationRecord, ScoreOutcome) {
        let answer = match self.session.ask(&item.question).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!(question = %item.question, error = %e, "answering failed");
                return (
                    EvaluationRecord::failed(item, String::new(), e.to_string()),
                    ScoreOutcome::Unparseable,
                );
            }
        };

        let grader = Grader::new(self.session.generator(), self.session.prompts());
        match grader
            .grade(&item.question, &answer, &item.ideal_answer)
            .await
        {
            Ok(grade) => (
                EvaluationRecord {
                    question: item.question.clone(),
                    answer,
                    grading: grade.narrative,
                    score: grade.outcome.value(),
                    error: None,
                },
                grade.outcome,
            ),
            Err(e) => {
                warn!(question = %item.question, error = %e, "grading failed");
                (
                    EvaluationRecord::failed(item, answer, e.to_string()),
                    ScoreOutcome::Unparseable,
                )
            }
        }
    }

    /// Evaluate every item in order. `on_item` sees each record as it is made.
    pub async fn run(
        &self,
        set: &ValidationSet,
        mut on_item: impl FnMut(usize, &EvaluationRecord),
    ) -> EvaluationSummary {
        info!(set = %set.name, items = set.len(), "starting evaluation");

        let mut records = Vec::with_capacity(set.len());
        let mut tally = ScoreTally::default();

        for (i, item) in set.items.iter().enumerate() {
            let (record, outcome) = self.evaluate_item(item).await;
            tally.record(&outcome);
            on_item(i, &record);
            records.push(record);
        }

        info!(
            scored = tally.score_count,
            total = records.len(),
            average = ?tally.average(),
            "evaluation finished"
        );

        EvaluationSummary {
            set_name: set.name.clone(),
            records,
            tally,
        }
    }
}
