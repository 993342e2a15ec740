//! Prompts for answering and grading, in every supported language.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Language of the prompts, the fallback answer and the report labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Swedish,
    English,
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "swedish" | "sv" | "svenska" => Ok(Language::Swedish),
            "english" | "en" => Ok(Language::English),
            other => Err(format!("unknown language '{}'", other)),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::Swedish => write!(f, "swedish"),
            Language::English => write!(f, "english"),
        }
    }
}

/// Labels used when presenting questions, answers and gradings to a person.
#[derive(Debug, Clone, Copy)]
pub struct Labels {
    pub report_title: &'static str,
    pub question: &'static str,
    pub answer: &'static str,
    pub evaluation: &'static str,
    pub score: &'static str,
    pub average: &'static str,
    pub out_of: &'static str,
    pub no_scores: &'static str,
    pub user_prompt: &'static str,
    pub bot_prefix: &'static str,
}

/// Prompt builders for the answerer and the grader.
#[derive(Debug, Clone, Copy)]
pub struct Prompts {
    language: Language,
}

impl Prompts {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    /// Phrase the model must answer with when the context is insufficient.
    pub fn fallback_answer(&self) -> &'static str {
        match self.language {
            Language::Swedish => "Det vet jag inte",
            Language::English => "I don't know",
        }
    }

    /// Build the answer prompt: instruction, concatenated context, question.
    pub fn answer(&self, context: &[String], question: &str) -> String {
        let context = context.concat();
        match self.language {
            Language::Swedish => format!(
                "Besvara frågan nedan baserat enbart på kontexten. Om det inte finns information, säg '{}'.\n\nKONTEXT:\n{}\n\nFRÅGA: {}",
                self.fallback_answer(),
                context,
                question
            ),
            Language::English => format!(
                "Answer the question below using only the context. If the context does not contain the information, say '{}'.\n\nCONTEXT:\n{}\n\nQUESTION: {}",
                self.fallback_answer(),
                context,
                question
            ),
        }
    }

    /// Grading rubric sent ahead of every graded case.
    pub fn grading_rubric(&self) -> &'static str {
        match self.language {
            Language::Swedish => {
                r#"Du är ett intelligent utvärderingssystem vars uppgift är att utvärdera en AI-assistents svar på en fråga.

- Om svaret är perfekt, relevant och komplett: sätt poängen 10.
- Om svaret är bra men har små brister: 7–9.
- Om det är delvis rätt eller otydligt: 4–6.
- Om det är dåligt, felaktigt eller svårbegripligt: 1–3.
- Om det är helt fel eller inte besvarar frågan: 0.

Motivera betyget i 1–2 meningar.

Svara med JSON på formen {"score": <0-10>, "motivation": "<motivering>"}.
Om du inte kan svara med JSON, skriv en rad på formen "Poäng: <0-10>" följt av motiveringen.
"#
            }
            Language::English => {
                r#"You are an intelligent evaluation system whose task is to grade an AI assistant's answer to a question.

- If the answer is perfect, relevant and complete: give the score 10.
- If the answer is good but has small flaws: 7–9.
- If it is partly right or unclear: 4–6.
- If it is poor, wrong or hard to understand: 1–3.
- If it is completely wrong or does not answer the question: 0.

Motivate the score in 1–2 sentences.

Reply with JSON of the form {"score": <0-10>, "motivation": "<motivation>"}.
If you cannot reply with JSON, write a line of the form "Score: <0-10>" followed by the motivation.
"#
            }
        }
    }

    /// Build the full grading prompt for one case.
    pub fn grading(&self, question: &str, generated: &str, ideal: &str) -> String {
        let case = match self.language {
            Language::Swedish => format!(
                "\nFråga: {}\nAI-assistentens svar: {}\nÖnskat svar: {}\n",
                question, generated, ideal
            ),
            Language::English => format!(
                "\nQuestion: {}\nAI assistant's answer: {}\nReference answer: {}\n",
                question, generated, ideal
            ),
        };
        format!("{}{}", self.grading_rubric(), case)
    }

    pub fn labels(&self) -> Labels {
        match self.language {
            Language::Swedish => Labels {
                report_title: "*** Utvärdering av Chatbot ***",
                question: "Fråga",
                answer: "Svar från AI",
                evaluation: "Utvärdering",
                score: "Poäng",
                average: "Genomsnittligt betyg för chatbotten",
                out_of: "av",
                no_scores: "Inga giltiga poäng kunde tolkas.",
                user_prompt: "Du: ",
                bot_prefix: "Gemini: ",
            },
            Language::English => Labels {
                report_title: "*** Chatbot Evaluation ***",
                question: "Question",
                answer: "Answer from AI",
                evaluation: "Evaluation",
                score: "Score",
                average: "Average chatbot score",
                out_of: "of",
                no_scores: "No valid scores could be parsed.",
                user_prompt: "You: ",
                bot_prefix: "Gemini: ",
            },
        }
    }

    /// Prompt used to check that the API key works.
    pub fn connection_check() -> &'static str {
        "Say 'hello' and nothing else."
    }
}
