//! Answer generation from retrieved context.

use crate::error::Result;
use crate::llm::{GenerationService, Prompts};
use tracing::debug;

/// Builds the grounded prompt and makes one generation call per question.
pub struct Answerer<'a, G> {
    generator: &'a G,
    prompts: Prompts,
}

impl<'a, G: GenerationService> Answerer<'a, G> {
    pub fn new(generator: &'a G, prompts: Prompts) -> Self {
        Self { generator, prompts }
    }

    /// Instruction, concatenated context in retrieval order, then the question.
    pub fn build_prompt(&self, question: &str, context: &[String]) -> String {
        self.prompts.answer(context, question)
    }

    /// Return the model's response verbatim.
    pub async fn answer(&self, question: &str, context: &[String]) -> Result<String> {
        let prompt = self.build_prompt(question, context);
        debug!(
            context_chunks = context.len(),
            prompt_chars = prompt.len(),
            "generating answer"
        );
        self.generator.generate(&prompt).await
    }
}
