//! Interactive question loop.

use crate::error::{RagError, Result};
use crate::llm::{EmbeddingService, GenerationService};
use crate::session::RagSession;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::warn;

/// Token that ends the session, compared case-insensitively.
pub const QUIT_TOKEN: &str = "q";

pub fn is_quit_command(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case(QUIT_TOKEN)
}

/// Counters reported when the loop ends.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ChatStats {
    pub answered: usize,
    pub failed: usize,
}

/// Read questions from `input` until the quit token or end of input.
///
/// A failed question is reported on `output` and the loop keeps going.
pub async fn run<E, G, R, W>(
    session: &RagSession<E, G>,
    input: R,
    output: &mut W,
) -> Result<ChatStats>
where
    E: EmbeddingService,
    G: GenerationService,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let labels = session.prompts().labels();
    let mut lines = input.lines();
    let mut stats = ChatStats::default();

    loop {
        write!(output, "{}", labels.user_prompt).map_err(stdout_error)?;
        output.flush().map_err(stdout_error)?;

        let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| RagError::io("<stdin>", e))?
        else {
            writeln!(output).map_err(stdout_error)?;
            break;
        };

        if is_quit_command(&line) {
            break;
        }

        let question = line.trim();
        if question.is_empty() {
            continue;
        }

        match session.ask(question).await {
            Ok(answer) => {
                writeln!(output, "{}{}", labels.bot_prefix, answer).map_err(stdout_error)?;
                stats.answered += 1;
            }
            Err(e) => {
                warn!(error = %e, "question failed");
                writeln!(output, "Error: {}", e).map_err(stdout_error)?;
                stats.failed += 1;
            }
        }
    }

    Ok(stats)
}

fn stdout_error(e: std::io::Error) -> RagError {
    RagError::io("<stdout>", e)
}
