//! A single turn from the terminal.

use std::io::Write;

use futures::{Stream, StreamExt as _};
use sous_conversation::{ConversationHistory, ToolCall};
use sous_llm::{Orchestrator, ParsedChunk, parse_stream};
use tracing::info;

use crate::{Ctx, Result};

#[derive(Debug, clap::Args)]
pub(crate) struct Ask {
    /// The message to send.
    #[arg(required = true)]
    message: String,

    /// Print the answer once complete, instead of streaming it.
    #[arg(long)]
    no_stream: bool,
}

impl Ask {
    pub(crate) async fn run(self, ctx: &Ctx, out: &mut impl Write) -> Result<()> {
        let orchestrator = Orchestrator::new(&*ctx.provider, &ctx.tools);
        let mut history = ConversationHistory::new();
        history.push_user(self.message);

        if self.no_stream {
            let text = orchestrator.complete_turn(&mut history).await?;
            writeln!(out, "{text}")?;
            return Ok(());
        }

        let chunks = ctx
            .provider
            .chat_completion_stream(&orchestrator.prompt(&history))
            .await?;
        let (text, calls) = print_stream(parse_stream(chunks), out).await?;

        if orchestrator.resolve(&mut history, &text, calls).await? {
            info!("Streaming follow-up answer.");
            if !text.is_empty() {
                writeln!(out, "\n")?;
            }

            let follow_up = orchestrator.follow_up_stream(&history).await?;
            print_stream(follow_up, out).await?;
        }

        writeln!(out)?;
        Ok(())
    }
}

/// Print text deltas as they arrive, returning the full text and the
/// completed tool calls.
async fn print_stream(
    stream: impl Stream<Item = std::result::Result<ParsedChunk, sous_llm::Error>>,
    out: &mut impl Write,
) -> Result<(String, Vec<ToolCall>)> {
    futures::pin_mut!(stream);

    let mut text = String::new();
    let mut calls = vec![];
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        write!(out, "{}", chunk.text_delta)?;
        out.flush()?;

        text = chunk.accumulated_text;
        calls.extend(chunk.completed_tools);
    }

    Ok((text, calls))
}

#[cfg(test)]
#[path = "ask_tests.rs"]
mod tests;
