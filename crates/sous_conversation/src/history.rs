//! See [`ConversationHistory`].

use serde::Serialize;
use tracing::trace;

use crate::{
    error::{Error, Result},
    tool_call::ToolCall,
    turn::{ToolUse, Turn},
};

/// The ordered, append-only list of turns of one chat session.
///
/// The history guarantees that every [`Turn::ToolResult`] answers a tool call
/// declared by the assistant turn preceding it, and that no tool call is
/// answered twice.
///
/// Tool call ids are only unique within an exchange, the turns following one
/// user turn. Providers may reuse an id once the user has spoken again.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConversationHistory {
    turns: Vec<Turn>,
}

impl ConversationHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn iter(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.turns.push(Turn::user(text));
    }

    pub fn push_assistant(&mut self, text: impl Into<String>) {
        self.turns.push(Turn::assistant(text));
    }

    /// Append a turn, validating tool results against their declarations.
    pub fn push(&mut self, turn: Turn) -> Result<()> {
        if let Some(id) = turn.tool_call_id() {
            self.validate_tool_result(id)?;
        }

        self.turns.push(turn);
        Ok(())
    }

    /// Append the assistant's declaration of an executed tool call, followed by
    /// its result.
    pub fn push_tool_exchange(&mut self, text: impl Into<String>, call: &ToolCall) -> Result<()> {
        let Some(response) = call.response() else {
            return Err(Error::NotExecuted(call.id.clone()));
        };

        if is_declared(self.current_exchange(), &call.id) {
            return Err(Error::DuplicateToolResult(call.id.clone()));
        }

        trace!(id = %call.id, name = %call.name, "Recording tool exchange.");

        self.turns
            .push(Turn::assistant_with_tool_use(text, call.to_tool_use()));
        self.push(Turn::tool_result(
            &call.id,
            &call.name,
            response.content(),
            response.is_error(),
        ))
    }

    /// Tool calls declared by the assistant that have no result yet.
    ///
    /// The model must not be invoked while this is non-empty.
    #[must_use]
    pub fn unanswered_tool_calls(&self) -> Vec<&ToolUse> {
        self.turns
            .split(Turn::is_user)
            .flat_map(|exchange| {
                exchange
                    .iter()
                    .flat_map(Turn::tool_uses)
                    .filter(move |tool_use| !is_answered(exchange, &tool_use.id))
            })
            .collect()
    }

    /// Returns `true` if every declared tool call has a result.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.unanswered_tool_calls().is_empty()
    }

    /// Remove all turns.
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// The turns since the most recent user turn.
    fn current_exchange(&self) -> &[Turn] {
        let start = self
            .turns
            .iter()
            .rposition(Turn::is_user)
            .map_or(0, |i| i + 1);

        &self.turns[start..]
    }

    /// A tool result must follow (possibly after results for sibling calls)
    /// the assistant turn that declared it.
    fn validate_tool_result(&self, id: &str) -> Result<()> {
        let declaring = self
            .turns
            .iter()
            .rev()
            .find(|turn| !turn.is_tool_result());

        let declared = declaring.is_some_and(|turn| {
            turn.tool_uses().iter().any(|tool_use| tool_use.id == id)
        });

        if !declared {
            return Err(Error::UnknownToolCall(id.to_owned()));
        }

        if is_answered(self.current_exchange(), id) {
            return Err(Error::DuplicateToolResult(id.to_owned()));
        }

        Ok(())
    }
}

fn is_declared(exchange: &[Turn], id: &str) -> bool {
    exchange
        .iter()
        .flat_map(Turn::tool_uses)
        .any(|tool_use| tool_use.id == id)
}

fn is_answered(exchange: &[Turn], id: &str) -> bool {
    exchange.iter().any(|turn| turn.tool_call_id() == Some(id))
}

impl<'a> IntoIterator for &'a ConversationHistory {
    type Item = &'a Turn;
    type IntoIter = std::slice::Iter<'a, Turn>;

    fn into_iter(self) -> Self::IntoIter {
        self.turns.iter()
    }
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;
