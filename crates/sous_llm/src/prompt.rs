//! See [`Prompt`].

use sous_conversation::{ConversationHistory, Turn};

use crate::tool::ToolDefinition;

/// The fixed instructions given to the model for every request.
pub const SYSTEM_INSTRUCTIONS: &str = "You are a helpful recipe assistant that provides cooking \
                                       recipes, nutritional information. Respond in a friendly, \
                                       conversational manner.";

/// Everything sent to the model for a single completion.
///
/// The turns are the prior conversation followed by the current user
/// message.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub system: String,
    pub turns: Vec<Turn>,
    pub tools: Vec<ToolDefinition>,
}

impl Prompt {
    /// Build a prompt from prior history and a new user message.
    #[must_use]
    pub fn new(history: &[Turn], input: impl Into<String>) -> Self {
        let mut turns = history.to_vec();
        turns.push(Turn::user(input));

        Self {
            system: SYSTEM_INSTRUCTIONS.to_owned(),
            turns,
            tools: vec![],
        }
    }

    /// Build a prompt from a history that already ends with the current user
    /// message, or with the results of tool calls.
    #[must_use]
    pub fn from_history(history: &ConversationHistory) -> Self {
        Self {
            system: SYSTEM_INSTRUCTIONS.to_owned(),
            turns: history.turns().to_vec(),
            tools: vec![],
        }
    }

    #[must_use]
    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    /// The most recent user message, if any.
    #[must_use]
    pub fn input(&self) -> Option<&str> {
        self.turns
            .iter()
            .rev()
            .find(|turn| turn.is_user())
            .map(Turn::text)
    }
}

#[cfg(test)]
#[path = "prompt_tests.rs"]
mod tests;
