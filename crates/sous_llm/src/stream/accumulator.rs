use std::fmt;

use indexmap::IndexMap;
use serde_json::{Map, Value, from_str};
use sous_conversation::ToolCall;

/// Identifies the tool call a streamed tool-use step belongs to.
///
/// The stream index is preferred, since only the first fragment of a tool
/// call carries its id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AccumulatorKey {
    Index(usize),
    Id(String),
}

impl AccumulatorKey {
    /// Resolve the key for a step, or `None` if the step carries neither an
    /// index nor an id.
    #[must_use]
    pub fn resolve(index: Option<usize>, id: Option<&str>) -> Option<Self> {
        match (index, id) {
            (Some(index), _) => Some(Self::Index(index)),
            (None, Some(id)) if !id.is_empty() => Some(Self::Id(id.to_owned())),
            _ => None,
        }
    }
}

impl fmt::Display for AccumulatorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "index_{index}"),
            Self::Id(id) => f.write_str(id),
        }
    }
}

/// A tool call that has started streaming but is not yet complete.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PartialToolCall {
    pub id: Option<String>,
    pub name: Option<String>,
    pub arguments: String,
}

impl PartialToolCall {
    /// Ingest a fragment.
    ///
    /// - `id`: Latest non-empty ID wins.
    /// - `name`: Latest non-empty name wins.
    /// - `partial_json`: Appended to the arguments buffer.
    fn add_fragment(&mut self, id: Option<String>, name: Option<String>, partial_json: &str) {
        if let Some(id) = id.filter(|v| !v.is_empty()) {
            self.id = Some(id);
        }

        if let Some(name) = name.filter(|v| !v.is_empty()) {
            self.name = Some(name);
        }

        self.arguments.push_str(partial_json);
    }

    /// The completed tool call, if the arguments parse as a JSON object and
    /// both id and name are known.
    fn complete(&self) -> Option<ToolCall> {
        let id = self.id.as_deref()?;
        let name = self.name.as_deref()?;
        let arguments = from_str::<Map<String, Value>>(&self.arguments).ok()?;

        Some(ToolCall::pending(id, name, arguments))
    }

    /// The completed tool call for a block that ended without arguments.
    fn complete_empty(&self) -> Option<ToolCall> {
        if !self.arguments.trim().is_empty() {
            return None;
        }

        let id = self.id.as_deref()?;
        let name = self.name.as_deref()?;

        Some(ToolCall::pending(id, name, Map::new()))
    }
}

/// Accumulates argument fragments of concurrently streaming tool calls.
///
/// An entry is created on the first fragment of a tool call, and removed the
/// moment it completes.
#[derive(Debug, Clone, Default)]
pub struct ToolCallAccumulator {
    pending: IndexMap<AccumulatorKey, PartialToolCall>,
}

impl ToolCallAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fragment, returning the completed tool call if this fragment
    /// completed it.
    pub fn add_fragment(
        &mut self,
        key: AccumulatorKey,
        id: Option<String>,
        name: Option<String>,
        partial_json: &str,
    ) -> Option<ToolCall> {
        let entry = self.pending.entry(key.clone()).or_default();
        entry.add_fragment(id, name, partial_json);

        let call = entry.complete()?;
        self.pending.shift_remove(&key);

        Some(call)
    }

    /// Close the tool call at `key` after its content block ended.
    ///
    /// Blank arguments complete as an empty object. Calls with unparsable
    /// arguments stay pending.
    pub fn close(&mut self, key: &AccumulatorKey) -> Option<ToolCall> {
        let call = self.pending.get(key)?.complete_empty()?;
        self.pending.shift_remove(key);

        Some(call)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Take all incomplete entries, leaving the accumulator empty.
    pub fn drain(&mut self) -> Vec<(AccumulatorKey, PartialToolCall)> {
        self.pending.drain(..).collect()
    }
}

#[cfg(test)]
#[path = "accumulator_tests.rs"]
mod tests;
