//! The history as shown by the chat widget.

use serde::{Deserialize, Serialize};

/// One exchange as rendered by the chat widget: the user's message and the
/// assistant's reply, which is absent until the first text arrives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayTurn {
    pub user: String,

    #[serde(default)]
    pub assistant: Option<String>,
}

impl DisplayTurn {
    #[must_use]
    pub fn pending(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            assistant: None,
        }
    }
}

pub type DisplayHistory = Vec<DisplayTurn>;
