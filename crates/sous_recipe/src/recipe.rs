//! See [`Recipe`].

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

const INGREDIENTS_LABEL: &str = "INGREDIENTS:";
const DIRECTIONS_LABEL: &str = "DIRECTIONS:";

/// A recipe as returned by the lookup service.
///
/// Ingredients and instructions are single strings, with items separated by
/// `|`, optionally prefixed by a label.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawRecipe {
    pub title: String,
    pub ingredients: String,
    pub instructions: String,
    pub servings: String,
}

/// A recipe, with its ingredients and instructions split into items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub title: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub servings: String,
}

impl Recipe {
    /// Parse the lookup service response, taking the first recipe.
    pub fn from_response(body: &str, query: &str) -> Result<Self> {
        let recipes: Vec<RawRecipe> = serde_json::from_str(body)?;
        debug!(query, found = recipes.len(), "Parsed recipe response.");

        recipes
            .into_iter()
            .next()
            .map(Self::from)
            .ok_or_else(|| Error::NotFound(query.to_owned()))
    }

    /// Render the recipe as pretty-printed JSON, as handed to the model.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(Into::into)
    }

    /// Render the recipe as Markdown.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = format!("# {}\n\n## Ingredients\n", self.title);
        for ingredient in &self.ingredients {
            let _ = writeln!(out, "- {ingredient}");
        }

        out.push_str("\n## Instructions\n");
        for (i, instruction) in self.instructions.iter().enumerate() {
            let _ = writeln!(out, "{}. {instruction}", i + 1);
        }

        let _ = writeln!(out, "\n**Servings:** {}", self.servings);
        out
    }
}

impl From<RawRecipe> for Recipe {
    fn from(raw: RawRecipe) -> Self {
        Self {
            title: raw.title,
            ingredients: split_items(&raw.ingredients, INGREDIENTS_LABEL),
            instructions: split_items(&raw.instructions, DIRECTIONS_LABEL),
            servings: raw.servings,
        }
    }
}

/// Split a `|`-separated list, dropping a leading label and empty items.
///
/// The label may be quoted with a leading `'`.
fn split_items(raw: &str, label: &str) -> Vec<String> {
    let trimmed = raw.trim_start();
    let unlabeled = trimmed
        .strip_prefix(label)
        .or_else(|| trimmed.strip_prefix('\'')?.strip_prefix(label))
        .unwrap_or(trimmed);

    unlabeled
        .split('|')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
#[path = "recipe_tests.rs"]
mod tests;
