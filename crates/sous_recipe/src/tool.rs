//! The `get_recipe` tool, exposing recipe lookups to the model.

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use sous_llm::{Tool, ToolDefinition, ToolError};
use tracing::debug;

use crate::client::RecipeClient;

pub const TOOL_NAME: &str = "get_recipe";

#[derive(Debug, Clone)]
pub struct RecipeTool {
    client: RecipeClient,
}

impl RecipeTool {
    #[must_use]
    pub fn new(client: RecipeClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for RecipeTool {
    fn definition(&self) -> ToolDefinition {
        let schema = json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "Name of the recipe",
                },
            },
            "required": ["name"],
        });

        ToolDefinition {
            name: TOOL_NAME.to_owned(),
            description: "Get recipe from a meal name".to_owned(),
            input_schema: match schema {
                Value::Object(map) => map,
                _ => Map::new(),
            },
        }
    }

    async fn call(&self, arguments: &Map<String, Value>) -> Result<String, ToolError> {
        let name = arguments
            .get("name")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ToolError::InvalidArguments("missing string argument `name`".to_owned()))?;

        let recipe = self
            .client
            .find_recipe(name)
            .await
            .map_err(ToolError::execution)?;

        debug!(name, title = %recipe.title, "Found recipe.");
        recipe.to_json().map_err(ToolError::execution)
    }
}

#[cfg(test)]
#[path = "tool_tests.rs"]
mod tests;
