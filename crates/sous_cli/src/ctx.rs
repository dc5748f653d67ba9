use std::sync::Arc;

use sous_config::AppConfig;
use sous_llm::{Bedrock, Provider, ToolRegistry};
use sous_recipe::{RecipeClient, RecipeTool};

use crate::Result;

/// Everything a command needs, built once from validated configuration.
#[derive(Debug, Clone)]
pub(crate) struct Ctx {
    pub(crate) provider: Arc<dyn Provider>,
    pub(crate) tools: Arc<ToolRegistry>,
}

impl Ctx {
    pub(crate) fn new(config: &AppConfig) -> Result<Self> {
        let provider = Bedrock::new(&config.llm)?;
        let recipes = RecipeClient::new(&config.recipe);

        Ok(Self::with_provider(Arc::new(provider), recipes))
    }

    /// Create a context around an existing provider, registering the recipe
    /// tool.
    pub(crate) fn with_provider(provider: Arc<dyn Provider>, recipes: RecipeClient) -> Self {
        let tools = ToolRegistry::new().with(RecipeTool::new(recipes));

        Self {
            provider,
            tools: Arc::new(tools),
        }
    }
}
