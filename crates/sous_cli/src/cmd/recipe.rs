use std::io::Write;

use sous_recipe::RecipeClient;
use tracing::debug;

use crate::Result;

#[derive(Debug, clap::Args)]
pub(crate) struct Recipe {
    /// Name of the meal to look up.
    #[arg(required = true)]
    name: String,

    /// Print the recipe as JSON, as handed to the assistant.
    #[arg(long)]
    json: bool,
}

impl Recipe {
    pub(crate) async fn run(self, recipes: &RecipeClient, out: &mut impl Write) -> Result<()> {
        let recipe = recipes.find_recipe(&self.name).await?;
        debug!(title = %recipe.title, json = self.json, "Printing recipe.");

        if self.json {
            writeln!(out, "{}", recipe.to_json()?)?;
        } else {
            write!(out, "{}", recipe.to_markdown())?;
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "recipe_tests.rs"]
mod tests;
