mod ask;
mod recipe;
mod serve;

use std::io::Write;

use sous_config::{AppConfig, Lookup, RecipeApiConfig};
use sous_recipe::RecipeClient;

use crate::{Ctx, Result};

#[derive(Debug, clap::Subcommand)]
pub(crate) enum Commands {
    /// Start the chat widget server.
    Serve(serve::Serve),

    /// Ask the assistant a single question.
    #[command(visible_alias = "a")]
    Ask(ask::Ask),

    /// Look up a recipe without involving the assistant.
    #[command(visible_alias = "r")]
    Recipe(recipe::Recipe),
}

impl Commands {
    /// Run the command, loading only the configuration it needs from `env`.
    pub(crate) async fn run(self, env: &dyn Lookup, out: &mut impl Write) -> Result<()> {
        match self {
            Commands::Serve(args) => {
                let ctx = Ctx::new(&AppConfig::from_lookup(env)?)?;
                args.run(&ctx).await
            }
            Commands::Ask(args) => {
                let ctx = Ctx::new(&AppConfig::from_lookup(env)?)?;
                args.run(&ctx, out).await
            }
            Commands::Recipe(args) => {
                let recipes = RecipeClient::new(&RecipeApiConfig::from_lookup(env)?);
                args.run(&recipes, out).await
            }
        }
    }

    pub(crate) fn name(&self) -> &'static str {
        match self {
            Commands::Serve(_) => "serve",
            Commands::Ask(_) => "ask",
            Commands::Recipe(_) => "recipe",
        }
    }
}
