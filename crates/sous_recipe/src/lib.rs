//! Recipe lookups, and the tool exposing them to the model.

pub mod client;
mod error;
pub mod recipe;
pub mod tool;

pub use client::RecipeClient;
pub use error::Error;
pub use recipe::Recipe;
pub use tool::RecipeTool;
