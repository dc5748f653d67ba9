//! Process configuration.
//!
//! All configuration comes from environment variables. It is loaded once, at
//! startup, into immutable values that are then handed to the components that
//! need them.

pub mod env;
mod error;
pub mod llm;
pub mod recipe;

pub use env::{Lookup, process_env};
pub use error::Error;
pub use llm::LlmConfig;
pub use recipe::RecipeApiConfig;

/// The complete application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub recipe: RecipeApiConfig,
}

impl AppConfig {
    /// Load the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: &dyn Lookup) -> Result<Self, Error> {
        Ok(Self {
            llm: LlmConfig::from_lookup(lookup)?,
            recipe: RecipeApiConfig::from_lookup(lookup)?,
        })
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
