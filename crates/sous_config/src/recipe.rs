//! Configuration of the external recipe lookup service.

use std::fmt;

use url::Url;

use crate::{
    env::{Lookup, non_empty},
    error::{Error, Result},
};

pub const API_KEY_ENV: &str = "API_NINJA_KEY";
pub const BASE_URL_ENV: &str = "SOUS_RECIPE_BASE_URL";
pub const DEFAULT_BASE_URL: &str = "https://api.api-ninjas.com/v1/";

#[derive(Clone, PartialEq)]
pub struct RecipeApiConfig {
    /// Base URL of the recipe API. Always ends with a `/`, so that endpoint
    /// paths can be joined onto it.
    pub base_url: Url,

    /// API key sent in the `X-Api-Key` header, if any.
    pub api_key: Option<String>,
}

impl RecipeApiConfig {
    pub fn from_lookup(lookup: &dyn Lookup) -> Result<Self> {
        let raw = non_empty(lookup, BASE_URL_ENV).unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        let base_url = parse_base_url(&raw).map_err(|error| Error::InvalidEnv {
            key: BASE_URL_ENV,
            value: raw.clone(),
            reason: error.to_string(),
        })?;

        Ok(Self {
            base_url,
            api_key: non_empty(lookup, API_KEY_ENV),
        })
    }
}

impl fmt::Debug for RecipeApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecipeApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Parse a base URL, making sure it ends in a `/`.
///
/// Without the trailing slash, [`Url::join`] would replace the last path
/// segment instead of appending to it.
pub fn parse_base_url(raw: &str) -> std::result::Result<Url, url::ParseError> {
    if raw.ends_with('/') {
        Url::parse(raw)
    } else {
        Url::parse(&format!("{raw}/"))
    }
}
