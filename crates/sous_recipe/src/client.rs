//! HTTP client for the recipe lookup service.

use reqwest::header::{HeaderMap, HeaderValue};
use sous_config::RecipeApiConfig;
use tracing::{error, info, trace};
use url::Url;

use crate::{
    error::{Error, Result},
    recipe::Recipe,
};

const API_KEY_HEADER: &str = "X-Api-Key";

#[derive(Debug, Clone)]
pub struct RecipeClient {
    http_client: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
}

impl RecipeClient {
    #[must_use]
    pub fn new(config: &RecipeApiConfig) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    /// Look up recipes matching `name`, returning the raw response body.
    ///
    /// The body is a JSON array of recipes, which may be empty.
    pub async fn get_recipe(&self, name: &str) -> Result<String> {
        let mut url = self.base_url.join("recipe")?;
        url.query_pairs_mut().append_pair("query", name);

        info!(%url, "Looking up recipe.");

        let mut headers = HeaderMap::new();
        if let Some(key) = &self.api_key {
            match HeaderValue::from_str(key) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    headers.insert(API_KEY_HEADER, value);
                }
                Err(error) => error!(%error, "Invalid recipe API key, sending request without it."),
            }
        }

        let response = self
            .http_client
            .get(url)
            .headers(headers)
            .send()
            .await?;

        let status = response.status();
        trace!(status = status.as_u16(), "Received response.");

        let body = response.text().await?;
        if !status.is_success() {
            let status = status.as_u16();
            error!(status, body, "Recipe lookup failed.");

            return Err(Error::Api { status, body });
        }

        Ok(body)
    }

    /// Look up the first recipe matching `name`.
    pub async fn find_recipe(&self, name: &str) -> Result<Recipe> {
        let body = self.get_recipe(name).await?;
        Recipe::from_response(&body, name)
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
