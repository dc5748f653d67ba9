//! Configuration of the hosted model endpoint.

use std::{fmt, time::Duration};

use tracing::trace;

use crate::{
    env::{Lookup, Required, optional},
    error::{Error, Result},
};

pub const MODEL_ID_ENV: &str = "AWS_BEDROCK_MODEL_ID";
pub const REGION_ENV: &str = "AWS_REGION";
pub const API_KEY_ENV: &str = "AWS_BEARER_TOKEN_BEDROCK";
pub const TEMPERATURE_ENV: &str = "SOUS_TEMPERATURE";
pub const MAX_TOKENS_ENV: &str = "SOUS_MAX_TOKENS";
pub const CONNECT_TIMEOUT_ENV: &str = "SOUS_CONNECT_TIMEOUT_SECS";
pub const READ_TIMEOUT_ENV: &str = "SOUS_READ_TIMEOUT_SECS";
pub const MAX_ATTEMPTS_ENV: &str = "SOUS_MAX_ATTEMPTS";

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 3000;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Validated configuration for the model client.
///
/// Only constructed through [`LlmConfig::from_lookup`], so a value of this type
/// always has a model, a region and a bearer token.
#[derive(Clone, PartialEq)]
pub struct LlmConfig {
    /// The Bedrock model identifier, e.g.
    /// `anthropic.claude-3-5-sonnet-20240620-v1:0`.
    pub model_id: String,

    /// The AWS region hosting the Bedrock runtime endpoint.
    pub region: String,

    /// Bearer token used to authenticate against Bedrock.
    pub api_key: String,

    /// Sampling temperature.
    pub temperature: f32,

    /// Maximum number of tokens the model may produce per response.
    pub max_tokens: u32,

    /// Timeout for establishing a connection.
    pub connect_timeout: Duration,

    /// Timeout for reading a (streamed) response.
    pub read_timeout: Duration,

    /// Number of attempts made for a request before giving up.
    pub max_attempts: u32,
}

impl LlmConfig {
    /// Build the configuration from environment variables.
    ///
    /// Every missing required variable is reported in a single
    /// [`Error::MissingEnv`].
    pub fn from_lookup(lookup: &dyn Lookup) -> Result<Self> {
        trace!("Loading model configuration from environment.");

        let mut required = Required::new(lookup);
        let model_id = required.take(MODEL_ID_ENV);
        let region = required.take(REGION_ENV);
        let api_key = required.take(API_KEY_ENV);
        required.finish()?;

        let temperature = optional(lookup, TEMPERATURE_ENV, DEFAULT_TEMPERATURE)?;
        if !(0.0..=1.0).contains(&temperature) {
            return Err(Error::InvalidEnv {
                key: TEMPERATURE_ENV,
                value: temperature.to_string(),
                reason: "must be between 0.0 and 1.0".to_owned(),
            });
        }

        let max_tokens = optional(lookup, MAX_TOKENS_ENV, DEFAULT_MAX_TOKENS)?;
        if max_tokens == 0 {
            return Err(Error::InvalidEnv {
                key: MAX_TOKENS_ENV,
                value: max_tokens.to_string(),
                reason: "must be greater than zero".to_owned(),
            });
        }

        let max_attempts = optional(lookup, MAX_ATTEMPTS_ENV, DEFAULT_MAX_ATTEMPTS)?.max(1);

        Ok(Self {
            model_id,
            region,
            api_key,
            temperature,
            max_tokens,
            connect_timeout: Duration::from_secs(optional(
                lookup,
                CONNECT_TIMEOUT_ENV,
                DEFAULT_CONNECT_TIMEOUT_SECS,
            )?),
            read_timeout: Duration::from_secs(optional(
                lookup,
                READ_TIMEOUT_ENV,
                DEFAULT_READ_TIMEOUT_SECS,
            )?),
            max_attempts,
        })
    }
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("model_id", &self.model_id)
            .field("region", &self.region)
            .field("api_key", &"[REDACTED]")
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("connect_timeout", &self.connect_timeout)
            .field("read_timeout", &self.read_timeout)
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}

#[cfg(test)]
#[path = "llm_tests.rs"]
mod tests;
