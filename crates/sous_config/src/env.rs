//! Environment variable lookup and validation helpers.

use std::{env, fmt::Display, str::FromStr};

use crate::error::{Error, Result};

/// A source of environment variables.
///
/// The process environment is read through [`process_env`], tests pass a
/// closure over a fixed set of variables instead of mutating the process
/// environment.
pub trait Lookup {
    /// Returns the value of `key`, or `None` if it is unset.
    fn get(&self, key: &str) -> Option<String>;
}

impl<F> Lookup for F
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        self(key)
    }
}

/// Look up a variable in the process environment.
#[must_use]
pub fn process_env(key: &str) -> Option<String> {
    env::var(key).ok()
}

/// Reads a variable, treating blank values as unset.
pub(crate) fn non_empty(lookup: &dyn Lookup, key: &str) -> Option<String> {
    lookup
        .get(key)
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Collects required variables, remembering every one that is missing so they
/// can all be reported at once.
pub(crate) struct Required<'a> {
    lookup: &'a dyn Lookup,
    missing: Vec<&'static str>,
}

impl<'a> Required<'a> {
    pub(crate) fn new(lookup: &'a dyn Lookup) -> Self {
        Self {
            lookup,
            missing: vec![],
        }
    }

    /// Returns the value of `key`, or an empty string if it is missing.
    ///
    /// The returned value must not be used unless [`Self::finish`] succeeds.
    pub(crate) fn take(&mut self, key: &'static str) -> String {
        non_empty(self.lookup, key).unwrap_or_else(|| {
            self.missing.push(key);
            String::new()
        })
    }

    pub(crate) fn finish(self) -> Result<()> {
        if self.missing.is_empty() {
            return Ok(());
        }

        Err(Error::MissingEnv(self.missing))
    }
}

/// Parse an optional variable, falling back to `default` when unset.
pub(crate) fn optional<T>(lookup: &dyn Lookup, key: &'static str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    let Some(value) = non_empty(lookup, key) else {
        return Ok(default);
    };

    value.parse().map_err(|error: T::Err| Error::InvalidEnv {
        key,
        value,
        reason: error.to_string(),
    })
}
