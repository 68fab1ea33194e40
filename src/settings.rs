use std::path::Path;

use log::debug;

use crate::error::{Error, Result};

/// Number of entropy bytes buffered when nothing else is configured.
pub const DEFAULT_BUFFER_SIZE: usize = 512;
/// Smallest buffer size that will be honoured, smaller values fall back to the default.
pub const MIN_BUFFER_SIZE: usize = 256;
/// Largest buffer size that will be honoured, larger values are capped to it.
pub const MAX_BUFFER_SIZE: usize = 1 << 20;

/// Environment prefix for the entropy settings, `RAND_BUFFER_SIZE` and `RAND_ALLOW_PRNG`.
pub const ENTROPY_ENV_PREFIX: &str = "RAND";
/// Environment prefix for the generator settings, `XKCD_DISABLE_RETRY_BUDGET`.
pub const GENERATOR_ENV_PREFIX: &str = "XKCD";

/// Settings for a `PassphraseGenerator` and the entropy pool it owns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub buffer_size: usize,
    /// Use a seeded pseudo random generator if the operating system source fails.
    pub allow_prng_fallback: bool,
    /// Keep drawing until enough words are found, with no upper bound on rejections.
    pub disable_retry_budget: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            buffer_size: DEFAULT_BUFFER_SIZE,
            allow_prng_fallback: false,
            disable_retry_budget: false,
        }
    }
}

impl GeneratorConfig {
    /// Sets the entropy buffer size. Sizes below `MIN_BUFFER_SIZE` select the default size and
    /// sizes above `MAX_BUFFER_SIZE` are capped.
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = effective_buffer_size(buffer_size);
        self
    }

    pub fn with_prng_fallback(mut self, allow: bool) -> Self {
        self.allow_prng_fallback = allow;
        self
    }

    pub fn with_retry_budget_disabled(mut self, disabled: bool) -> Self {
        self.disable_retry_budget = disabled;
        self
    }

    /// Reads `buffer_size`, `allow_prng` and `disable_retry_budget` from a settings object,
    /// keys that are missing keep their default value.
    pub fn from_settings(settings: &config::Config) -> Result<GeneratorConfig> {
        let mut result = GeneratorConfig::default();

        if let Some(size) = optional(settings.get_int("buffer_size"))? {
            let size = match usize::try_from(size) {
                Ok(size) => size,
                Err(_) if size > 0 => usize::MAX,
                Err(_) => 0,
            };
            result = result.with_buffer_size(size);
        }
        if let Some(allow) = optional(settings.get_bool("allow_prng"))? {
            result.allow_prng_fallback = allow;
        }
        if let Some(disabled) = optional(settings.get_bool("disable_retry_budget"))? {
            result.disable_retry_budget = disabled;
        }

        debug!("generator configuration: {:?}", result);
        Ok(result)
    }

    /// Builds the configuration from `RAND_BUFFER_SIZE`, `RAND_ALLOW_PRNG` and
    /// `XKCD_DISABLE_RETRY_BUDGET`.
    pub fn from_env() -> Result<GeneratorConfig> {
        GeneratorConfig::from_settings(&read_settings(None)?)
    }
}

/// Collects settings from an optional TOML file, overridden by the environment.
pub fn read_settings(settings_file: Option<&Path>) -> Result<config::Config> {
    let mut settings = config::Config::default();

    if let Some(path) = settings_file {
        settings.merge(config::File::from(path).required(false))?;
    }
    settings.merge(config::Environment::with_prefix(ENTROPY_ENV_PREFIX))?;
    settings.merge(config::Environment::with_prefix(GENERATOR_ENV_PREFIX))?;

    Ok(settings)
}

pub(crate) fn effective_buffer_size(requested: usize) -> usize {
    if requested < MIN_BUFFER_SIZE {
        DEFAULT_BUFFER_SIZE
    } else {
        requested.min(MAX_BUFFER_SIZE)
    }
}

fn optional<T>(res: std::result::Result<T, config::ConfigError>) -> Result<Option<T>> {
    match res {
        Ok(v) => Ok(Some(v)),
        Err(config::ConfigError::NotFound(_)) => Ok(None),
        Err(err) => Err(Error::from(err)),
    }
}

#[cfg(test)]
#[path = "tests/settings.rs"]
mod settings_tests;
