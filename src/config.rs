use serde::{Deserialize, Serialize};
use std::fs;
use std::env;
use std::io;
use std::path::Path;
use std::time::Duration;
use anyhow::{Result, Context};

use crate::models::PropertyType;

pub const DEFAULT_CONFIG_PATH: &str = "data/config.yaml";

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("unsupported property type '{token}'. Supported types: {supported}")]
    UnsupportedPropertyType { token: String, supported: String },

    #[error("user_agents must contain at least one entry")]
    EmptyUserAgentPool,

    #[error("max_jitter_secs must be a non-negative number of seconds within Duration range (got {0})")]
    InvalidJitter(f64),
}

/// Tunable scraper constants. Everything here has a built-in default and can be
/// overridden from `data/config.yaml` or the environment.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_user_agents")]
    pub user_agents: Vec<String>,
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_jitter_secs")]
    pub max_jitter_secs: f64,
    #[serde(default = "default_cities")]
    pub default_cities: Vec<String>,
    #[serde(default = "default_property_types")]
    pub default_property_types: Vec<PropertyType>,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
}

fn default_base_url() -> String {
    "https://www.aruodas.lt".to_string()
}

fn default_user_agents() -> Vec<String> {
    vec![
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string(),
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.1.1 Safari/605.1.15".to_string(),
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:89.0) Gecko/20100101 Firefox/89.0".to_string(),
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.114 Safari/537.36".to_string(),
    ]
}

fn default_accept_language() -> String {
    "lt,en-US;q=0.9,en;q=0.8".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_max_jitter_secs() -> f64 {
    1.0 // upper bound of the random extra pause after each page
}

fn default_cities() -> Vec<String> {
    ["Vilnius", "Kaunas", "Klaipėda", "Šiauliai", "Panevėžys"]
        .iter()
        .map(|c| c.to_string())
        .collect()
}

fn default_property_types() -> Vec<PropertyType> {
    vec![
        PropertyType::Flat,
        PropertyType::House,
        PropertyType::Land,
        PropertyType::Commercial,
    ]
}

fn default_tracing_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: default_base_url(),
            user_agents: default_user_agents(),
            accept_language: default_accept_language(),
            request_timeout_secs: default_request_timeout_secs(),
            max_jitter_secs: default_max_jitter_secs(),
            default_cities: default_cities(),
            default_property_types: default_property_types(),
            tracing_level: default_tracing_level(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from `data/config.yaml` when it exists.
    /// A path given explicitly must be readable; the default one is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config: Config = match path {
            Some(path) => {
                let config_str = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file {}", path.display()))?;
                serde_yaml::from_str(&config_str)
                    .with_context(|| format!("Failed to parse config file {}", path.display()))?
            }
            None => match read_optional(Path::new(DEFAULT_CONFIG_PATH))? {
                Some(config_str) => serde_yaml::from_str(&config_str)
                    .with_context(|| format!("Failed to parse config file {}", DEFAULT_CONFIG_PATH))?,
                None => Config::default(),
            },
        };

        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Override fields from environment-style variables supplied by `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup("ARUODAS_BASE_URL") {
            self.base_url = base_url;
        }

        if let Some(accept_language) = lookup("ACCEPT_LANGUAGE") {
            self.accept_language = accept_language;
        }

        if let Some(timeout) = lookup("REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = timeout.parse()
                .context("Failed to parse REQUEST_TIMEOUT_SECS environment variable")?;
        }

        if let Some(jitter) = lookup("MAX_JITTER_SECS") {
            self.max_jitter_secs = jitter.parse()
                .context("Failed to parse MAX_JITTER_SECS environment variable")?;
        }

        if let Some(tracing_level) = lookup("TRACING_LEVEL") {
            self.tracing_level = tracing_level;
        }

        Ok(())
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.user_agents.is_empty() {
            return Err(ConfigError::EmptyUserAgentPool);
        }

        if !self.max_jitter_secs.is_finite()
            || self.max_jitter_secs < 0.0
            || Duration::try_from_secs_f64(self.max_jitter_secs).is_err()
        {
            return Err(ConfigError::InvalidJitter(self.max_jitter_secs));
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn max_jitter(&self) -> Duration {
        Duration::from_secs_f64(self.max_jitter_secs)
    }
}

/// Contents of a file that may legitimately be absent. Only NotFound means
/// absent; any other read failure is an error.
fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Failed to read config file {}", path.display())),
    }
}

/// Concrete work list for one run, resolved from the command line
#[derive(Debug, Clone, PartialEq)]
pub struct RunPlan {
    pub cities: Vec<String>,
    pub property_types: Vec<PropertyType>,
    pub pages: u32,
    pub delay: Duration,
}

impl RunPlan {
    pub fn resolve(
        city: Option<&str>,
        property_type: Option<&str>,
        pages: u32,
        delay: Duration,
        config: &Config,
    ) -> std::result::Result<Self, ConfigError> {
        Ok(Self {
            cities: resolve_cities(city, &config.default_cities),
            property_types: resolve_property_types(property_type, &config.default_property_types)?,
            pages,
            delay,
        })
    }

    /// Number of page fetches this plan will issue
    pub fn page_count(&self) -> usize {
        self.cities.len() * self.property_types.len() * self.pages as usize
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn resolve_cities(raw: Option<&str>, defaults: &[String]) -> Vec<String> {
    let cities = raw.map(split_list).unwrap_or_default();
    if cities.is_empty() {
        defaults.to_vec()
    } else {
        cities
    }
}

/// Parse a comma-separated list of property-type codes. The first unknown
/// code aborts resolution.
pub fn resolve_property_types(
    raw: Option<&str>,
    defaults: &[PropertyType],
) -> std::result::Result<Vec<PropertyType>, ConfigError> {
    let tokens = raw.map(split_list).unwrap_or_default();
    if tokens.is_empty() {
        return Ok(defaults.to_vec());
    }

    tokens.iter().map(|token| token.parse::<PropertyType>()).collect()
}
