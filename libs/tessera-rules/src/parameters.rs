//! Engine parameters
//!
//! Parameters can be built in code or loaded with figment from a TOML, YAML or
//! JSON file, with `TESSERA_ENGINE_*` environment variables taking precedence.

use std::fmt;
use std::path::Path;

use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RuleError};

/// Prefix for environment overrides, e.g. `TESSERA_ENGINE_PRIORITY_THRESHOLD=10`
pub const ENV_PREFIX: &str = "TESSERA_ENGINE_";

/// Threshold and skip policies for a firing session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineParameters {
    /// Rules with a priority above this value stop the session
    pub priority_threshold: i32,
    /// Stop after the first rule whose actions succeed
    pub skip_on_first_applied_rule: bool,
    /// Stop after the first rule whose actions fail
    pub skip_on_first_failed_rule: bool,
    /// Stop after the first rule that is not triggered
    pub skip_on_first_non_triggered_rule: bool,
}

impl Default for EngineParameters {
    fn default() -> Self {
        Self {
            priority_threshold: i32::MAX,
            skip_on_first_applied_rule: false,
            skip_on_first_failed_rule: false,
            skip_on_first_non_triggered_rule: false,
        }
    }
}

impl EngineParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn priority_threshold(mut self, priority_threshold: i32) -> Self {
        self.priority_threshold = priority_threshold;
        self
    }

    pub fn skip_on_first_applied_rule(mut self, skip: bool) -> Self {
        self.skip_on_first_applied_rule = skip;
        self
    }

    pub fn skip_on_first_failed_rule(mut self, skip: bool) -> Self {
        self.skip_on_first_failed_rule = skip;
        self
    }

    pub fn skip_on_first_non_triggered_rule(mut self, skip: bool) -> Self {
        self.skip_on_first_non_triggered_rule = skip;
        self
    }

    /// Load parameters from a file, then apply environment overrides
    ///
    /// The format is chosen from the extension: `toml`, `yaml`/`yml` or `json`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| RuleError::Config("Config file must have an extension".to_string()))?;

        let figment = Figment::from(Serialized::defaults(Self::default()));
        let figment = match extension {
            "toml" => figment.merge(Toml::file(path)),
            "yaml" | "yml" => figment.merge(Yaml::file(path)),
            "json" => figment.merge(Json::file(path)),
            _ => {
                return Err(RuleError::Config(format!(
                    "Unsupported config file format: {}",
                    extension
                )))
            },
        };

        Self::from_figment(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    /// Extract parameters from a caller-assembled figment
    pub fn from_figment(figment: Figment) -> Result<Self> {
        figment
            .extract()
            .map_err(|e| RuleError::Config(format!("Failed to load engine parameters: {}", e)))
    }
}

impl fmt::Display for EngineParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Engine parameters {{ priority_threshold = {}, skip_on_first_applied_rule = {}, \
             skip_on_first_failed_rule = {}, skip_on_first_non_triggered_rule = {} }}",
            self.priority_threshold,
            self.skip_on_first_applied_rule,
            self.skip_on_first_failed_rule,
            self.skip_on_first_non_triggered_rule
        )
    }
}
