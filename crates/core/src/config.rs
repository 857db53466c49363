//! Session configuration: board size, timing, scoring and the RNG seed.
//!
//! Sources, later ones winning: built-in defaults, an optional JSON file
//! (missing fields fall back to defaults), then `MATCH_CASCADE_*` environment
//! variables.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::scoring::ScoreRules;
use crate::types::{
    BOARD_HEIGHT, BOARD_WIDTH, CLEAR_DELAY_MS, FALL_DELAY_MS, MATCH_CHECK_DELAY_MS,
    MAX_BOARD_DIM, MAX_CASCADE_PASSES, SWAP_DELAY_MS,
};

pub const ENV_WIDTH: &str = "MATCH_CASCADE_WIDTH";
pub const ENV_HEIGHT: &str = "MATCH_CASCADE_HEIGHT";
pub const ENV_SEED: &str = "MATCH_CASCADE_SEED";
pub const ENV_SWAP_MS: &str = "MATCH_CASCADE_SWAP_MS";
pub const ENV_MATCH_MS: &str = "MATCH_CASCADE_MATCH_MS";
pub const ENV_CLEAR_MS: &str = "MATCH_CASCADE_CLEAR_MS";
pub const ENV_FALL_MS: &str = "MATCH_CASCADE_FALL_MS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub width: u8,
    pub height: u8,
    pub seed: u32,
    pub swap_delay_ms: u32,
    pub match_check_delay_ms: u32,
    pub clear_delay_ms: u32,
    pub fall_delay_ms: u32,
    pub scoring: ScoreRules,
    /// Resolution passes allowed per turn before the cascade is cut short
    pub max_cascade_passes: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: BOARD_WIDTH,
            height: BOARD_HEIGHT,
            seed: 1,
            swap_delay_ms: SWAP_DELAY_MS,
            match_check_delay_ms: MATCH_CHECK_DELAY_MS,
            clear_delay_ms: CLEAR_DELAY_MS,
            fall_delay_ms: FALL_DELAY_MS,
            scoring: ScoreRules::default(),
            max_cascade_passes: MAX_CASCADE_PASSES,
        }
    }
}

impl GameConfig {
    pub fn builder() -> GameConfigBuilder {
        GameConfigBuilder {
            inner: GameConfig::default(),
        }
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Defaults overridden by environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Override fields from the process environment
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Override fields from any key lookup; blank values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = parse_var(&lookup, ENV_WIDTH)? {
            self.width = v;
        }
        if let Some(v) = parse_var(&lookup, ENV_HEIGHT)? {
            self.height = v;
        }
        if let Some(v) = parse_var(&lookup, ENV_SEED)? {
            self.seed = v;
        }
        if let Some(v) = parse_var(&lookup, ENV_SWAP_MS)? {
            self.swap_delay_ms = v;
        }
        if let Some(v) = parse_var(&lookup, ENV_MATCH_MS)? {
            self.match_check_delay_ms = v;
        }
        if let Some(v) = parse_var(&lookup, ENV_CLEAR_MS)? {
            self.clear_delay_ms = v;
        }
        if let Some(v) = parse_var(&lookup, ENV_FALL_MS)? {
            self.fall_delay_ms = v;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.width > MAX_BOARD_DIM {
            return Err(ConfigError::Validation(format!(
                "width must be in 1..={}, got {}",
                MAX_BOARD_DIM, self.width
            )));
        }
        if self.height == 0 || self.height > MAX_BOARD_DIM {
            return Err(ConfigError::Validation(format!(
                "height must be in 1..={}, got {}",
                MAX_BOARD_DIM, self.height
            )));
        }
        if self.max_cascade_passes == 0 {
            return Err(ConfigError::Validation(
                "max_cascade_passes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Sum of all four phase delays; the minimum duration of a matching turn
    pub fn turn_delay_ms(&self) -> u32 {
        self.swap_delay_ms
            .saturating_add(self.match_check_delay_ms)
            .saturating_add(self.clear_delay_ms)
            .saturating_add(self.fall_delay_ms)
    }
}

fn parse_var<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse()
        .map(Some)
        .map_err(|_| ConfigError::InvalidEnv {
            field: key,
            value: raw.clone(),
        })
}

pub struct GameConfigBuilder {
    inner: GameConfig,
}

impl Default for GameConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GameConfigBuilder {
    pub fn new() -> Self {
        GameConfig::builder()
    }

    pub fn size(mut self, width: u8, height: u8) -> Self {
        self.inner.width = width;
        self.inner.height = height;
        self
    }

    pub fn seed(mut self, seed: u32) -> Self {
        self.inner.seed = seed;
        self
    }

    pub fn swap_delay_ms(mut self, value: u32) -> Self {
        self.inner.swap_delay_ms = value;
        self
    }

    pub fn match_check_delay_ms(mut self, value: u32) -> Self {
        self.inner.match_check_delay_ms = value;
        self
    }

    pub fn clear_delay_ms(mut self, value: u32) -> Self {
        self.inner.clear_delay_ms = value;
        self
    }

    pub fn fall_delay_ms(mut self, value: u32) -> Self {
        self.inner.fall_delay_ms = value;
        self
    }

    /// Set all four phase delays to zero (each transition still needs a tick)
    pub fn instant(self) -> Self {
        self.swap_delay_ms(0)
            .match_check_delay_ms(0)
            .clear_delay_ms(0)
            .fall_delay_ms(0)
    }

    pub fn scoring(mut self, rules: ScoreRules) -> Self {
        self.inner.scoring = rules;
        self
    }

    pub fn max_cascade_passes(mut self, value: u32) -> Self {
        self.inner.max_cascade_passes = value;
        self
    }

    pub fn build(self) -> Result<GameConfig, ConfigError> {
        self.inner.validate()?;
        Ok(self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.width, 8);
        assert_eq!(config.turn_delay_ms(), 1600);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = GameConfig::from_json_str(r#"{"width": 6, "scoring": {"base_per_token": 10}}"#)
            .unwrap();
        assert_eq!(config.width, 6);
        assert_eq!(config.height, 8);
        assert_eq!(config.scoring.base_per_token, 10);
        assert_eq!(config.scoring.extra_token_bonus, 50);
    }

    #[test]
    fn test_json_rejects_invalid_size() {
        let err = GameConfig::from_json_str(r#"{"height": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_json_syntax_error() {
        let err = GameConfig::from_json_str("{width:").unwrap_err();
        assert!(matches!(err, ConfigError::JsonParse(_)));
    }

    #[test]
    fn test_overrides_apply() {
        let mut config = GameConfig::default();
        config
            .apply_overrides(lookup(&[
                (ENV_WIDTH, "5"),
                (ENV_SEED, " 42 "),
                (ENV_FALL_MS, ""),
            ]))
            .unwrap();
        assert_eq!(config.width, 5);
        assert_eq!(config.seed, 42);
        assert_eq!(config.fall_delay_ms, FALL_DELAY_MS);
    }

    #[test]
    fn test_override_rejects_garbage() {
        let mut config = GameConfig::default();
        let err = config
            .apply_overrides(lookup(&[(ENV_SWAP_MS, "soon")]))
            .unwrap_err();
        match err {
            ConfigError::InvalidEnv { field, value } => {
                assert_eq!(field, ENV_SWAP_MS);
                assert_eq!(value, "soon");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_builder_validates() {
        assert!(GameConfig::builder().size(65, 8).build().is_err());
        assert!(GameConfig::builder().max_cascade_passes(0).build().is_err());

        let config = GameConfig::builder().size(5, 6).seed(9).instant().build().unwrap();
        assert_eq!((config.width, config.height, config.seed), (5, 6, 9));
        assert_eq!(config.turn_delay_ms(), 0);
    }

    #[test]
    fn test_load_missing_file() {
        let err = GameConfig::load("/nonexistent/match-cascade.json").unwrap_err();
        assert!(matches!(err, ConfigError::FileRead { .. }));
    }
}
