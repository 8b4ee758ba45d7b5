//! Getter configuration

use serde::{Deserialize, Serialize};

use crate::picker::DEFAULT_DRILL_KEYS;
use crate::{Error, Result};

/// Default upper bound on input size (10 MiB)
pub const MAX_INPUT_SIZE: usize = 10 << 20;

/// Default number of slots in the compiled-plan cache
pub const DEFAULT_PLAN_CACHE_SLOTS: usize = 512;

/// Configuration for a [`Getter`](crate::Getter)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetterConfig {
    /// Inputs longer than this are rejected before scanning
    pub max_input_size: usize,
    /// Reject inputs that are not valid UTF-8
    pub validate_utf8: bool,
    /// Answer popular top-level keys with a single root scan
    pub top_key_shortcut: bool,
    /// Route every lookup through the fallback oracle
    pub legacy_fallback: bool,
    /// Keys tried, in order, when picking the payload root of an envelope
    pub drill_keys: Vec<String>,
    /// Slot count for a getter-owned plan cache (power of two)
    pub plan_cache_slots: usize,
}

impl Default for GetterConfig {
    fn default() -> Self {
        Self {
            max_input_size: MAX_INPUT_SIZE,
            validate_utf8: true,
            top_key_shortcut: true,
            legacy_fallback: false,
            drill_keys: DEFAULT_DRILL_KEYS.iter().map(|key| key.to_string()).collect(),
            plan_cache_slots: DEFAULT_PLAN_CACHE_SLOTS,
        }
    }
}

impl GetterConfig {
    /// Configuration that skips UTF-8 validation for trusted producers
    pub fn trusted() -> Self {
        Self {
            validate_utf8: false,
            ..Self::default()
        }
    }

    /// Configuration that resolves every path through the fallback oracle
    pub fn legacy() -> Self {
        Self {
            legacy_fallback: true,
            top_key_shortcut: false,
            ..Self::default()
        }
    }

    /// Load a configuration from JSON; missing fields take their defaults
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| Error::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values a getter cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.max_input_size == 0 {
            return Err(Error::config("max_input_size must be greater than zero"));
        }
        if self.plan_cache_slots == 0 || !self.plan_cache_slots.is_power_of_two() {
            return Err(Error::config(format!(
                "plan_cache_slots must be a power of two, got {}",
                self.plan_cache_slots
            )));
        }
        if self.drill_keys.iter().any(String::is_empty) {
            return Err(Error::config("drill_keys must not contain empty keys"));
        }
        Ok(())
    }
}
