//! Runtime settings.
//!
//! There is no configuration file.  The defaults match the classic
//! `Ctrl+Alt+<keypad digit>` bindings (with NumLock on, hence `<Mod2>`) and
//! a 200 px "already placed" threshold.  Two environment variables can
//! override them:
//!
//! | Variable               | Meaning                                   |
//! |------------------------|-------------------------------------------|
//! | `WINSPLIT_ACCELERATOR` | Modifier prefix, e.g. `<Super>`           |
//! | `WINSPLIT_THRESHOLD`   | Distance threshold in pixels              |

use crate::keys::parse_accelerator;
use crate::placement::DEFAULT_THRESHOLD;

pub const DEFAULT_ACCELERATOR: &str = "<Ctrl><Mod1><Mod2>";

pub const ACCELERATOR_VAR: &str = "WINSPLIT_ACCELERATOR";
pub const THRESHOLD_VAR: &str = "WINSPLIT_THRESHOLD";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Modifiers shared by every binding, in accelerator syntax.
    pub accelerator_prefix: String,
    /// Manhattan distance (px) under which a window counts as placed.
    pub threshold: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            accelerator_prefix: DEFAULT_ACCELERATOR.into(),
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// Error from reading a setting.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);

impl Config {
    /// Defaults with overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults with overrides from `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(prefix) = lookup(ACCELERATOR_VAR) {
            // Validate the modifiers by parsing them against a known key.
            parse_accelerator(&format!("{}KP_5", prefix))
                .map_err(|e| ConfigError(format!("{}={:?}: {}", ACCELERATOR_VAR, prefix, e)))?;
            config.accelerator_prefix = prefix;
        }

        if let Some(raw) = lookup(THRESHOLD_VAR) {
            config.threshold = raw
                .trim()
                .parse()
                .map_err(|e| ConfigError(format!("{}={:?}: {}", THRESHOLD_VAR, raw, e)))?;
        }

        Ok(config)
    }
}
