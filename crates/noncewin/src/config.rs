use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{NonceError, Result};
use crate::hooks::NonceHooks;
use crate::tick::DAY_IN_SECONDS;
use crate::verify::Action;

/// Lifespan and logged-out identity settings.
///
/// ```json
/// { "lifespan_secs": 43200, "action_lifespans": { "autosave": 172800 }, "logged_out_uid": 0 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NonceConfig {
    pub lifespan_secs: i64,
    /// Per-action overrides, keyed by the action as hashed (`-1` for none).
    pub action_lifespans: HashMap<String, i64>,
    /// Substituted for uid 0. Leave unset to keep logged-out users at 0.
    pub logged_out_uid: Option<u64>,
}

impl Default for NonceConfig {
    fn default() -> Self {
        Self {
            lifespan_secs: DAY_IN_SECONDS,
            action_lifespans: HashMap::new(),
            logged_out_uid: None,
        }
    }
}

impl NonceConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Defaults overlaid with `NONCE_LIFE` and `NONCE_LOGGED_OUT_UID`.
    pub fn from_env() -> Result<Self> {
        Self::default().overlay_env(|k| std::env::var(k).ok())
    }

    fn overlay_env(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(v) = var("NONCE_LIFE") {
            self.lifespan_secs = v
                .trim()
                .parse::<i64>()
                .map_err(|e| NonceError::Config(format!("NONCE_LIFE={v:?}: {e}")))?;
        }
        if let Some(v) = var("NONCE_LOGGED_OUT_UID") {
            let uid = v
                .trim()
                .parse::<u64>()
                .map_err(|e| NonceError::Config(format!("NONCE_LOGGED_OUT_UID={v:?}: {e}")))?;
            self.logged_out_uid = Some(uid);
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.lifespan_secs <= 0 {
            return Err(NonceError::InvalidLifespan {
                lifespan: self.lifespan_secs,
                action: Action::None.to_string(),
            });
        }
        for (action, &lifespan) in &self.action_lifespans {
            if lifespan <= 0 {
                return Err(NonceError::InvalidLifespan {
                    lifespan,
                    action: action.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn lifespan_for(&self, action: &Action) -> i64 {
        self.action_lifespans
            .get(&action.to_string())
            .copied()
            .unwrap_or(self.lifespan_secs)
    }
}

/// [`NonceHooks`] answered from a [`NonceConfig`].
#[derive(Debug, Clone, Default)]
pub struct ConfigHooks {
    config: NonceConfig,
}

impl ConfigHooks {
    pub fn new(config: NonceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NonceConfig {
        &self.config
    }
}

impl NonceHooks for ConfigHooks {
    fn nonce_life(&self, action: &Action) -> i64 {
        self.config.lifespan_for(action)
    }

    fn nonce_user_logged_out(&self, uid: u64, _action: &Action) -> u64 {
        self.config.logged_out_uid.unwrap_or(uid)
    }
}
