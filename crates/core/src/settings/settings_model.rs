use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_INPUT_CURRENCY, DEFAULT_RECENT_DONATIONS_LIMIT, DEFAULT_REPORTING_CURRENCY,
    DEFAULT_WINDOW_HOURS,
};
use crate::errors::{Error, Result};
use crate::fx::normalize_currency_code;

pub const ENV_REPORTING_CURRENCY: &str = "DONATRACK_REPORTING_CURRENCY";
pub const ENV_DEFAULT_CURRENCY: &str = "DONATRACK_DEFAULT_CURRENCY";
pub const ENV_WINDOW_HOURS: &str = "DONATRACK_WINDOW_HOURS";
pub const ENV_RECENT_DONATIONS: &str = "DONATRACK_RECENT_DONATIONS";

/// Ten years.
const MAX_WINDOW_HOURS: i64 = 24 * 366 * 10;

/// Engine-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSettings {
    /// Currency all totals are expressed in.
    pub reporting_currency: String,
    /// Currency given to bare amounts during parsing.
    pub default_currency: String,
    /// Length of the trailing window for the highest-grossing charity query.
    pub window_hours: i64,
    /// How many of the leading charity's most recent donations are returned.
    pub recent_donations_limit: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            reporting_currency: DEFAULT_REPORTING_CURRENCY.to_string(),
            default_currency: DEFAULT_INPUT_CURRENCY.to_string(),
            window_hours: DEFAULT_WINDOW_HOURS,
            recent_donations_limit: DEFAULT_RECENT_DONATIONS_LIMIT,
        }
    }
}

impl EngineSettings {
    /// Loads settings from the process environment, reading a `.env` file first
    /// when one exists. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(value) = lookup(ENV_REPORTING_CURRENCY) {
            settings.reporting_currency = value;
        }
        if let Some(value) = lookup(ENV_DEFAULT_CURRENCY) {
            settings.default_currency = value;
        }
        if let Some(value) = lookup(ENV_WINDOW_HOURS) {
            settings.window_hours = value.trim().parse().map_err(|_| {
                Error::InvalidConfigValue(format!("{}={}", ENV_WINDOW_HOURS, value))
            })?;
        }
        if let Some(value) = lookup(ENV_RECENT_DONATIONS) {
            settings.recent_donations_limit = value.trim().parse().map_err(|_| {
                Error::InvalidConfigValue(format!("{}={}", ENV_RECENT_DONATIONS, value))
            })?;
        }

        settings.validated()
    }

    /// Normalizes currency codes and checks numeric bounds.
    pub fn validated(mut self) -> Result<Self> {
        self.reporting_currency = normalize_currency_code(&self.reporting_currency)
            .map_err(|e| Error::InvalidConfigValue(e.to_string()))?;
        self.default_currency = normalize_currency_code(&self.default_currency)
            .map_err(|e| Error::InvalidConfigValue(e.to_string()))?;
        if self.window_hours <= 0 || self.window_hours > MAX_WINDOW_HOURS {
            return Err(Error::InvalidConfigValue(format!(
                "window_hours must be within 1..={}, got {}",
                MAX_WINDOW_HOURS,
                self.window_hours
            )));
        }
        if self.recent_donations_limit == 0 {
            return Err(Error::InvalidConfigValue(
                "recent_donations_limit must be at least 1".to_string(),
            ));
        }
        Ok(self)
    }

    pub fn window(&self) -> Duration {
        Duration::hours(self.window_hours)
    }
}
