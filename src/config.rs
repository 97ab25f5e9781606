//! Environment-driven settings.
//!
//! `.env` is loaded first (if present), then the process environment is read.
//! CLI flags override anything set here.

use crate::domain::DEFAULT_HORIZON_DAYS;
use crate::error::AppError;

pub const HORIZON_ENV: &str = "PTREND_HORIZON_DAYS";
pub const LOG_ENV: &str = "PTREND_LOG";

const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Used when `--horizon` is not given.
    pub default_horizon_days: u32,
    /// `tracing-subscriber` filter directive, e.g. `info` or `profit_trend=debug`.
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_horizon_days: DEFAULT_HORIZON_DAYS,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, AppError> {
        // Missing .env is fine; a malformed one is not.
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                return Err(AppError::input(format!("Failed to load .env: {err}")));
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(raw) = lookup(HORIZON_ENV).filter(|v| !v.trim().is_empty()) {
            let horizon: u32 = raw
                .trim()
                .parse()
                .map_err(|_| {
                    AppError::input(format!(
                        "{HORIZON_ENV} must be a whole number of days, got '{raw}'."
                    ))
                })?;
            if horizon == 0 {
                return Err(AppError::input(format!("{HORIZON_ENV} must be >= 1.")));
            }
            settings.default_horizon_days = horizon;
        }

        if let Some(filter) = lookup(LOG_ENV).filter(|v| !v.trim().is_empty()) {
            settings.log_filter = filter.trim().to_string();
        }

        Ok(settings)
    }
}
