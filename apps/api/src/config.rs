use anyhow::{bail, Context, Result};
use chrono::Weekday;

use crate::generation::scoring::CtaLocale;
use crate::llm_client::{self, Provider, ProviderCredentials};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
///
/// CMS credentials are deliberately absent: they live in the persisted
/// configuration map and are read when a cycle or publish runs.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
    pub credentials: ProviderCredentials,
    /// Bearer token guarding generation and every mutating route. Open when unset.
    pub api_secret: Option<String>,
    /// Budget for one provider call, retries included.
    pub provider_timeout_secs: u64,
    pub cta_locale: CtaLocale,
    pub site_url: String,
    pub scheduler: ScheduleConfig,
}

/// When the scheduler fires a publication cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleConfig {
    pub enabled: bool,
    pub days: Vec<Weekday>,
    pub hour: u32,
    pub utc_offset_hours: i32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            days: vec![Weekday::Mon, Weekday::Thu],
            hour: 9,
            utc_offset_hours: 1,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let mut credentials = ProviderCredentials::default();
        for provider in Provider::ALL {
            if let Some(key) = optional_env(provider.env_key()) {
                credentials.set(provider, key);
            }
        }

        let defaults = ScheduleConfig::default();
        let scheduler = ScheduleConfig {
            enabled: optional_env("SCHEDULER_ENABLED")
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.enabled),
            days: match optional_env("SCHEDULE_DAYS") {
                Some(raw) => parse_weekdays(&raw)?,
                None => defaults.days,
            },
            hour: parse_env("SCHEDULE_HOUR", defaults.hour)?,
            utc_offset_hours: parse_env("SCHEDULE_UTC_OFFSET_HOURS", defaults.utc_offset_hours)?,
        };
        if scheduler.hour > 23 {
            bail!("SCHEDULE_HOUR must be between 0 and 23");
        }

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            credentials,
            api_secret: optional_env("API_SECRET"),
            provider_timeout_secs: parse_env("PROVIDER_TIMEOUT_SECS", 55)?,
            cta_locale: optional_env("CTA_LOCALE")
                .map(|v| CtaLocale::from_code(&v))
                .unwrap_or_default(),
            site_url: optional_env("SITE_URL")
                .unwrap_or_else(|| "https://powergo.pl".to_string()),
            scheduler,
        })
    }
}

impl Config {
    /// Timeout for a single HTTP attempt, sized so retries fit the call budget.
    pub fn attempt_timeout_secs(&self) -> u64 {
        llm_client::attempt_timeout_secs(self.provider_timeout_secs)
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Blank values count as unset, so `KEY=` in a .env file disables a provider.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}

/// Parses a comma-separated weekday list such as `mon,thu`.
pub fn parse_weekdays(raw: &str) -> Result<Vec<Weekday>> {
    let mut days = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let day = part
            .parse::<Weekday>()
            .map_err(|_| anyhow::anyhow!("Unknown weekday '{part}' in SCHEDULE_DAYS"))?;
        if !days.contains(&day) {
            days.push(day);
        }
    }
    if days.is_empty() {
        bail!("SCHEDULE_DAYS must name at least one weekday");
    }
    Ok(days)
}
