use std::fmt::Display;
use std::str::FromStr;

use chrono::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::clients::PricingRules;

const DEV_JWT_SECRET: &str = "florist-store-dev-secret";
/// Upper bound for hour-valued settings: ten years.
const MAX_HOURS: i64 = 24 * 365 * 10;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    Invalid { key: &'static str, value: String, reason: String },
}

/// Seed administrator created at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
}

/// Runtime settings, read once from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub actor_buffer: usize,
    pub notification_capacity: usize,
    pub notification_window_hours: i64,
    pub pricing: PricingRules,
    pub cors_origin: String,
    pub admin: Option<AdminSeed>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5000,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_ttl_hours: 168,
            actor_buffer: 64,
            notification_capacity: 50,
            notification_window_hours: 24,
            pricing: PricingRules::default(),
            cors_origin: "*".to_string(),
            admin: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; missing keys fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let jwt_secret = match lookup("JWT_SECRET").filter(|s| !s.is_empty()) {
            Some(secret) => secret,
            None => {
                warn!("JWT_SECRET not set, using the development secret");
                defaults.jwt_secret
            }
        };
        let admin = match (lookup("ADMIN_EMAIL"), lookup("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Some(AdminSeed { email, password })
            }
            _ => None,
        };

        let config = Self {
            port: parse(&lookup, "PORT", defaults.port)?,
            jwt_secret,
            jwt_ttl_hours: hours(&lookup, "JWT_TTL_HOURS", defaults.jwt_ttl_hours)?,
            actor_buffer: positive(&lookup, "ACTOR_BUFFER", defaults.actor_buffer)?,
            notification_capacity: positive(&lookup, "NOTIFICATION_CAPACITY", defaults.notification_capacity)?,
            notification_window_hours: hours(&lookup, "NOTIFICATION_WINDOW_HOURS", defaults.notification_window_hours)?,
            pricing: PricingRules {
                delivery_charge: parse(&lookup, "DELIVERY_CHARGE", defaults.pricing.delivery_charge)?,
                free_delivery_threshold: parse(
                    &lookup,
                    "FREE_DELIVERY_THRESHOLD",
                    defaults.pricing.free_delivery_threshold,
                )?,
                low_stock_threshold: parse(&lookup, "LOW_STOCK_THRESHOLD", defaults.pricing.low_stock_threshold)?,
            },
            cors_origin: lookup("CORS_ORIGIN").unwrap_or(defaults.cors_origin),
            admin,
        };
        if config.pricing.delivery_charge < 0.0 || config.pricing.free_delivery_threshold < 0.0 {
            return Err(ConfigError::Invalid {
                key: "DELIVERY_CHARGE",
                value: config.pricing.delivery_charge.to_string(),
                reason: "amounts cannot be negative".to_string(),
            });
        }
        Ok(config)
    }

    pub fn notification_window(&self) -> Duration {
        Duration::hours(self.notification_window_hours)
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        None => {
            info!(key, %default, "Using default");
            Ok(default)
        }
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}

fn positive<T>(lookup: &impl Fn(&str) -> Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + Display + PartialOrd + Default,
    T::Err: Display,
{
    let value = parse(lookup, key, default)?;
    if value <= T::default() {
        return Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: "must be positive".to_string(),
        });
    }
    Ok(value)
}

fn hours(lookup: &impl Fn(&str) -> Option<String>, key: &'static str, default: i64) -> Result<i64, ConfigError> {
    let value = positive(lookup, key, default)?;
    if value > MAX_HOURS {
        return Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: format!("must be at most {} hours", MAX_HOURS),
        });
    }
    Ok(value)
}
