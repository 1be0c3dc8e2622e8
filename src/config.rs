use std::env;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveTime};
use chrono_tz::Tz;
use dotenvy::dotenv;

use crate::attendance::classifier::AttendanceClassifier;
use crate::attendance::transition::AttendancePolicy;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub api_prefix: String,

    // Rate limiting
    pub rate_protected_per_min: u32,

    // Attendance rules
    pub org_timezone: Tz,
    pub grace_period_minutes: i64,
    pub default_work_start: NaiveTime,
    pub default_work_end: NaiveTime,

    pub log_dir: String,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_time(key: &str, default: &str) -> Result<NaiveTime> {
    let raw = var_or(key, default);
    NaiveTime::parse_from_str(&raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
        .with_context(|| format!("{key} must be HH:MM, got {raw:?}"))
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let org_timezone_raw = var_or("ORG_TIMEZONE", "Asia/Jakarta");
        let org_timezone = org_timezone_raw
            .parse::<Tz>()
            .map_err(|e| anyhow::anyhow!("ORG_TIMEZONE {org_timezone_raw:?} is invalid: {e}"))?;

        Ok(Self {
            server_addr: var_or("SERVER_ADDR", "127.0.0.1:8080"),
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            api_prefix: var_or("API_PREFIX", "/api"),

            rate_protected_per_min: var_or("RATE_PROTECTED_PER_MIN", "1000")
                .parse()
                .context("RATE_PROTECTED_PER_MIN must be a number")?,

            org_timezone,
            grace_period_minutes: var_or("GRACE_PERIOD_MINUTES", "5")
                .parse()
                .context("GRACE_PERIOD_MINUTES must be a number")?,
            default_work_start: parse_time("DEFAULT_WORK_START", "09:00")?,
            default_work_end: parse_time("DEFAULT_WORK_END", "17:00")?,

            log_dir: var_or("LOG_DIR", "logs"),
        })
    }

    pub fn classifier(&self) -> AttendanceClassifier {
        AttendanceClassifier::new(self.org_timezone, Duration::minutes(self.grace_period_minutes))
    }

    pub fn attendance_policy(&self) -> AttendancePolicy {
        AttendancePolicy::new(self.classifier(), self.default_work_start, self.default_work_end)
    }
}
