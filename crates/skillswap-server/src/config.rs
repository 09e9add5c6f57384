use std::path::PathBuf;

use anyhow::{Context, bail};

/// Placeholder secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me",
    "change-me-to-a-random-string",
    "dev-secret-change-me",
];

/// Ten years.
const MAX_TOKEN_TTL_DAYS: i64 = 3650;

#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub identity_secret: String,
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub token_ttl_days: i64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let jwt_secret = required_secret(&lookup, "SKILLSWAP_JWT_SECRET")?;
        let identity_secret = required_secret(&lookup, "SKILLSWAP_IDP_SECRET")?;

        let db_path = lookup("SKILLSWAP_DB_PATH")
            .unwrap_or_else(|| "skillswap.db".into())
            .into();
        let host = lookup("SKILLSWAP_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = lookup("SKILLSWAP_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .context("SKILLSWAP_PORT must be a port number")?;
        let token_ttl_days = lookup("SKILLSWAP_TOKEN_TTL_DAYS")
            .unwrap_or_else(|| "30".into())
            .parse()
            .context("SKILLSWAP_TOKEN_TTL_DAYS must be a whole number of days")?;
        if !(1..=MAX_TOKEN_TTL_DAYS).contains(&token_ttl_days) {
            bail!("SKILLSWAP_TOKEN_TTL_DAYS must be between 1 and {MAX_TOKEN_TTL_DAYS}");
        }

        Ok(Self {
            jwt_secret,
            identity_secret,
            db_path,
            host,
            port,
            token_ttl_days,
        })
    }
}

fn required_secret(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<String> {
    let value = lookup(key).unwrap_or_default();
    if value.is_empty() || PLACEHOLDER_SECRETS.contains(&value.as_str()) {
        bail!("{key} is unset or still a placeholder. Set it in your .env file and restart.");
    }
    Ok(value)
}
