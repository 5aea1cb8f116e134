use anyhow::{Context, Result};
use dotenvy::dotenv;
use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub platform_fee_rate: Decimal,
    pub directory_service_url: String,
    pub notification_webhook_url: Option<String>,
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "walks-server".to_string()),
            platform_fee_rate: parse_fee_rate(
                &env::var("PLATFORM_FEE_RATE").unwrap_or_else(|_| "0.10".to_string()),
            )?,
            directory_service_url: env::var("DIRECTORY_SERVICE_URL")
                .context("DIRECTORY_SERVICE_URL must be set")?,
            notification_webhook_url: env::var("NOTIFICATION_WEBHOOK_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            allowed_origins: parse_origins(&env::var("ALLOWED_ORIGINS").unwrap_or_default()),
        })
    }
}

/// Fee rate as a fraction of the agreed price, 0 through 1 inclusive.
pub fn parse_fee_rate(raw: &str) -> Result<Decimal> {
    let rate = Decimal::from_str(raw.trim())
        .with_context(|| format!("PLATFORM_FEE_RATE must be a decimal, got {raw:?}"))?;
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        anyhow::bail!("PLATFORM_FEE_RATE must be between 0 and 1, got {rate}");
    }
    if rate.normalize().scale() > 4 {
        anyhow::bail!("PLATFORM_FEE_RATE allows at most 4 decimal places, got {rate}");
    }
    Ok(rate)
}

/// Comma separated list; blanks are dropped.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect()
}
