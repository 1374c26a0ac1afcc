use std::env;
use std::time::Duration;

use crate::extractor::ExtractorSettings;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://links.db";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_MAX_DESCRIPTION_LEN: usize = 250;
pub const DEFAULT_PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/150";

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub fetch_timeout: Duration,
    pub max_description_len: usize,
    pub placeholder_image_url: String,
    pub is_production: bool,
}

impl Config {
    /// Load configuration from the process environment, reading `.env` first
    /// when one exists. Every key has a default, so this never fails.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Config {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: parse_var("SERVER_PORT", 8080),
            fetch_timeout: Duration::from_secs(parse_var(
                "FETCH_TIMEOUT_SECS",
                DEFAULT_FETCH_TIMEOUT_SECS,
            )),
            max_description_len: parse_var("MAX_DESCRIPTION_LEN", DEFAULT_MAX_DESCRIPTION_LEN),
            placeholder_image_url: env::var("PLACEHOLDER_IMAGE_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PLACEHOLDER_IMAGE_URL.to_string()),
            is_production: env::var("APP_ENV").as_deref() == Ok("production"),
        }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn extractor_settings(&self) -> ExtractorSettings {
        ExtractorSettings {
            timeout: self.fetch_timeout,
            max_description_len: self.max_description_len,
            placeholder_image_url: self.placeholder_image_url.clone(),
            ..ExtractorSettings::default()
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
